//! Acceptance validator

use super::resolve_keys;
use crate::validators::*;
use tracing::debug;

/// Fails with `accepted` unless the control is checked
pub struct AcceptanceValidator;

impl AcceptanceValidator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AcceptanceValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator for AcceptanceValidator {
    fn validate(&self, ctx: &FieldContext, spec: &ValidatorSpec) -> Result<Validation, ValidationError> {
        if ctx.element.checked() == Some(true) {
            Ok(Validation::valid())
        } else {
            debug!("Acceptance check failed for {}", ctx.element.name());
            resolve_keys("acceptance", &spec.messages, &["accepted"])
        }
    }

    fn name(&self) -> &str {
        "acceptance"
    }

    fn validator_type(&self) -> ValidatorType {
        ValidatorType::Builtin
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::spec;
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    fn check(field: FormField) -> Status {
        AcceptanceValidator::new()
            .validate(
                &FieldContext::new(Arc::new(field)),
                &spec("acceptance", json!({}), &["accepted"]),
            )
            .unwrap()
            .status()
    }

    #[test]
    fn test_checked() {
        assert_eq!(check(FormField::new("user[terms]", "1").with_checked(true)), Status::Valid);
    }

    #[test]
    fn test_unchecked_or_not_a_checkbox() {
        assert_eq!(check(FormField::new("user[terms]", "1").with_checked(false)), Status::Invalid);
        assert_eq!(check(FormField::new("user[terms]", "1")), Status::Invalid);
    }
}
