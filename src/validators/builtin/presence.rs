//! Presence validator

use super::resolve_keys;
use crate::validators::*;
use tracing::debug;

/// Fails with `blank` when the value is empty
pub struct PresenceValidator;

impl PresenceValidator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PresenceValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator for PresenceValidator {
    fn validate(&self, ctx: &FieldContext, spec: &ValidatorSpec) -> Result<Validation, ValidationError> {
        if ctx.value().is_empty() {
            debug!("Presence check failed for {}", ctx.element.name());
            resolve_keys("presence", &spec.messages, &["blank"])
        } else {
            Ok(Validation::valid())
        }
    }

    fn name(&self) -> &str {
        "presence"
    }

    fn validator_type(&self) -> ValidatorType {
        ValidatorType::Builtin
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{ctx, spec};
    use super::*;
    use serde_json::json;

    #[test]
    fn test_blank_value() {
        let validation = PresenceValidator::new()
            .validate(&ctx(""), &spec("presence", json!({}), &["blank"]))
            .unwrap();
        assert_eq!(validation.messages(), Some(vec!["blank".to_string()]));
    }

    #[test]
    fn test_whitespace_counts_as_present() {
        let validation = PresenceValidator::new()
            .validate(&ctx(" "), &spec("presence", json!({}), &["blank"]))
            .unwrap();
        assert_eq!(validation.status(), Status::Valid);
    }
}
