//! Confirmation validator

use super::resolve_keys;
use crate::validators::*;
use tracing::debug;

/// Fails with `confirmation` unless the value equals the value of the
/// `<id>_confirmation` companion control
pub struct ConfirmationValidator;

impl ConfirmationValidator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConfirmationValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator for ConfirmationValidator {
    fn validate(&self, ctx: &FieldContext, spec: &ValidatorSpec) -> Result<Validation, ValidationError> {
        let companion = ctx.confirmation_companion()?;

        if ctx.value() == companion.value() {
            Ok(Validation::valid())
        } else {
            debug!("Confirmation check failed for {}", ctx.element.name());
            resolve_keys("confirmation", &spec.messages, &["confirmation"])
        }
    }

    fn name(&self) -> &str {
        "confirmation"
    }

    fn validator_type(&self) -> ValidatorType {
        ValidatorType::Builtin
    }
}
