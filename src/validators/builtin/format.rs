//! Format validator

use super::pattern::translate_pattern;
use super::resolve_keys;
use crate::validators::*;
use serde::Deserialize;
use tracing::debug;

/// Format validator configuration
#[derive(Debug, Clone, Deserialize)]
struct FormatOptions {
    /// Pattern the value must match
    #[serde(default)]
    with: Option<String>,

    /// Pattern the value must not match
    #[serde(default)]
    without: Option<String>,
}

/// Fails with `invalid` when `with` does not match and again when
/// `without` does
pub struct FormatValidator;

impl FormatValidator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FormatValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator for FormatValidator {
    fn validate(&self, ctx: &FieldContext, spec: &ValidatorSpec) -> Result<Validation, ValidationError> {
        let options: FormatOptions = parse_options("format", &spec.options)?;
        if options.with.is_none() && options.without.is_none() {
            return Err(ValidationError::Config(
                "format validator requires 'with' or 'without'".to_string(),
            ));
        }

        let value = ctx.value();
        let mut keys = Vec::new();
        if let Some(pattern) = &options.with {
            if !translate_pattern(pattern)?.is_match(&value) {
                keys.push("invalid");
            }
        }
        if let Some(pattern) = &options.without {
            if translate_pattern(pattern)?.is_match(&value) {
                keys.push("invalid");
            }
        }

        if !keys.is_empty() {
            debug!("Format check failed for {}", ctx.element.name());
        }
        resolve_keys("format", &spec.messages, &keys)
    }

    fn name(&self) -> &str {
        "format"
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

    fn check(value: &str, options: serde_json::Value) -> Result<Validation, ValidationError> {
        FormatValidator::new().validate(&ctx(value), &spec("format", options, &["invalid"]))
    }

    #[test]
    fn test_with() {
        let options = json!({"with": "(?-mix:\\A[a-z]+\\z)"});
        assert_eq!(check("abc", options.clone()).unwrap().status(), Status::Valid);
        assert_eq!(check("abc1", options).unwrap().status(), Status::Invalid);
    }

    #[test]
    fn test_without() {
        let options = json!({"without": "(?i-mx:admin)"});
        assert_eq!(check("joe", options.clone()).unwrap().status(), Status::Valid);
        assert_eq!(check("ADMIN", options).unwrap().status(), Status::Invalid);
    }

    #[test]
    fn test_both_may_fire() {
        let options = json!({"with": "(?-mix:\\A\\d+\\z)", "without": "(?-mix:x)"});
        let validation = check("x", options).unwrap();
        assert_eq!(
            validation.messages(),
            Some(vec!["invalid".to_string(), "invalid".to_string()])
        );
    }

    #[test]
    fn test_missing_patterns_is_config_error() {
        assert!(matches!(check("x", json!({})), Err(ValidationError::Config(_))));
    }
}
