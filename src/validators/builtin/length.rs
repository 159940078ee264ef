//! Length validator

use super::comparison::{violations, Bound, Comparison, Constraint};
use super::resolve_keys;
use crate::validators::*;
use serde::Deserialize;
use tracing::debug;

/// Length validator configuration
#[derive(Debug, Clone, Deserialize)]
struct LengthOptions {
    #[serde(default)]
    minimum: Option<Bound>,

    #[serde(default)]
    maximum: Option<Bound>,

    #[serde(default)]
    is: Option<Bound>,
}

impl LengthOptions {
    /// Configured bounds, in reporting order
    fn constraints(&self) -> Vec<Constraint> {
        [
            (self.minimum, "too_short", Comparison::GreaterThanOrEqual),
            (self.maximum, "too_long", Comparison::LessThanOrEqual),
            (self.is, "wrong_length", Comparison::Equal),
        ]
        .into_iter()
        .filter_map(|(bound, key, comparison)| bound.map(|bound| Constraint::new(key, comparison, bound)))
        .collect()
    }
}

/// Checks the character count of the value against `minimum`, `maximum`
/// and `is`; each violated bound adds its own message
pub struct LengthValidator;

impl LengthValidator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LengthValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator for LengthValidator {
    fn validate(&self, ctx: &FieldContext, spec: &ValidatorSpec) -> Result<Validation, ValidationError> {
        let options: LengthOptions = parse_options("length", &spec.options)?;
        let length = ctx.value().chars().count();

        let keys = violations(length as f64, options.constraints());
        if !keys.is_empty() {
            debug!("Length check failed for {}: {:?}", ctx.element.name(), keys);
        }
        resolve_keys("length", &spec.messages, &keys)
    }

    fn name(&self) -> &str {
        "length"
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

    const KEYS: &[&str] = &["too_short", "too_long", "wrong_length"];

    fn check(value: &str, options: serde_json::Value) -> Vec<String> {
        LengthValidator::new()
            .validate(&ctx(value), &spec("length", options, KEYS))
            .unwrap()
            .messages()
            .unwrap()
    }

    #[test]
    fn test_minimum() {
        assert_eq!(check("ab", json!({"minimum": 3})), vec!["too_short"]);
        assert!(check("abc", json!({"minimum": 3})).is_empty());
    }

    #[test]
    fn test_maximum() {
        assert_eq!(check("abc", json!({"maximum": 2})), vec!["too_long"]);
        assert!(check("ab", json!({"maximum": 2})).is_empty());
    }

    #[test]
    fn test_is() {
        assert!(check("abcd", json!({"is": 4})).is_empty());
        assert_eq!(check("abc", json!({"is": 4})), vec!["wrong_length"]);
    }

    #[test]
    fn test_each_violated_bound_reports() {
        assert_eq!(
            check("abcdef", json!({"maximum": 3, "is": 4})),
            vec!["too_long", "wrong_length"]
        );
    }

    #[test]
    fn test_counts_characters() {
        assert!(check("héllo", json!({"maximum": 5})).is_empty());
    }

    #[test]
    fn test_no_bounds_is_valid() {
        assert!(check("anything", json!({"allow_blank": true})).is_empty());
    }

    #[test]
    fn test_bad_bound_is_config_error() {
        let result = LengthValidator::new().validate(&ctx("a"), &spec("length", json!({"minimum": "lots"}), KEYS));
        assert!(matches!(result, Err(ValidationError::Config(_))));
    }
}
