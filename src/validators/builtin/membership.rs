//! Inclusion and exclusion validators

use super::{resolve_keys, stringify};
use crate::validators::*;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// Membership validator configuration
#[derive(Debug, Clone, Deserialize)]
struct MembershipOptions {
    /// Candidate values; stringified before comparison
    #[serde(rename = "in", alias = "within")]
    set: Vec<Value>,
}

/// Whether `value` equals the string form of any configured member
fn is_member(kind: &str, spec: &ValidatorSpec, value: &str) -> Result<bool, ValidationError> {
    let options: MembershipOptions = parse_options(kind, &spec.options)?;

    let mut found = false;
    for member in &options.set {
        let member = stringify(member).ok_or_else(|| {
            ValidationError::Config(format!("{} member {} has no string form", kind, member))
        })?;
        found |= member == value;
    }
    Ok(found)
}

/// Fails with `exclusion` when the value is one of the configured members
pub struct ExclusionValidator;

impl ExclusionValidator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ExclusionValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator for ExclusionValidator {
    fn validate(&self, ctx: &FieldContext, spec: &ValidatorSpec) -> Result<Validation, ValidationError> {
        let value = ctx.value();
        if is_member("exclusion", spec, &value)? {
            debug!("Exclusion check failed for {}", ctx.element.name());
            resolve_keys("exclusion", &spec.messages, &["exclusion"])
        } else {
            Ok(Validation::valid())
        }
    }

    fn name(&self) -> &str {
        "exclusion"
    }

    fn validator_type(&self) -> ValidatorType {
        ValidatorType::Builtin
    }
}

/// Fails with `inclusion` unless the value is one of the configured members
pub struct InclusionValidator;

impl InclusionValidator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for InclusionValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator for InclusionValidator {
    fn validate(&self, ctx: &FieldContext, spec: &ValidatorSpec) -> Result<Validation, ValidationError> {
        let value = ctx.value();
        if is_member("inclusion", spec, &value)? {
            Ok(Validation::valid())
        } else {
            debug!("Inclusion check failed for {}", ctx.element.name());
            resolve_keys("inclusion", &spec.messages, &["inclusion"])
        }
    }

    fn name(&self) -> &str {
        "inclusion"
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
    fn test_exclusion_stringifies_members() {
        let rule = spec("exclusion", json!({"in": ["admin", 42]}), &["exclusion"]);
        let validator = ExclusionValidator::new();

        assert_eq!(validator.validate(&ctx("42"), &rule).unwrap().status(), Status::Invalid);
        assert_eq!(validator.validate(&ctx("admin"), &rule).unwrap().status(), Status::Invalid);
        assert_eq!(validator.validate(&ctx("joe"), &rule).unwrap().status(), Status::Valid);
    }

    #[test]
    fn test_inclusion_mirrors_exclusion() {
        let rule = spec("inclusion", json!({"in": ["S", "M", "L"]}), &["inclusion"]);
        let validator = InclusionValidator::new();

        assert_eq!(validator.validate(&ctx("M"), &rule).unwrap().status(), Status::Valid);
        assert_eq!(
            validator.validate(&ctx("XL"), &rule).unwrap().messages(),
            Some(vec!["inclusion".to_string()])
        );
    }

    #[test]
    fn test_within_alias() {
        let rule = spec("inclusion", json!({"within": [true, false]}), &["inclusion"]);
        let validation = InclusionValidator::new().validate(&ctx("true"), &rule).unwrap();
        assert_eq!(validation.status(), Status::Valid);
    }

    #[test]
    fn test_missing_set_is_config_error() {
        let rule = spec("inclusion", json!({}), &["inclusion"]);
        assert!(matches!(
            InclusionValidator::new().validate(&ctx("a"), &rule),
            Err(ValidationError::Config(_))
        ));

        let rule = spec("exclusion", json!({"in": [null]}), &["exclusion"]);
        assert!(matches!(
            ExclusionValidator::new().validate(&ctx("a"), &rule),
            Err(ValidationError::Config(_))
        ));
    }
}
