//! Numericality validator

use super::comparison::{parse_number, violations, Bound, Comparison, Constraint};
use super::resolve_keys;
use crate::validators::*;
use serde::Deserialize;
use tracing::debug;

/// Numericality validator configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct NumericalityOptions {
    odd: bool,
    even: bool,
    only_integer: bool,
    greater_than: Option<Bound>,
    greater_than_or_equal_to: Option<Bound>,
    equal_to: Option<Bound>,
    less_than: Option<Bound>,
    less_than_or_equal_to: Option<Bound>,
}

impl NumericalityOptions {
    /// Configured comparisons, in reporting order
    fn constraints(&self) -> Vec<Constraint> {
        [
            (self.greater_than, "greater_than", Comparison::GreaterThan),
            (
                self.greater_than_or_equal_to,
                "greater_than_or_equal_to",
                Comparison::GreaterThanOrEqual,
            ),
            (self.equal_to, "equal_to", Comparison::Equal),
            (self.less_than, "less_than", Comparison::LessThan),
            (
                self.less_than_or_equal_to,
                "less_than_or_equal_to",
                Comparison::LessThanOrEqual,
            ),
        ]
        .into_iter()
        .filter_map(|(bound, key, comparison)| bound.map(|bound| Constraint::new(key, comparison, bound)))
        .collect()
    }

    /// Message keys for every failing check on `value`
    fn check(&self, value: &str) -> Vec<&'static str> {
        let number = match parse_number(value) {
            Some(number) => number,
            None => return vec!["not_a_number"],
        };

        let mut keys = Vec::new();
        let even = number % 2.0 == 0.0;
        if self.odd && even {
            keys.push("odd");
        }
        if self.even && !even {
            keys.push("even");
        }
        if self.only_integer && number.fract() != 0.0 {
            keys.push("not_an_integer");
        }
        keys.extend(violations(number, self.constraints()));
        keys
    }
}

/// Checks that the value is a number, then checks parity, integrality and
/// every configured comparison independently
pub struct NumericalityValidator;

impl NumericalityValidator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NumericalityValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator for NumericalityValidator {
    fn validate(&self, ctx: &FieldContext, spec: &ValidatorSpec) -> Result<Validation, ValidationError> {
        let options: NumericalityOptions = parse_options("numericality", &spec.options)?;
        let keys = options.check(&ctx.value());
        if !keys.is_empty() {
            debug!("Numericality check failed for {}: {:?}", ctx.element.name(), keys);
        }
        resolve_keys("numericality", &spec.messages, &keys)
    }

    fn name(&self) -> &str {
        "numericality"
    }

    fn validator_type(&self) -> ValidatorType {
        ValidatorType::Builtin
    }
}
