//! Numeric comparisons shared by the length and numericality checks

use serde::Deserialize;

/// Comparison between an observed value and a configured bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Equal,
    NotEqual,
}

type Compare = fn(f64, f64) -> bool;

fn lt(left: f64, right: f64) -> bool {
    left < right
}

fn le(left: f64, right: f64) -> bool {
    left <= right
}

fn gt(left: f64, right: f64) -> bool {
    left > right
}

fn ge(left: f64, right: f64) -> bool {
    left >= right
}

fn eq(left: f64, right: f64) -> bool {
    left == right
}

fn ne(left: f64, right: f64) -> bool {
    left != right
}

// Indexed by `Comparison as usize`.
const TABLE: [Compare; 6] = [lt, le, gt, ge, eq, ne];

impl Comparison {
    /// Whether `left <op> right` holds
    pub fn holds(self, left: f64, right: f64) -> bool {
        TABLE[self as usize](left, right)
    }
}

/// A numeric bound from validator options
///
/// Accepts JSON numbers and numeric strings; anything else is a
/// configuration error.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "RawBound")]
pub struct Bound(pub f64);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawBound {
    Number(f64),
    Text(String),
}

impl TryFrom<RawBound> for Bound {
    type Error = String;

    fn try_from(raw: RawBound) -> Result<Self, Self::Error> {
        let value = match raw {
            RawBound::Number(value) => value,
            RawBound::Text(text) => text
                .trim()
                .parse::<f64>()
                .map_err(|_| format!("bound {:?} is not a number", text))?,
        };
        if value.is_finite() {
            Ok(Bound(value))
        } else {
            Err(format!("bound {} is not finite", value))
        }
    }
}

/// A configured bound paired with the comparison a value must satisfy
#[derive(Debug, Clone, Copy)]
pub struct Constraint {
    /// Message key reported when the comparison fails
    pub key: &'static str,
    pub comparison: Comparison,
    pub bound: Bound,
}

impl Constraint {
    pub fn new(key: &'static str, comparison: Comparison, bound: Bound) -> Self {
        Self { key, comparison, bound }
    }

    /// Message key if `value` violates this constraint
    pub fn violated_by(&self, value: f64) -> Option<&'static str> {
        (!self.comparison.holds(value, self.bound.0)).then_some(self.key)
    }
}

/// Collect the message keys of every violated constraint, in order
pub fn violations<I>(value: f64, constraints: I) -> Vec<&'static str>
where
    I: IntoIterator<Item = Constraint>,
{
    constraints
        .into_iter()
        .filter_map(|constraint| constraint.violated_by(value))
        .collect()
}

/// Parse user input as a finite number
pub fn parse_number(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comparison_table() {
        assert!(Comparison::LessThan.holds(1.0, 2.0));
        assert!(!Comparison::LessThan.holds(2.0, 2.0));
        assert!(Comparison::LessThanOrEqual.holds(2.0, 2.0));
        assert!(Comparison::GreaterThan.holds(3.0, 2.0));
        assert!(Comparison::GreaterThanOrEqual.holds(2.0, 2.0));
        assert!(Comparison::Equal.holds(2.0, 2.0));
        assert!(Comparison::NotEqual.holds(2.0, 3.0));
    }

    #[test]
    fn test_bound_accepts_numbers_and_numeric_strings() {
        let bound: Bound = serde_json::from_value(serde_json::json!(5)).unwrap();
        assert_eq!(bound, Bound(5.0));

        let bound: Bound = serde_json::from_value(serde_json::json!(" 2.5 ")).unwrap();
        assert_eq!(bound, Bound(2.5));

        assert!(serde_json::from_value::<Bound>(serde_json::json!("five")).is_err());
        assert!(serde_json::from_value::<Bound>(serde_json::json!(true)).is_err());
    }

    #[test]
    fn test_violations_keep_order() {
        let keys = violations(
            10.0,
            [
                Constraint::new("less_than", Comparison::LessThan, Bound(5.0)),
                Constraint::new("greater_than", Comparison::GreaterThan, Bound(1.0)),
                Constraint::new("equal_to", Comparison::Equal, Bound(3.0)),
            ],
        );
        assert_eq!(keys, vec!["less_than", "equal_to"]);
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("3.5"), Some(3.5));
        assert_eq!(parse_number(" -2 "), Some(-2.0));
        assert_eq!(parse_number("1e3"), Some(1000.0));
        assert!(parse_number("").is_none());
        assert!(parse_number("abc").is_none());
        assert!(parse_number("inf").is_none());
        assert!(parse_number("NaN").is_none());
    }
}
