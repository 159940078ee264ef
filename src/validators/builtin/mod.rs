//! Built-in validators
//!
//! One validator per server-side rule kind. Every check except uniqueness
//! resolves before returning.

mod acceptance;
mod comparison;
mod confirmation;
mod format;
mod length;
mod membership;
mod numericality;
mod pattern;
mod presence;
mod uniqueness;

pub use acceptance::AcceptanceValidator;
pub use comparison::{Bound, Comparison, Constraint};
pub use confirmation::ConfirmationValidator;
pub use format::FormatValidator;
pub use length::LengthValidator;
pub use membership::{ExclusionValidator, InclusionValidator};
pub use numericality::NumericalityValidator;
pub use pattern::translate_pattern;
pub use presence::PresenceValidator;
pub use uniqueness::UniquenessValidator;

use crate::validators::{message, Messages, Validation, ValidationError};
use serde_json::Value;

/// Resolved validation carrying the message for each violated key
fn resolve_keys(kind: &str, messages: &Messages, keys: &[&str]) -> Result<Validation, ValidationError> {
    let resolved = keys
        .iter()
        .map(|key| message(kind, messages, key))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Validation::resolved(resolved))
}

/// String form of a scalar option value
///
/// Strings are taken as is, numbers and booleans use their JSON spelling.
/// Null, arrays and objects have no string form.
fn stringify(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
