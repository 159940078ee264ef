//! Core validator traits and interfaces
//!
//! This module defines the fundamental abstractions for the validator framework.

use super::{FieldContext, Validation, ValidationError, ValidatorSpec};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Validator options as received on the wire
pub type Options = serde_json::Map<String, serde_json::Value>;

/// Message key to human-readable message
pub type Messages = HashMap<String, String>;

/// The core validator trait that all validators must implement.
///
/// A validator never blocks: synchronous checks return a resolved
/// [`Validation`], remote checks return a pending one and resolve it later.
pub trait Validator: Send + Sync {
    /// Check the bound element against one validator spec
    ///
    /// # Arguments
    /// * `ctx` - The element and its collaborators
    /// * `spec` - Options and messages for this rule
    ///
    /// # Returns
    /// * `Ok(Validation)` - The (possibly pending) outcome
    /// * `Err(ValidationError)` - If the check could not be set up
    fn validate(&self, ctx: &FieldContext, spec: &ValidatorSpec) -> Result<Validation, ValidationError>;

    /// Get validator name (for logging and debugging)
    fn name(&self) -> &str;

    /// Get validator type (builtin, custom)
    fn validator_type(&self) -> ValidatorType;
}

/// Origin of a validator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidatorType {
    Builtin,
    Custom,
}

impl std::fmt::Display for ValidatorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidatorType::Builtin => write!(f, "builtin"),
            ValidatorType::Custom => write!(f, "custom"),
        }
    }
}

/// Validator backed by a closure over `(ctx, options, messages)`
pub struct FnValidator<F> {
    name: String,
    check: F,
}

impl<F> FnValidator<F>
where
    F: Fn(&FieldContext, &Options, &Messages) -> Result<Validation, ValidationError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, check: F) -> Self {
        Self {
            name: name.into(),
            check,
        }
    }
}

impl<F> Validator for FnValidator<F>
where
    F: Fn(&FieldContext, &Options, &Messages) -> Result<Validation, ValidationError> + Send + Sync,
{
    fn validate(&self, ctx: &FieldContext, spec: &ValidatorSpec) -> Result<Validation, ValidationError> {
        (self.check)(ctx, &spec.options, &spec.messages)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn validator_type(&self) -> ValidatorType {
        ValidatorType::Custom
    }
}

/// Deserialize typed options for validator `kind`
pub fn parse_options<T: DeserializeOwned>(kind: &str, options: &Options) -> Result<T, ValidationError> {
    serde_json::from_value(serde_json::Value::Object(options.clone()))
        .map_err(|e| ValidationError::Config(format!("Invalid {} options: {}", kind, e)))
}

/// Look up message `key` for validator `kind`
///
/// Called only when a constraint is violated. A missing message is a
/// configuration error.
pub fn message(kind: &str, messages: &Messages, key: &str) -> Result<String, ValidationError> {
    messages
        .get(key)
        .cloned()
        .ok_or_else(|| ValidationError::Config(format!("{} validator missing '{}' message", kind, key)))
}
