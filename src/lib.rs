//! Field Judge - client-side mirror of server field validations
//!
//! Form controls carry the validations the server declared for them. This
//! crate re-runs those rules where the user is typing, so feedback does not
//! wait for a submit. Uniqueness is the one rule that needs the server; it
//! goes through a [`transport::Transport`] and resolves asynchronously.

pub mod config;
pub mod transport;
pub mod validators;

pub use config::{ConfigError, Settings};
pub use transport::{Request, Response, Transport, TransportError};
pub use validators::{
    register_custom, validate, FieldContext, FormDocument, FormField, Status, Validation, ValidationError,
    ValidationQueue, Validator, ValidatorRegistry, Verdict,
};
