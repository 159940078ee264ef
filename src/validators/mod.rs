//! Validator framework for field judge
//!
//! This module mirrors the server's declared field validations on the
//! client. Each form control carries its serialized rule list; a
//! [`ValidationQueue`] runs every rule through the registered validator and
//! aggregates the (possibly asynchronous) outcomes into one verdict.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │       Validation Queue                  │
//! ├─────────────────────────────────────────┤
//! │  • Parse the element's rule list        │
//! │  • Skip allow_blank rules on blanks     │
//! │  • Close once nothing is pending        │
//! └────────┬────────────────────────────────┘
//!          │
//!          ├──> Validator Registry (kind -> validator)
//!          │       ├──> Built-in Validators (presence, length, ...)
//!          │       └──> Custom Validators
//!          │
//!          └──> Validation (resolved now, or later via Transport)
//! ```
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use field_judge::validators::*;
//! use std::sync::Arc;
//!
//! # fn example() -> Result<(), ValidationError> {
//! let rules = r#"[{"kind": "presence", "options": {}, "messages": {"blank": "can't be blank"}}]"#;
//! let field = Arc::new(FormField::new("user[name]", "").with_rules(rules));
//!
//! let queue = validate(&FieldContext::new(field))?;
//! assert_eq!(queue.messages(), vec!["can't be blank"]);
//! # Ok(())
//! # }
//! ```

pub mod builtin;
pub mod context;
pub mod dispatcher;
pub mod queue;
pub mod registry;
pub mod result;
pub mod traits;

// Re-export commonly used types
pub use context::{Document, Element, FieldContext, FormDocument, FormField};
pub use dispatcher::{Callback, Dispatcher};
pub use queue::{validate, QueueEvent, ValidationQueue, Verdict};
pub use registry::{register_custom, ValidatorRegistry, ValidatorSpec};
pub use result::{Outcome, Payload, Status, Validation, ValidationError, ValidationEvent, CLOSED, FAULTED};
pub use traits::{message, parse_options, FnValidator, Messages, Options, Validator, ValidatorType};
