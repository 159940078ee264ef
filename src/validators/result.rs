//! Validation result types
//!
//! A [`Validation`] is the eventually-resolved outcome of one validator
//! invocation. Synchronous checks hand back an already resolved value; the
//! network-backed check hands back a pending one and resolves it later.

use super::dispatcher::Dispatcher;
use crate::transport::TransportError;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Event fired once a validation resolves
pub const CLOSED: &str = "closed";

/// Event fired when a validation hits a structural failure
pub const FAULTED: &str = "faulted";

/// Outcome of a validator invocation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Outcome {
    /// No answer yet
    #[default]
    Unresolved,

    /// Final list of failure messages (empty means valid)
    Resolved(Vec<String>),
}

/// Observable status of a validation or a queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pending,
    Valid,
    Invalid,
}

impl Status {
    /// Status for a resolved message list
    pub fn of(messages: &[String]) -> Self {
        if messages.is_empty() {
            Status::Valid
        } else {
            Status::Invalid
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Pending => write!(f, "pending"),
            Status::Valid => write!(f, "valid"),
            Status::Invalid => write!(f, "invalid"),
        }
    }
}

/// Structural failure of a validator or queue
///
/// Invalid user input is never an error; it is a resolved validation with
/// messages. These variants cover everything that prevents an answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Malformed validator spec, unknown kind, missing option or message
    #[error("Config error: {0}")]
    Config(String),

    /// The network collaborator failed
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// A response body could not be read as a message list
    #[error("Malformed messages payload: {0}")]
    MalformedPayload(String),

    /// Companion element for a confirmation check does not exist
    #[error("Missing companion element: {0}")]
    MissingCompanion(String),

    /// Async check started outside of a runtime, or similar
    #[error("Runtime error: {0}")]
    Runtime(String),
}

/// Input accepted by [`Validation::resolve`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Nothing to resolve with
    Absent,

    /// Already parsed message list
    Messages(Vec<String>),

    /// Wire-format message list (a JSON array of strings)
    Serialized(String),
}

impl Payload {
    fn into_messages(self) -> Result<Option<Vec<String>>, ValidationError> {
        match self {
            Payload::Absent => Ok(None),
            Payload::Messages(messages) => Ok(Some(messages)),
            Payload::Serialized(text) => serde_json::from_str::<Vec<String>>(&text)
                .map(Some)
                .map_err(|e| ValidationError::MalformedPayload(format!("{}: {:?}", e, text))),
        }
    }
}

impl From<Vec<String>> for Payload {
    fn from(messages: Vec<String>) -> Self {
        Payload::Messages(messages)
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Serialized(text)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Serialized(text.to_string())
    }
}

impl<T: Into<Payload>> From<Option<T>> for Payload {
    fn from(value: Option<T>) -> Self {
        value.map_or(Payload::Absent, Into::into)
    }
}

/// Arguments passed to validation observers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationEvent {
    /// Fired with [`CLOSED`]
    Closed {
        succeeded: bool,
        messages: Vec<String>,
    },

    /// Fired with [`FAULTED`]
    Faulted(ValidationError),
}

#[derive(Debug, Default)]
struct ValidationState {
    outcome: Outcome,
    fault: Option<ValidationError>,
}

#[derive(Debug)]
struct ValidationInner {
    state: RwLock<ValidationState>,
    events: Dispatcher<ValidationEvent>,
}

/// Handle to one validator invocation's outcome
///
/// Cloning shares the same underlying outcome.
#[derive(Debug, Clone)]
pub struct Validation {
    inner: Arc<ValidationInner>,
}

impl Validation {
    /// A validation that has no answer yet
    pub fn pending() -> Self {
        Self {
            inner: Arc::new(ValidationInner {
                state: RwLock::new(ValidationState::default()),
                events: Dispatcher::new(),
            }),
        }
    }

    /// A validation resolved during construction
    pub fn resolved(messages: Vec<String>) -> Self {
        Self {
            inner: Arc::new(ValidationInner {
                state: RwLock::new(ValidationState {
                    outcome: Outcome::Resolved(messages),
                    fault: None,
                }),
                events: Dispatcher::new(),
            }),
        }
    }

    /// A resolved validation with no messages
    pub fn valid() -> Self {
        Self::resolved(Vec::new())
    }

    /// Resolve with the given outcome
    ///
    /// Returns `Ok(false)` when nothing happened: the payload was absent, or
    /// the validation had already resolved or faulted. A serialized payload
    /// that is not a list of strings is a structural error.
    pub fn resolve(&self, payload: impl Into<Payload>) -> Result<bool, ValidationError> {
        if self.is_resolved() {
            return Ok(false);
        }

        let messages = match payload.into().into_messages()? {
            Some(messages) => messages,
            None => return Ok(false),
        };

        {
            let mut state = self.inner.state.write();
            if matches!(state.outcome, Outcome::Resolved(_)) || state.fault.is_some() {
                return Ok(false);
            }
            state.outcome = Outcome::Resolved(messages.clone());
        }

        debug!("Validation resolved with {} message(s)", messages.len());
        self.inner.events.trigger(
            CLOSED,
            &ValidationEvent::Closed {
                succeeded: messages.is_empty(),
                messages,
            },
        );
        Ok(true)
    }

    /// Record a structural failure
    ///
    /// A faulted validation never resolves and never reports valid. Returns
    /// `false` if the validation was already resolved or faulted.
    pub fn fail(&self, error: ValidationError) -> bool {
        {
            let mut state = self.inner.state.write();
            if matches!(state.outcome, Outcome::Resolved(_)) || state.fault.is_some() {
                return false;
            }
            state.fault = Some(error.clone());
        }

        warn!("🚫 Validation faulted: {}", error);
        self.inner.events.trigger(FAULTED, &ValidationEvent::Faulted(error));
        true
    }

    /// Whether an outcome has been assigned
    pub fn is_resolved(&self) -> bool {
        matches!(self.inner.state.read().outcome, Outcome::Resolved(_))
    }

    /// Current status
    pub fn status(&self) -> Status {
        match &self.inner.state.read().outcome {
            Outcome::Unresolved => Status::Pending,
            Outcome::Resolved(messages) => Status::of(messages),
        }
    }

    /// Messages once resolved, `None` while pending
    pub fn messages(&self) -> Option<Vec<String>> {
        match &self.inner.state.read().outcome {
            Outcome::Unresolved => None,
            Outcome::Resolved(messages) => Some(messages.clone()),
        }
    }

    /// Snapshot of the outcome
    pub fn outcome(&self) -> Outcome {
        self.inner.state.read().outcome.clone()
    }

    /// Structural failure, if any
    pub fn fault(&self) -> Option<ValidationError> {
        self.inner.state.read().fault.clone()
    }

    /// Observe [`CLOSED`] or [`FAULTED`]
    pub fn on<F>(&self, event: &str, callback: F)
    where
        F: Fn(&ValidationEvent) + Send + Sync + 'static,
    {
        self.inner.events.on(event, callback);
    }

    /// Fire an event on this validation's observers
    pub fn trigger(&self, event: &str, args: &ValidationEvent) {
        self.inner.events.trigger(event, args);
    }

    /// Whether two handles point at the same validation
    pub fn ptr_eq(&self, other: &Validation) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}
