//! Validation queue - aggregates every validation for one element
//!
//! A queue is `Open` until each of its validations has resolved, then
//! `Closed` for good. Closing fires the queue's [`CLOSED`] event exactly
//! once with the aggregate status and all messages in the order the
//! validations were added, whatever order they resolved in.
//!
//! ```text
//!            all pending resolved
//!   Open ───────────────────────────> Closed
//!    │
//!    └── a validation faults: stays Open, fires FAULTED
//! ```

use super::*;
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::sync::{Arc, Weak};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Aggregate outcome of a closed queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    /// `Valid` or `Invalid`; never `Pending`
    pub status: Status,

    /// Messages of every validation, in insertion order
    pub messages: Vec<String>,
}

impl Verdict {
    pub fn is_valid(&self) -> bool {
        self.status == Status::Valid
    }
}

/// Arguments passed to queue observers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueEvent {
    /// Fired with [`CLOSED`]
    Closed(Verdict),

    /// Fired with [`FAULTED`]
    Faulted(ValidationError),
}

/// Terminal state published to [`ValidationQueue::settled`]
#[derive(Debug, Clone)]
enum Settlement {
    Open,
    Closed(Verdict),
    Faulted(ValidationError),
}

#[derive(Debug, Default)]
struct QueueState {
    closed: bool,

    /// Every validation, in insertion order
    validations: Vec<Validation>,

    /// Indexes into `validations` still waiting for an answer
    pending: BTreeSet<usize>,

    /// Indexes into `validations` that have resolved
    settled: BTreeSet<usize>,

    fault: Option<ValidationError>,
}

impl QueueState {
    fn verdict(&self) -> Verdict {
        let messages: Vec<String> = self
            .settled
            .iter()
            .filter_map(|&index| self.validations[index].messages())
            .flatten()
            .collect();
        Verdict {
            status: Status::of(&messages),
            messages,
        }
    }

    /// Close if nothing is pending; returns the verdict on the transition
    fn try_close(&mut self) -> Option<Verdict> {
        if self.closed || !self.pending.is_empty() {
            return None;
        }
        self.closed = true;
        Some(self.verdict())
    }
}

struct QueueInner {
    element: Arc<dyn Element>,
    state: Mutex<QueueState>,
    events: Dispatcher<QueueEvent>,
    settlement: watch::Sender<Settlement>,
}

/// The set of validations for one element
///
/// Cloning shares the same queue.
#[derive(Clone)]
pub struct ValidationQueue {
    inner: Arc<QueueInner>,
}

impl ValidationQueue {
    /// Validate `ctx.element` with the process-wide registry
    ///
    /// Works on a snapshot, so validators may call [`register_custom`]
    /// without deadlocking.
    pub fn new(ctx: &FieldContext) -> Result<Self, ValidationError> {
        let registry = ValidatorRegistry::snapshot();
        Self::with_registry(ctx, &registry)
    }

    /// Validate `ctx.element` with the validators of `registry`
    pub fn with_registry(ctx: &FieldContext, registry: &ValidatorRegistry) -> Result<Self, ValidationError> {
        let queue = Self::open(ctx);
        queue.populate(ctx, registry)?;
        Ok(queue)
    }

    /// Like [`with_registry`](Self::with_registry), with `on_closed`
    /// registered before any validator runs
    ///
    /// A queue whose validations all resolve synchronously closes during
    /// construction; this is the way to observe that close by callback.
    pub fn observed<F>(ctx: &FieldContext, registry: &ValidatorRegistry, on_closed: F) -> Result<Self, ValidationError>
    where
        F: Fn(&QueueEvent) + Send + Sync + 'static,
    {
        let queue = Self::open(ctx);
        queue.on(CLOSED, on_closed);
        queue.populate(ctx, registry)?;
        Ok(queue)
    }

    fn open(ctx: &FieldContext) -> Self {
        let (settlement, _) = watch::channel(Settlement::Open);
        Self {
            inner: Arc::new(QueueInner {
                element: Arc::clone(&ctx.element),
                state: Mutex::new(QueueState::default()),
                events: Dispatcher::new(),
                settlement,
            }),
        }
    }

    /// Run every applicable validator and classify the results
    fn populate(&self, ctx: &FieldContext, registry: &ValidatorRegistry) -> Result<(), ValidationError> {
        let specs = match ctx.element.rules() {
            Some(raw) => ValidatorSpec::parse_list(&raw)?,
            None => Vec::new(),
        };
        let blank = ctx.value().is_empty();

        let mut validations = Vec::with_capacity(specs.len());
        for spec in &specs {
            if blank && spec.allows_blank() {
                debug!("Skipping {} on blank {}", spec.kind, ctx.element.name());
                continue;
            }
            let validator = registry.require(&spec.kind)?;
            validations.push(validator.validate(ctx, spec)?);
        }

        let count = validations.len();
        let mut early_fault = None;
        let verdict = {
            let mut state = self.inner.state.lock();
            for validation in validations {
                if let Some(error) = self.add(&mut state, validation) {
                    early_fault.get_or_insert(error);
                }
            }
            state.try_close()
        };

        debug!("Queue for {} populated: {} validation(s)", ctx.element.name(), count);
        if let Some(error) = early_fault {
            self.inner.record_fault(error);
        }
        if let Some(verdict) = verdict {
            self.inner.close(verdict);
        }
        Ok(())
    }

    /// Classify one validation
    ///
    /// Subscribes before inspecting the validation so a resolve from another
    /// task cannot slip between the two. Returns a fault that happened
    /// before the subscription.
    fn add(&self, state: &mut QueueState, validation: Validation) -> Option<ValidationError> {
        let index = state.validations.len();
        state.validations.push(validation.clone());

        let queue = Arc::downgrade(&self.inner);
        validation.on(CLOSED, move |_| QueueInner::settle(&queue, index));
        let queue = Arc::downgrade(&self.inner);
        validation.on(FAULTED, move |event| {
            if let (ValidationEvent::Faulted(error), Some(queue)) = (event, queue.upgrade()) {
                queue.record_fault(error.clone());
            }
        });

        if validation.is_resolved() {
            state.settled.insert(index);
            None
        } else {
            state.pending.insert(index);
            validation.fault()
        }
    }

    /// Bound element
    pub fn element(&self) -> &Arc<dyn Element> {
        &self.inner.element
    }

    pub fn is_closed(&self) -> bool {
        self.inner.state.lock().closed
    }

    /// `Pending` while open, else the aggregate status
    pub fn status(&self) -> Status {
        let state = self.inner.state.lock();
        if state.closed {
            state.verdict().status
        } else {
            Status::Pending
        }
    }

    /// Messages of every resolved validation, in insertion order
    pub fn messages(&self) -> Vec<String> {
        self.inner.state.lock().verdict().messages
    }

    /// Aggregate outcome once closed
    pub fn verdict(&self) -> Option<Verdict> {
        let state = self.inner.state.lock();
        state.closed.then(|| state.verdict())
    }

    /// First structural failure among the validations, if any
    pub fn fault(&self) -> Option<ValidationError> {
        self.inner.state.lock().fault.clone()
    }

    pub fn pending_count(&self) -> usize {
        self.inner.state.lock().pending.len()
    }

    pub fn settled_count(&self) -> usize {
        self.inner.state.lock().settled.len()
    }

    /// All validations, in insertion order
    pub fn validations(&self) -> Vec<Validation> {
        self.inner.state.lock().validations.clone()
    }

    /// Observe [`CLOSED`] or [`FAULTED`]
    pub fn on<F>(&self, event: &str, callback: F)
    where
        F: Fn(&QueueEvent) + Send + Sync + 'static,
    {
        self.inner.events.on(event, callback);
    }

    /// Wait for the queue to close
    ///
    /// Returns the verdict, or the first structural failure. A validation
    /// that never answers keeps this waiting forever.
    pub async fn settled(&self) -> Result<Verdict, ValidationError> {
        let mut receiver = self.inner.settlement.subscribe();
        let settlement = receiver
            .wait_for(|settlement| !matches!(settlement, Settlement::Open))
            .await
            .map_err(|e| ValidationError::Runtime(format!("queue dropped: {}", e)))?
            .clone();

        match settlement {
            Settlement::Closed(verdict) => Ok(verdict),
            Settlement::Faulted(error) => Err(error),
            Settlement::Open => Err(ValidationError::Runtime("queue still open".to_string())),
        }
    }
}

impl QueueInner {
    /// A pending validation resolved
    fn settle(queue: &Weak<QueueInner>, index: usize) {
        let Some(queue) = queue.upgrade() else {
            return;
        };

        let verdict = {
            let mut state = queue.state.lock();
            if !state.pending.remove(&index) {
                return;
            }
            state.settled.insert(index);
            state.try_close()
        };

        if let Some(verdict) = verdict {
            queue.close(verdict);
        }
    }

    /// A pending validation faulted; the queue stays open
    fn record_fault(&self, error: ValidationError) {
        {
            let mut state = self.state.lock();
            if state.closed || state.fault.is_some() {
                return;
            }
            state.fault = Some(error.clone());
        }

        warn!("🚫 Validation of {} faulted: {}", self.element.name(), error);
        self.events.trigger(FAULTED, &QueueEvent::Faulted(error.clone()));
        self.settlement.send_replace(Settlement::Faulted(error));
    }

    fn close(&self, verdict: Verdict) {
        info!(
            "✅ Validation of {} closed: {} ({} message(s))",
            self.element.name(),
            verdict.status,
            verdict.messages.len()
        );
        // Observers run before `settled()` waiters wake.
        self.events.trigger(CLOSED, &QueueEvent::Closed(verdict.clone()));
        self.settlement.send_replace(Settlement::Closed(verdict));
    }
}

impl std::fmt::Debug for ValidationQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("ValidationQueue")
            .field("element", &self.inner.element.name())
            .field("closed", &state.closed)
            .field("pending", &state.pending.len())
            .field("settled", &state.settled.len())
            .finish()
    }
}

/// Validate `ctx.element` with the process-wide registry
pub fn validate(ctx: &FieldContext) -> Result<ValidationQueue, ValidationError> {
    ValidationQueue::new(ctx)
}
