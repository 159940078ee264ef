//! Validation context - data passed to validators
//!
//! The host environment (the form, its controls, the network) is reached
//! through the [`Element`], [`Document`] and [`Transport`] traits.
//! [`FormField`] and [`FormDocument`] are in-memory implementations.

use super::result::ValidationError;
use crate::config::Settings;
use crate::transport::Transport;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// An input control on the host side
pub trait Element: Send + Sync {
    /// Composite field name, e.g. `user[email]`
    fn name(&self) -> &str;

    /// DOM-style identifier, if any
    fn id(&self) -> Option<&str>;

    /// Current value
    fn value(&self) -> String;

    /// Checked state for checkbox-like controls
    fn checked(&self) -> Option<bool>;

    /// Serialized validator specs (a JSON array), if the control has any
    fn rules(&self) -> Option<String>;
}

/// Lookup of other controls
pub trait Document: Send + Sync {
    fn element_by_id(&self, id: &str) -> Option<Arc<dyn Element>>;
}

/// In-memory input control
#[derive(Debug)]
pub struct FormField {
    name: String,
    id: Option<String>,
    value: RwLock<String>,
    checked: RwLock<Option<bool>>,
    rules: Option<String>,
}

impl FormField {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            value: RwLock::new(value.into()),
            checked: RwLock::new(None),
            rules: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_checked(self, checked: bool) -> Self {
        *self.checked.write() = Some(checked);
        self
    }

    /// Attach serialized validator specs
    pub fn with_rules(mut self, rules: impl Into<String>) -> Self {
        self.rules = Some(rules.into());
        self
    }

    pub fn set_value(&self, value: impl Into<String>) {
        *self.value.write() = value.into();
    }

    pub fn set_checked(&self, checked: bool) {
        *self.checked.write() = Some(checked);
    }
}

impl Element for FormField {
    fn name(&self) -> &str {
        &self.name
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn value(&self) -> String {
        self.value.read().clone()
    }

    fn checked(&self) -> Option<bool> {
        *self.checked.read()
    }

    fn rules(&self) -> Option<String> {
        self.rules.clone()
    }
}

/// In-memory control lookup keyed by id
#[derive(Default)]
pub struct FormDocument {
    elements: RwLock<HashMap<String, Arc<dyn Element>>>,
}

impl FormDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `element` under `id`
    pub fn insert(&self, id: impl Into<String>, element: Arc<dyn Element>) {
        self.elements.write().insert(id.into(), element);
    }

    /// Register a field under its own id; fields without an id are ignored
    pub fn add(&self, field: Arc<FormField>) -> bool {
        match field.id().map(str::to_string) {
            Some(id) => {
                self.insert(id, field);
                true
            }
            None => false,
        }
    }
}

impl Document for FormDocument {
    fn element_by_id(&self, id: &str) -> Option<Arc<dyn Element>> {
        self.elements.read().get(id).cloned()
    }
}

impl std::fmt::Debug for FormDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormDocument")
            .field("elements", &self.elements.read().keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Context provided to validators during validation
///
/// Binds one element to the collaborators its checks may need.
#[derive(Clone)]
pub struct FieldContext {
    /// Control being validated
    pub element: Arc<dyn Element>,

    /// Lookup for companion controls
    pub document: Arc<dyn Document>,

    /// Network access for remote checks
    pub transport: Option<Arc<dyn Transport>>,

    /// Shared settings
    pub settings: Arc<Settings>,
}

impl FieldContext {
    /// Context with an empty document, no transport and default settings
    pub fn new(element: Arc<dyn Element>) -> Self {
        Self {
            element,
            document: Arc::new(FormDocument::new()),
            transport: None,
            settings: Arc::new(Settings::default()),
        }
    }

    pub fn with_document(mut self, document: Arc<dyn Document>) -> Self {
        self.document = document;
        self
    }

    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn with_settings(mut self, settings: Arc<Settings>) -> Self {
        self.settings = settings;
        self
    }

    /// Current value of the bound element
    pub fn value(&self) -> String {
        self.element.value()
    }

    /// Companion control `<id>_confirmation` of the bound element
    pub fn confirmation_companion(&self) -> Result<Arc<dyn Element>, ValidationError> {
        let id = self.element.id().ok_or_else(|| {
            ValidationError::MissingCompanion(format!(
                "field '{}' has no id to derive a confirmation companion from",
                self.element.name()
            ))
        })?;

        let companion_id = format!("{}_confirmation", id);
        self.document
            .element_by_id(&companion_id)
            .ok_or(ValidationError::MissingCompanion(companion_id))
    }
}

impl std::fmt::Debug for FieldContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldContext")
            .field("element", &self.element.name())
            .field("transport", &self.transport.is_some())
            .field("settings", &self.settings)
            .finish()
    }
}
