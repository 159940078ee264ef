//! Validator registry - central management of all validators

use super::*;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info};

/// Validator spec as serialized by the server, one per rule on a field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatorSpec {
    /// Validator kind (presence, length, ...)
    pub kind: String,

    /// Kind-specific options
    #[serde(default)]
    pub options: Options,

    /// Message key to message
    #[serde(default)]
    pub messages: Messages,

    /// Value the record held when the form was rendered (uniqueness only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_value: Option<serde_json::Value>,
}

impl ValidatorSpec {
    /// Parse a field's serialized rule list
    pub fn parse_list(raw: &str) -> Result<Vec<ValidatorSpec>, ValidationError> {
        serde_json::from_str(raw)
            .map_err(|e| ValidationError::Config(format!("Malformed validator specs: {}", e)))
    }

    /// Whether the rule is skipped for blank values
    pub fn allows_blank(&self) -> bool {
        matches!(self.options.get("allow_blank"), Some(serde_json::Value::Bool(true)))
    }
}

/// Registry of all known validator kinds
#[derive(Clone)]
pub struct ValidatorRegistry {
    /// Validators by kind
    validators: HashMap<String, Arc<dyn Validator>>,
}

static GLOBAL: OnceLock<RwLock<Arc<ValidatorRegistry>>> = OnceLock::new();

impl ValidatorRegistry {
    /// Create a new validator registry with the built-in validators
    pub fn new() -> Self {
        let mut registry = Self::empty();

        // Register built-in validators
        registry.register_builtin_validators();

        registry
    }

    /// Create a registry with no validators at all
    pub fn empty() -> Self {
        Self {
            validators: HashMap::new(),
        }
    }

    /// Process-wide registry, initialized with the built-ins on first use
    ///
    /// Readers take a snapshot by cloning the `Arc`; registration copies the
    /// registry if a snapshot is still alive.
    pub fn global() -> &'static RwLock<Arc<ValidatorRegistry>> {
        GLOBAL.get_or_init(|| RwLock::new(Arc::new(ValidatorRegistry::new())))
    }

    /// Current snapshot of the process-wide registry
    pub fn snapshot() -> Arc<ValidatorRegistry> {
        Arc::clone(&Self::global().read())
    }

    /// Register all built-in validators
    fn register_builtin_validators(&mut self) {
        info!("🔧 Registering built-in validators");

        self.register_validator("presence", Arc::new(builtin::PresenceValidator::new()));
        self.register_validator("length", Arc::new(builtin::LengthValidator::new()));
        self.register_validator("exclusion", Arc::new(builtin::ExclusionValidator::new()));
        self.register_validator("inclusion", Arc::new(builtin::InclusionValidator::new()));
        self.register_validator("numericality", Arc::new(builtin::NumericalityValidator::new()));
        self.register_validator("format", Arc::new(builtin::FormatValidator::new()));
        self.register_validator("acceptance", Arc::new(builtin::AcceptanceValidator::new()));
        self.register_validator("confirmation", Arc::new(builtin::ConfirmationValidator::new()));
        self.register_validator("uniqueness", Arc::new(builtin::UniquenessValidator::new()));

        info!("✅ Registered {} built-in validators", self.validators.len());
    }

    /// Register a validator under `kind`, replacing any previous one
    pub fn register_validator(&mut self, kind: &str, validator: Arc<dyn Validator>) {
        debug!("Registering validator: {} ({})", kind, validator.validator_type());
        self.validators.insert(kind.to_string(), validator);
    }

    /// Register a closure as a custom validator kind
    pub fn register_fn<F>(&mut self, kind: &str, check: F)
    where
        F: Fn(&FieldContext, &Options, &Messages) -> Result<Validation, ValidationError>
            + Send
            + Sync
            + 'static,
    {
        self.register_validator(kind, Arc::new(FnValidator::new(kind, check)));
    }

    /// Get a validator by kind
    pub fn get(&self, kind: &str) -> Option<Arc<dyn Validator>> {
        self.validators.get(kind).cloned()
    }

    /// Get a validator by kind, failing for unknown kinds
    pub fn require(&self, kind: &str) -> Result<Arc<dyn Validator>, ValidationError> {
        self.get(kind)
            .ok_or_else(|| ValidationError::Config(format!("Unknown validator kind '{}'", kind)))
    }

    /// Get all validator kinds
    pub fn validator_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.validators.keys().cloned().collect();
        names.sort();
        names
    }
}

/// Register a custom validator kind on the process-wide registry
pub fn register_custom(kind: &str, validator: Arc<dyn Validator>) {
    let mut global = ValidatorRegistry::global().write();
    Arc::make_mut(&mut global).register_validator(kind, validator);
}

impl Default for ValidatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatorRegistry")
            .field("validators", &self.validator_names())
            .finish()
    }
}
