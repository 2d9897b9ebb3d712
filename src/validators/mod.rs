//! Pluggable publish-time validators.
//!
//! # Data Flow
//! ```text
//! publish(version)
//!     → ValidatorRegistry::run(scope_type, payload)
//!         → registered Validator for scope_type (or pass-through)
//!         → panic / error → ValidatorError (publish aborts, nothing changes)
//!     → ValidationReport { pass, entries }
//! ```
//!
//! # Design Decisions
//! - Validators are pure functions of the payload and their rules
//! - Unknown scope types pass through so new config families work immediately
//! - Rules come from the `[validators]` config section; a reload builds a new
//!   registry and swaps it in whole

pub mod contrast;
pub mod layout;

use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use thiserror::Error;

use crate::config::ValidatorRules;
use crate::model::scope::{FOOTER_LAYOUT, HOME_CATEGORY_LAYOUT, NAV_MENU, SHOWCASE_LAYOUT, THEME};
use crate::model::{ValidationEntry, ValidationReport};

pub use contrast::ThemeContrastValidator;
pub use layout::{
    FooterLayoutValidator, HomeCategoryLayoutValidator, NavMenuValidator, ShowcaseLayoutValidator,
};

/// A validator crashed instead of producing a report.
#[derive(Debug, Error)]
pub enum ValidatorError {
    #[error("validator {validator} failed: {reason}")]
    Failed { validator: String, reason: String },

    #[error("validator {validator} panicked: {message}")]
    Panicked { validator: String, message: String },
}

/// A deterministic rule check for one config family.
pub trait Validator: Send + Sync {
    fn name(&self) -> &'static str;

    /// Evaluate `payload`. Findings go into the report; `Err` is reserved for
    /// defects in the validator itself.
    fn validate(&self, payload: &Value) -> Result<ValidationReport, ValidatorError>;
}

/// Accepts every payload.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassThroughValidator;

impl Validator for PassThroughValidator {
    fn name(&self) -> &'static str {
        "pass_through"
    }

    fn validate(&self, _payload: &Value) -> Result<ValidationReport, ValidatorError> {
        Ok(ValidationReport::passed())
    }
}

/// Validators keyed by scope type.
#[derive(Clone)]
pub struct ValidatorRegistry {
    validators: HashMap<String, Arc<dyn Validator>>,
    fallback: Arc<dyn Validator>,
}

impl ValidatorRegistry {
    /// A registry where every scope type passes through.
    pub fn empty() -> Self {
        Self {
            validators: HashMap::new(),
            fallback: Arc::new(PassThroughValidator),
        }
    }

    /// The built-in validators configured with `rules`.
    pub fn with_builtin(rules: &ValidatorRules) -> Self {
        let mut registry = Self::empty();
        registry.register(THEME, Arc::new(ThemeContrastValidator::new(rules.contrast.clone())));
        registry.register(FOOTER_LAYOUT, Arc::new(FooterLayoutValidator::new(rules.footer.clone())));
        registry.register(
            SHOWCASE_LAYOUT,
            Arc::new(ShowcaseLayoutValidator::new(rules.showcase.clone())),
        );
        registry.register(
            HOME_CATEGORY_LAYOUT,
            Arc::new(HomeCategoryLayoutValidator::new(rules.home_category.clone())),
        );
        registry.register(NAV_MENU, Arc::new(NavMenuValidator::new(rules.nav_menu.clone())));
        registry
    }

    /// Register (or replace) the validator for `scope_type`.
    pub fn register(&mut self, scope_type: &str, validator: Arc<dyn Validator>) {
        self.validators.insert(scope_type.to_string(), validator);
    }

    pub fn get(&self, scope_type: &str) -> Arc<dyn Validator> {
        self.validators
            .get(scope_type)
            .cloned()
            .unwrap_or_else(|| Arc::clone(&self.fallback))
    }

    pub fn registered_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.validators.keys().cloned().collect();
        types.sort();
        types
    }

    /// Run the validator for `scope_type`, converting panics into errors.
    pub fn run(&self, scope_type: &str, payload: &Value) -> Result<ValidationReport, ValidatorError> {
        let validator = self.get(scope_type);
        match panic::catch_unwind(AssertUnwindSafe(|| validator.validate(payload))) {
            Ok(result) => result,
            Err(panic) => Err(ValidatorError::Panicked {
                validator: validator.name().to_string(),
                message: panic_message(panic.as_ref()),
            }),
        }
    }
}

impl Default for ValidatorRegistry {
    fn default() -> Self {
        Self::with_builtin(&ValidatorRules::default())
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// The payload as an object, or an `invalid_shape` error entry.
pub(crate) fn object_payload<'a>(
    family: &str,
    payload: &'a Value,
    entries: &mut Vec<ValidationEntry>,
) -> Option<&'a Map<String, Value>> {
    match payload.as_object() {
        Some(map) => Some(map),
        None => {
            entries.push(ValidationEntry::error(
                "invalid_shape",
                format!("{family} payload must be a JSON object"),
                json!({ "field": "$" }),
            ));
            None
        }
    }
}
