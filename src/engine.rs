//! Engine facade tying store, validators, coordinator and resolver together.
//!
//! All methods are synchronous. Async callers run the mutating ones on the
//! blocking pool.

use arc_swap::ArcSwap;
use serde_json::Value;
use std::sync::Arc;

use crate::config::{EngineConfig, StorageBackend, ValidatorRules};
use crate::error::EngineError;
use crate::model::{ConfigScope, ConfigVersion, Payload, ValidationReport, VersionId};
use crate::observability::metrics;
use crate::publish::coordinator::storage_failure;
use crate::publish::{PublishCoordinator, PublishResult};
use crate::resolver::{ResolvedConfig, ScopeResolver};
use crate::store::{LedgerStore, PageRequest, ScopeSummary, StoreError, VersionPage, VersionStore};
use crate::validators::ValidatorRegistry;

/// Longest accepted actor name.
pub const MAX_ACTOR_LEN: usize = 128;

/// The configuration versioning and publication engine.
#[derive(Clone)]
pub struct ConfigEngine {
    store: Arc<dyn VersionStore>,
    coordinator: PublishCoordinator,
    resolver: Arc<ScopeResolver>,
    durable: bool,
}

impl ConfigEngine {
    /// Assemble an engine over an existing store.
    pub fn new(store: Arc<dyn VersionStore>, rules: &ValidatorRules, fallback_to_global: bool) -> Self {
        let validators = Arc::new(ArcSwap::from_pointee(ValidatorRegistry::with_builtin(rules)));
        Self {
            coordinator: PublishCoordinator::new(Arc::clone(&store), validators),
            resolver: Arc::new(ScopeResolver::new(Arc::clone(&store), fallback_to_global)),
            store,
            durable: false,
        }
    }

    /// Open the configured store (replaying the journal) and build the engine.
    pub fn from_config(config: &EngineConfig) -> Result<Self, StoreError> {
        let (store, durable) = match config.storage.backend {
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory storage; versions are lost on restart");
                (LedgerStore::in_memory(), false)
            }
            StorageBackend::Journal => (
                LedgerStore::open_journal(&config.storage.journal_path, config.storage.fsync)?,
                true,
            ),
        };
        let mut engine = Self::new(
            Arc::new(store),
            &config.validators,
            config.resolver.fallback_to_global,
        );
        engine.durable = durable;
        Ok(engine)
    }

    /// Persist a new draft for `scope`.
    ///
    /// The payload must parse into a [`Value`] so it can be validated later;
    /// anything nested past serde_json's depth limit is refused.
    pub fn save_draft(
        &self,
        scope: &ConfigScope,
        payload: impl Into<Payload>,
        actor: &str,
    ) -> Result<ConfigVersion, EngineError> {
        check_actor(actor)?;
        let payload = payload.into();
        parsed(&payload)?;
        let version = self
            .store
            .create_draft(scope, payload, actor)
            .map_err(|e| storage_failure("create_draft", e))?;
        tracing::info!(
            scope = %scope,
            version_id = %version.id,
            version_number = version.version_number,
            actor = %actor,
            "Draft saved"
        );
        metrics::record_draft_created(scope.scope_type());
        Ok(version)
    }

    pub fn get_version(&self, id: VersionId) -> Result<ConfigVersion, EngineError> {
        self.store
            .get_version(id)
            .map_err(|e| storage_failure("get_version", e))
    }

    pub fn list_versions(
        &self,
        scope: &ConfigScope,
        page: PageRequest,
    ) -> Result<VersionPage, EngineError> {
        self.store
            .list_versions(scope, page)
            .map_err(|e| storage_failure("list_versions", e))
    }

    pub fn publish(&self, id: VersionId, actor: &str) -> Result<PublishResult, EngineError> {
        check_actor(actor)?;
        self.coordinator.publish(id, actor)
    }

    pub fn resolve_current(&self, scope: &ConfigScope) -> ResolvedConfig {
        self.resolver.resolve_current(scope)
    }

    pub fn validate_version(&self, id: VersionId) -> Result<ValidationReport, EngineError> {
        self.coordinator.validate_version(id)
    }

    pub fn validate_payload(
        &self,
        scope: &ConfigScope,
        payload: &Payload,
    ) -> Result<ValidationReport, EngineError> {
        self.coordinator.validate_payload(scope, &*parsed(payload)?)
    }

    pub fn list_scopes(&self) -> Result<Vec<ScopeSummary>, EngineError> {
        self.store
            .list_scopes()
            .map_err(|e| storage_failure("list_scopes", e))
    }

    /// Apply the hot-reloadable parts of a new configuration.
    pub fn reload(&self, config: &EngineConfig) {
        self.coordinator
            .validators()
            .store(Arc::new(ValidatorRegistry::with_builtin(&config.validators)));
        self.resolver
            .set_fallback_to_global(config.resolver.fallback_to_global);
        tracing::info!(
            fallback_to_global = config.resolver.fallback_to_global,
            "Validator rules and resolver policy reloaded"
        );
    }

    pub fn validator_types(&self) -> Vec<String> {
        self.coordinator.validators().load().registered_types()
    }

    pub fn is_durable(&self) -> bool {
        self.durable
    }

    pub fn fallback_to_global(&self) -> bool {
        self.resolver.fallback_to_global()
    }
}

fn parsed(payload: &Payload) -> Result<std::borrow::Cow<'_, Value>, EngineError> {
    payload
        .to_value()
        .map_err(|e| EngineError::InvalidRequest(format!("payload rejected: {e}")))
}

fn check_actor(actor: &str) -> Result<(), EngineError> {
    if actor.trim().is_empty() {
        return Err(EngineError::InvalidRequest("actor must not be empty".to_string()));
    }
    if actor.len() > MAX_ACTOR_LEN {
        return Err(EngineError::InvalidRequest(format!(
            "actor exceeds {MAX_ACTOR_LEN} bytes"
        )));
    }
    Ok(())
}
