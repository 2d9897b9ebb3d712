//! Ledger-backed version store.
//!
//! # Responsibilities
//! - Keep an append-only arena of versions per scope
//! - Allocate per-scope version numbers
//! - Enforce "at most one published version per scope" atomically
//! - Maintain the published-version cache read by the resolver
//! - Optionally persist every mutation to a [`Journal`] and rebuild from it

use arc_swap::ArcSwapOption;
use dashmap::DashMap;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::model::{
    unix_now, ConfigScope, ConfigVersion, Payload, ValidationReport, VersionId, VersionStatus,
};
use crate::store::journal::{DraftRecord, Journal, JournalEvent};
use crate::store::{
    PageRequest, ScopeSummary, StoreError, StoreResult, VersionPage, VersionStore,
};

/// Versions of one scope.
struct LedgerState {
    /// Ascending `version_number`.
    versions: Vec<ConfigVersion>,
    positions: HashMap<VersionId, usize>,
    next_number: u64,
    /// Index of the version whose status is `Published`.
    published: Option<usize>,
}

impl Default for LedgerState {
    fn default() -> Self {
        Self {
            versions: Vec::new(),
            positions: HashMap::new(),
            next_number: 1,
            published: None,
        }
    }
}

impl LedgerState {
    fn push(&mut self, version: ConfigVersion) {
        self.next_number = self.next_number.max(version.version_number + 1);
        self.positions.insert(version.id, self.versions.len());
        self.versions.push(version);
    }

    fn position(&self, id: VersionId) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    fn get(&self, id: VersionId) -> Option<&ConfigVersion> {
        self.position(id).map(|i| &self.versions[i])
    }

    /// Demote the current published version and promote `idx`.
    fn promote(&mut self, idx: usize, actor: &str, at: u64) -> ConfigVersion {
        if let Some(prev) = self.published.take() {
            if prev != idx {
                let demoted = &mut self.versions[prev];
                demoted.status = VersionStatus::Superseded;
                demoted.superseded_at = Some(at);
            }
        }

        let promoted = &mut self.versions[idx];
        promoted.status = VersionStatus::Published;
        promoted.published_at = Some(at);
        promoted.published_by = Some(actor.to_string());
        self.published = Some(idx);
        promoted.clone()
    }

    fn check_published_index(&self) -> StoreResult<()> {
        let indexed = self.published.map(|i| self.versions.get(i).map(|v| v.status));
        match indexed {
            None | Some(Some(VersionStatus::Published)) => Ok(()),
            Some(_) => Err(StoreError::Invariant(
                "published index points at a non-published version".to_string(),
            )),
        }
    }

    fn published_version(&self) -> Option<&ConfigVersion> {
        self.published.map(|i| &self.versions[i])
    }
}

#[derive(Default)]
struct ScopeLedger {
    state: RwLock<LedgerState>,
    /// Snapshot of the published version, swapped under the write lock.
    live: ArcSwapOption<ConfigVersion>,
}

impl ScopeLedger {
    fn read(&self) -> StoreResult<RwLockReadGuard<'_, LedgerState>> {
        self.state
            .read()
            .map_err(|_| StoreError::Invariant("scope ledger lock poisoned".to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, LedgerState>> {
        self.state
            .write()
            .map_err(|_| StoreError::Invariant("scope ledger lock poisoned".to_string()))
    }

    fn refresh_live(&self, state: &LedgerState) {
        self.live
            .store(state.published_version().cloned().map(Arc::new));
    }
}

/// Version store keeping a ledger per scope, optionally journaled to disk.
pub struct LedgerStore {
    scopes: DashMap<ConfigScope, Arc<ScopeLedger>>,
    index: DashMap<VersionId, ConfigScope>,
    journal: Option<Journal>,
}

impl LedgerStore {
    /// A process-local store; contents are lost on restart.
    pub fn in_memory() -> Self {
        Self {
            scopes: DashMap::new(),
            index: DashMap::new(),
            journal: None,
        }
    }

    /// Open a journaled store, replaying `path` if it exists.
    pub fn open_journal(path: &Path, fsync: bool) -> StoreResult<Self> {
        let (journal, events) = Journal::open(path, fsync)?;
        let mut store = Self::in_memory();

        for (line, event) in events {
            store
                .apply(event)
                .map_err(|reason| StoreError::Corrupt { line, reason })?;
        }

        for entry in store.scopes.iter() {
            let state = entry.value().read()?;
            entry.value().refresh_live(&state);
        }

        tracing::info!(
            path = ?journal.path(),
            scopes = store.scopes.len(),
            versions = store.index.len(),
            "Version store recovered from journal"
        );

        store.journal = Some(journal);
        Ok(store)
    }

    pub fn is_durable(&self) -> bool {
        self.journal.is_some()
    }

    /// Replay one journal record.
    fn apply(&self, event: JournalEvent) -> Result<(), String> {
        match event {
            JournalEvent::Created { draft } => {
                if self.index.contains_key(&draft.id) {
                    return Err(format!("duplicate version id {}", draft.id));
                }
                let version = draft.into_version().map_err(|e| e.to_string())?;
                let ledger = self.ledger_or_insert(&version.scope);
                let mut state = ledger.write().map_err(|e| e.to_string())?;
                if version.version_number < state.next_number {
                    return Err(format!(
                        "version number {} reused in scope {}",
                        version.version_number, version.scope
                    ));
                }
                self.index.insert(version.id, version.scope.clone());
                state.push(version);
                Ok(())
            }
            JournalEvent::Published {
                scope,
                version_id,
                actor,
                at,
            } => {
                let ledger = self
                    .ledger(&scope)
                    .ok_or_else(|| format!("publish of {version_id} in unknown scope {scope}"))?;
                let mut state = ledger.write().map_err(|e| e.to_string())?;
                let idx = state
                    .position(version_id)
                    .ok_or_else(|| format!("publish of unknown version {version_id}"))?;
                state.promote(idx, &actor, at);
                Ok(())
            }
            JournalEvent::Report { version_id, report } => {
                let scope = self
                    .scope_of(version_id)
                    .ok_or_else(|| format!("report for unknown version {version_id}"))?;
                let ledger = self
                    .ledger(&scope)
                    .ok_or_else(|| format!("report in unknown scope {scope}"))?;
                let mut state = ledger.write().map_err(|e| e.to_string())?;
                let idx = state
                    .position(version_id)
                    .ok_or_else(|| format!("report for unknown version {version_id}"))?;
                state.versions[idx].validation_report = Some(report);
                Ok(())
            }
        }
    }

    fn append(&self, event: &JournalEvent) -> StoreResult<()> {
        match &self.journal {
            Some(journal) => journal.append(event),
            None => Ok(()),
        }
    }

    fn ledger(&self, scope: &ConfigScope) -> Option<Arc<ScopeLedger>> {
        self.scopes.get(scope).map(|r| Arc::clone(r.value()))
    }

    fn ledger_or_insert(&self, scope: &ConfigScope) -> Arc<ScopeLedger> {
        Arc::clone(self.scopes.entry(scope.clone()).or_default().value())
    }

    fn scope_of(&self, id: VersionId) -> Option<ConfigScope> {
        self.index.get(&id).map(|r| r.value().clone())
    }

    fn missing(&self, scope: &ConfigScope, id: VersionId) -> StoreError {
        match self.scope_of(id) {
            Some(actual) if &actual != scope => StoreError::ScopeMismatch {
                version_id: id,
                scope: scope.clone(),
            },
            _ => StoreError::NotFound(id),
        }
    }
}

impl VersionStore for LedgerStore {
    fn create_draft(
        &self,
        scope: &ConfigScope,
        payload: Payload,
        actor: &str,
    ) -> StoreResult<ConfigVersion> {
        let ledger = self.ledger_or_insert(scope);
        let mut state = ledger.write()?;

        // Burned if the append below fails.
        let number = state.next_number;
        state.next_number += 1;

        let version = ConfigVersion::draft(scope.clone(), number, payload, actor, unix_now());
        self.append(&JournalEvent::Created {
            draft: DraftRecord::from(&version),
        })?;

        self.index.insert(version.id, scope.clone());
        state.push(version.clone());

        tracing::debug!(
            scope = %scope,
            version_id = %version.id,
            version_number = number,
            "Draft stored"
        );
        Ok(version)
    }

    fn get_version(&self, id: VersionId) -> StoreResult<ConfigVersion> {
        let scope = self.scope_of(id).ok_or(StoreError::NotFound(id))?;
        let ledger = self.ledger(&scope).ok_or(StoreError::NotFound(id))?;
        let state = ledger.read()?;
        state.get(id).cloned().ok_or(StoreError::NotFound(id))
    }

    fn list_versions(&self, scope: &ConfigScope, page: PageRequest) -> StoreResult<VersionPage> {
        let Some(ledger) = self.ledger(scope) else {
            return Ok(VersionPage {
                versions: Vec::new(),
                next_cursor: None,
            });
        };
        let state = ledger.read()?;
        let limit = page.limit.max(1);

        let mut matching = state
            .versions
            .iter()
            .rev()
            .filter(|v| page.cursor.map_or(true, |cursor| v.version_number < cursor));

        let versions: Vec<ConfigVersion> = matching.by_ref().take(limit).cloned().collect();
        let next_cursor = match (matching.next(), versions.last()) {
            (Some(_), Some(last)) => Some(last.version_number),
            _ => None,
        };

        Ok(VersionPage {
            versions,
            next_cursor,
        })
    }

    fn mark_published(
        &self,
        scope: &ConfigScope,
        id: VersionId,
        actor: &str,
    ) -> StoreResult<ConfigVersion> {
        let ledger = self.ledger(scope).ok_or_else(|| self.missing(scope, id))?;
        let mut state = ledger.write()?;
        let idx = state.position(id).ok_or_else(|| self.missing(scope, id))?;

        if state.versions[idx].is_published() {
            return Ok(state.versions[idx].clone());
        }
        state.check_published_index()?;

        let at = unix_now();
        self.append(&JournalEvent::Published {
            scope: scope.clone(),
            version_id: id,
            actor: actor.to_string(),
            at,
        })?;

        let published = state.promote(idx, actor, at);
        ledger.live.store(Some(Arc::new(published.clone())));
        Ok(published)
    }

    fn attach_report(&self, id: VersionId, report: ValidationReport) -> StoreResult<ConfigVersion> {
        let scope = self.scope_of(id).ok_or(StoreError::NotFound(id))?;
        let ledger = self.ledger(&scope).ok_or(StoreError::NotFound(id))?;
        let mut state = ledger.write()?;
        let idx = state.position(id).ok_or(StoreError::NotFound(id))?;

        self.append(&JournalEvent::Report {
            version_id: id,
            report: report.clone(),
        })?;

        state.versions[idx].validation_report = Some(report);
        if state.published == Some(idx) {
            ledger.refresh_live(&state);
        }
        Ok(state.versions[idx].clone())
    }

    fn published(&self, scope: &ConfigScope) -> StoreResult<Option<Arc<ConfigVersion>>> {
        Ok(self.ledger(scope).and_then(|ledger| ledger.live.load_full()))
    }

    fn list_scopes(&self) -> StoreResult<Vec<ScopeSummary>> {
        let ledgers: Vec<(ConfigScope, Arc<ScopeLedger>)> = self
            .scopes
            .iter()
            .map(|r| (r.key().clone(), Arc::clone(r.value())))
            .collect();

        let mut summaries = Vec::with_capacity(ledgers.len());
        for (scope, ledger) in ledgers {
            let state = ledger.read()?;
            // A scope whose only draft failed to append.
            if state.versions.is_empty() {
                continue;
            }
            summaries.push(ScopeSummary {
                scope,
                version_count: state.versions.len(),
                latest_version_number: state.versions.last().map(|v| v.version_number),
                published_version_number: state.published_version().map(|v| v.version_number),
            });
        }
        summaries.sort_by(|a, b| a.scope.cmp(&b.scope));
        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn theme() -> ConfigScope {
        ConfigScope::global("theme").unwrap()
    }

    fn published_count(store: &LedgerStore, scope: &ConfigScope) -> usize {
        store
            .list_versions(scope, PageRequest::first(10_000))
            .unwrap()
            .versions
            .iter()
            .filter(|v| v.is_published())
            .count()
    }

    #[test]
    fn test_payload_roundtrip() {
        let store = LedgerStore::in_memory();
        let payload = json!({
            "light": {"button_bg": "#FFFFFF", "button_text": "#111111"},
            "weird": [1, 2.5, null, {"nested": true}],
            "unicode": "Straße ✓"
        });
        let created = store.create_draft(&theme(), payload.clone().into(), "alice").unwrap();
        let fetched = store.get_version(created.id).unwrap();
        assert_eq!(fetched.payload, payload);
        assert_eq!(fetched.created_by, "alice");
        assert_eq!(fetched.status, VersionStatus::Draft);
    }

    #[test]
    fn test_version_numbers_per_scope() {
        let store = LedgerStore::in_memory();
        let de = ConfigScope::new("theme", "DE").unwrap();
        let a = store.create_draft(&theme(), json!({}).into(), "a").unwrap();
        let b = store.create_draft(&theme(), json!({}).into(), "a").unwrap();
        let c = store.create_draft(&de, json!({}).into(), "a").unwrap();
        assert_eq!(a.version_number, 1);
        assert_eq!(b.version_number, 2);
        assert_eq!(c.version_number, 1);
    }

    #[test]
    fn test_listing_is_newest_first_and_paginated() {
        let store = LedgerStore::in_memory();
        for i in 0..5 {
            store.create_draft(&theme(), json!({ "i": i }).into(), "a").unwrap();
        }
        store
            .create_draft(&ConfigScope::global("footer_layout").unwrap(), json!({}).into(), "a")
            .unwrap();

        let first = store.list_versions(&theme(), PageRequest::first(2)).unwrap();
        let numbers: Vec<u64> = first.versions.iter().map(|v| v.version_number).collect();
        assert_eq!(numbers, vec![5, 4]);
        assert_eq!(first.next_cursor, Some(4));

        let second = store
            .list_versions(&theme(), PageRequest { cursor: first.next_cursor, limit: 2 })
            .unwrap();
        let numbers: Vec<u64> = second.versions.iter().map(|v| v.version_number).collect();
        assert_eq!(numbers, vec![3, 2]);

        let last = store
            .list_versions(&theme(), PageRequest { cursor: second.next_cursor, limit: 2 })
            .unwrap();
        assert_eq!(last.versions.len(), 1);
        assert_eq!(last.next_cursor, None);
        assert!(last.versions.iter().all(|v| v.scope == theme()));
    }

    #[test]
    fn test_list_unknown_scope_is_empty() {
        let store = LedgerStore::in_memory();
        let page = store
            .list_versions(&ConfigScope::global("nav_menu").unwrap(), PageRequest::first(10))
            .unwrap();
        assert!(page.versions.is_empty());
        assert!(page.next_cursor.is_none());
    }

    #[test]
    fn test_mark_published_demotes_previous() {
        let store = LedgerStore::in_memory();
        let v1 = store.create_draft(&theme(), json!({"v": 1}).into(), "a").unwrap();
        let v2 = store.create_draft(&theme(), json!({"v": 2}).into(), "a").unwrap();

        store.mark_published(&theme(), v1.id, "ops").unwrap();
        assert_eq!(store.published(&theme()).unwrap().unwrap().id, v1.id);

        let promoted = store.mark_published(&theme(), v2.id, "ops").unwrap();
        assert_eq!(promoted.status, VersionStatus::Published);
        assert_eq!(promoted.published_by.as_deref(), Some("ops"));

        let demoted = store.get_version(v1.id).unwrap();
        assert_eq!(demoted.status, VersionStatus::Superseded);
        assert!(demoted.superseded_at.is_some());
        assert_eq!(published_count(&store, &theme()), 1);
        assert_eq!(store.published(&theme()).unwrap().unwrap().id, v2.id);
    }

    #[test]
    fn test_mark_published_is_idempotent() {
        let store = LedgerStore::in_memory();
        let v1 = store.create_draft(&theme(), json!({}).into(), "a").unwrap();
        let first = store.mark_published(&theme(), v1.id, "ops").unwrap();
        let second = store.mark_published(&theme(), v1.id, "someone-else").unwrap();
        assert_eq!(first, second);
        assert_eq!(published_count(&store, &theme()), 1);
    }

    #[test]
    fn test_rollback_keeps_version_numbers() {
        let store = LedgerStore::in_memory();
        let v1 = store.create_draft(&theme(), json!({"v": 1}).into(), "a").unwrap();
        let v2 = store.create_draft(&theme(), json!({"v": 2}).into(), "a").unwrap();
        store.mark_published(&theme(), v1.id, "ops").unwrap();
        store.mark_published(&theme(), v2.id, "ops").unwrap();

        let rolled_back = store.mark_published(&theme(), v1.id, "ops").unwrap();
        assert_eq!(rolled_back.version_number, 1);
        assert_eq!(rolled_back.status, VersionStatus::Published);

        let v2_now = store.get_version(v2.id).unwrap();
        assert_eq!(v2_now.status, VersionStatus::Superseded);
        assert_eq!(v2_now.version_number, 2);

        // Rollback creates no version.
        let next = store.create_draft(&theme(), json!({}).into(), "a").unwrap();
        assert_eq!(next.version_number, 3);
    }

    #[test]
    fn test_mark_published_scope_checks() {
        let store = LedgerStore::in_memory();
        let v1 = store.create_draft(&theme(), json!({}).into(), "a").unwrap();
        let footer = ConfigScope::global("footer_layout").unwrap();
        store.create_draft(&footer, json!({}).into(), "a").unwrap();

        assert!(matches!(
            store.mark_published(&footer, v1.id, "ops"),
            Err(StoreError::ScopeMismatch { .. })
        ));
        assert!(matches!(
            store.mark_published(&theme(), VersionId::new(), "ops"),
            Err(StoreError::NotFound(_))
        ));
        assert!(store.published(&footer).unwrap().is_none());
        assert_eq!(store.get_version(v1.id).unwrap().status, VersionStatus::Draft);
    }

    #[test]
    fn test_get_unknown_version() {
        let store = LedgerStore::in_memory();
        assert!(matches!(
            store.get_version(VersionId::new()),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_attach_report_updates_cache() {
        let store = LedgerStore::in_memory();
        let v1 = store.create_draft(&theme(), json!({}).into(), "a").unwrap();
        store.mark_published(&theme(), v1.id, "ops").unwrap();
        store.attach_report(v1.id, ValidationReport::passed()).unwrap();

        let live = store.published(&theme()).unwrap().unwrap();
        assert_eq!(live.validation_report, Some(ValidationReport::passed()));
    }

    #[test]
    fn test_list_scopes() {
        let store = LedgerStore::in_memory();
        let v1 = store.create_draft(&theme(), json!({}).into(), "a").unwrap();
        store.create_draft(&theme(), json!({}).into(), "a").unwrap();
        store
            .create_draft(&ConfigScope::new("theme", "DE").unwrap(), json!({}).into(), "a")
            .unwrap();
        store.mark_published(&theme(), v1.id, "ops").unwrap();

        let scopes = store.list_scopes().unwrap();
        assert_eq!(scopes.len(), 2);
        let global = scopes.iter().find(|s| s.scope == theme()).unwrap();
        assert_eq!(global.version_count, 2);
        assert_eq!(global.latest_version_number, Some(2));
        assert_eq!(global.published_version_number, Some(1));
    }

    #[test]
    fn test_concurrent_publishes_keep_single_published() {
        let store = Arc::new(LedgerStore::in_memory());
        let scope = theme();
        let ids: Vec<VersionId> = (0..16)
            .map(|i| store.create_draft(&scope, json!({ "i": i }).into(), "a").unwrap().id)
            .collect();
        let first = ids[0];
        store.mark_published(&scope, first, "seed").unwrap();

        let done = Arc::new(AtomicBool::new(false));
        std::thread::scope(|s| {
            let reader_store = Arc::clone(&store);
            let reader_done = Arc::clone(&done);
            let reader_scope = scope.clone();
            s.spawn(move || {
                while !reader_done.load(Ordering::SeqCst) {
                    assert_eq!(published_count(&reader_store, &reader_scope), 1);
                    assert!(reader_store.published(&reader_scope).unwrap().is_some());
                }
            });

            let publishers: Vec<_> = ids
                .iter()
                .copied()
                .map(|id| {
                    let store = Arc::clone(&store);
                    let scope = scope.clone();
                    s.spawn(move || {
                        for _ in 0..20 {
                            store.mark_published(&scope, id, "racer").unwrap();
                        }
                    })
                })
                .collect();
            for publisher in publishers {
                publisher.join().unwrap();
            }
            done.store(true, Ordering::SeqCst);
        });

        assert_eq!(published_count(&store, &scope), 1);
        let live = store.published(&scope).unwrap().unwrap();
        let stored = store.get_version(live.id).unwrap();
        assert!(stored.is_published());

        let page = store.list_versions(&scope, PageRequest::first(100)).unwrap();
        let superseded = page
            .versions
            .iter()
            .filter(|v| v.status == VersionStatus::Superseded)
            .count();
        assert_eq!(superseded, ids.len() - 1);
    }

    #[test]
    fn test_journal_recovery() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("versions.jsonl");
        let scope = theme();
        let (v1, v2) = {
            let store = LedgerStore::open_journal(&path, false).unwrap();
            assert!(store.is_durable());
            let v1 = store.create_draft(&scope, json!({"v": 1}).into(), "a").unwrap();
            let v2 = store.create_draft(&scope, json!({"v": 2}).into(), "a").unwrap();
            store.mark_published(&scope, v1.id, "ops").unwrap();
            store.attach_report(v2.id, ValidationReport::passed()).unwrap();
            store.mark_published(&scope, v2.id, "ops").unwrap();
            (v1, v2)
        };

        let store = LedgerStore::open_journal(&path, false).unwrap();
        assert_eq!(store.get_version(v1.id).unwrap().status, VersionStatus::Superseded);
        let recovered = store.get_version(v2.id).unwrap();
        assert_eq!(recovered.status, VersionStatus::Published);
        assert_eq!(recovered.validation_report, Some(ValidationReport::passed()));
        assert_eq!(recovered.payload, json!({"v": 2}));
        assert_eq!(store.published(&scope).unwrap().unwrap().id, v2.id);

        let v3 = store.create_draft(&scope, json!({"v": 3}).into(), "a").unwrap();
        assert_eq!(v3.version_number, 3);
    }

    fn journal(store: &LedgerStore) -> &Journal {
        store.journal.as_ref().unwrap()
    }

    #[test]
    fn test_failed_draft_append_burns_number() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("versions.jsonl");
        let scope = theme();

        {
            let store = LedgerStore::open_journal(&path, false).unwrap();
            journal(&store).set_writable(false).unwrap();
            let err = store.create_draft(&scope, json!({"v": 1}).into(), "a").unwrap_err();
            assert!(err.is_transient());
            assert!(store
                .list_versions(&scope, PageRequest::first(10))
                .unwrap()
                .versions
                .is_empty());
            assert_eq!(store.index.len(), 0);
            assert!(store.list_scopes().unwrap().is_empty());

            journal(&store).set_writable(true).unwrap();
            let draft = store.create_draft(&scope, json!({"v": 2}).into(), "a").unwrap();
            assert_eq!(draft.version_number, 2);
        }

        let store = LedgerStore::open_journal(&path, false).unwrap();
        let page = store.list_versions(&scope, PageRequest::first(10)).unwrap();
        let numbers: Vec<u64> = page.versions.iter().map(|v| v.version_number).collect();
        assert_eq!(numbers, vec![2]);
        let next = store.create_draft(&scope, json!({"v": 3}).into(), "a").unwrap();
        assert_eq!(next.version_number, 3);
    }

    #[test]
    fn test_failed_publish_append_changes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("versions.jsonl");
        let scope = theme();

        let (v1, v2) = {
            let store = LedgerStore::open_journal(&path, false).unwrap();
            let v1 = store.create_draft(&scope, json!({"v": 1}).into(), "a").unwrap();
            let v2 = store.create_draft(&scope, json!({"v": 2}).into(), "a").unwrap();
            store.mark_published(&scope, v1.id, "ops").unwrap();

            journal(&store).set_writable(false).unwrap();
            assert!(matches!(
                store.mark_published(&scope, v2.id, "ops"),
                Err(StoreError::Io(_))
            ));
            assert!(matches!(
                store.attach_report(v2.id, ValidationReport::passed()),
                Err(StoreError::Io(_))
            ));

            assert_eq!(store.get_version(v1.id).unwrap().status, VersionStatus::Published);
            let untouched = store.get_version(v2.id).unwrap();
            assert_eq!(untouched.status, VersionStatus::Draft);
            assert!(untouched.published_at.is_none());
            assert!(untouched.validation_report.is_none());
            assert_eq!(store.published(&scope).unwrap().unwrap().id, v1.id);
            assert_eq!(published_count(&store, &scope), 1);
            (v1, v2)
        };

        let store = LedgerStore::open_journal(&path, false).unwrap();
        assert_eq!(store.get_version(v1.id).unwrap().status, VersionStatus::Published);
        assert_eq!(store.get_version(v2.id).unwrap().status, VersionStatus::Draft);
        assert_eq!(store.published(&scope).unwrap().unwrap().id, v1.id);
    }
}
