//! Sim State Store
//!
//! In-memory store for deterministic tests. Holds state behind an `RwLock`
//! and consults a shared [`FaultInjector`] before every operation, so tests
//! can script read failures, write failures, and corrupted-state recovery.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tracing::warn;

use super::{PersistedState, StateStore, StoreError};
use crate::history::CycleRecord;
use crate::sim::{FaultInjector, FaultType};
use crate::thought::Thought;

/// Deterministic in-memory state store.
#[derive(Debug)]
pub struct SimStateStore {
    state: RwLock<PersistedState>,
    faults: Arc<FaultInjector>,
}

impl SimStateStore {
    /// Create an empty store with no faults registered.
    #[must_use]
    pub fn new() -> Self {
        Self::with_faults(Arc::new(FaultInjector::disabled()))
    }

    /// Create an empty store with a shared fault injector.
    #[must_use]
    pub fn with_faults(faults: Arc<FaultInjector>) -> Self {
        Self {
            state: RwLock::new(PersistedState::empty()),
            faults,
        }
    }

    /// Pre-seed the store, as if a previous run had persisted this state.
    #[must_use]
    pub fn with_state(self, state: PersistedState) -> Self {
        *self.state.write().unwrap() = state;
        self
    }

    /// Number of archive cells currently persisted.
    #[must_use]
    pub fn persisted_cells(&self) -> usize {
        self.state.read().unwrap().archive.len()
    }

    /// Number of history records currently persisted.
    #[must_use]
    pub fn persisted_records(&self) -> usize {
        self.state.read().unwrap().history.len()
    }
}

impl Default for SimStateStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StateStore for SimStateStore {
    async fn load(&self) -> Result<PersistedState, StoreError> {
        match self.faults.should_inject("load") {
            Some(FaultType::StorageCorruption) => {
                warn!("simulated corrupt state, starting from empty state");
                return Ok(PersistedState::empty());
            }
            Some(_) => return Err(StoreError::fault_injected("load")),
            None => {}
        }

        Ok(self.state.read().unwrap().clone())
    }

    async fn save_archive(&self, archive: &BTreeMap<String, Thought>) -> Result<(), StoreError> {
        if self.faults.should_inject("save_archive").is_some() {
            return Err(StoreError::fault_injected("save_archive"));
        }

        self.state.write().unwrap().archive = archive.clone();
        Ok(())
    }

    async fn save_history(&self, history: &[CycleRecord]) -> Result<(), StoreError> {
        if self.faults.should_inject("save_history").is_some() {
            return Err(StoreError::fault_injected("save_history"));
        }

        self.state.write().unwrap().history = history.to_vec();
        Ok(())
    }

    fn name(&self) -> &'static str {
        "sim-store"
    }

    fn is_simulation(&self) -> bool {
        true
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::NicheKey;
    use crate::sim::{DeterministicRng, FaultConfig};
    use crate::thought::{DraftThought, FitnessReport};

    fn sample_thought() -> Thought {
        Thought::assemble(
            DraftThought::new("sim persisted insight"),
            NicheKey::new("strategic", "abductive_inference"),
            FitnessReport::new(0.4, 0.4, 0.4, 0.4),
            1,
        )
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let store = SimStateStore::new();
        let thought = sample_thought();
        let mut archive = BTreeMap::new();
        archive.insert(thought.niche_key().to_string(), thought.clone());

        store.save_archive(&archive).await.unwrap();
        store
            .save_history(&[CycleRecord::new(true, None, thought)])
            .await
            .unwrap();

        let state = store.load().await.unwrap();
        assert_eq!(state.archive.len(), 1);
        assert_eq!(state.history.len(), 1);
        assert_eq!(store.persisted_cells(), 1);
        assert_eq!(store.persisted_records(), 1);
    }

    #[tokio::test]
    async fn test_write_fault_leaves_state_untouched() {
        let mut injector = FaultInjector::new(DeterministicRng::new(42));
        injector.register(
            FaultConfig::new(FaultType::StorageWriteFail, 1.0).with_filter("save_archive"),
        );
        let store = SimStateStore::with_faults(Arc::new(injector));

        let thought = sample_thought();
        let mut archive = BTreeMap::new();
        archive.insert(thought.niche_key().to_string(), thought);

        let result = store.save_archive(&archive).await;
        assert!(matches!(result, Err(StoreError::FaultInjected { .. })));
        assert_eq!(store.persisted_cells(), 0);
    }

    #[tokio::test]
    async fn test_read_fault_surfaces() {
        let mut injector = FaultInjector::new(DeterministicRng::new(42));
        injector.register(FaultConfig::new(FaultType::StorageReadFail, 1.0).with_filter("load"));
        let store = SimStateStore::with_faults(Arc::new(injector));

        assert!(store.load().await.is_err());
    }

    #[tokio::test]
    async fn test_corruption_fault_recovers_empty() {
        let mut injector = FaultInjector::new(DeterministicRng::new(42));
        injector.register(
            FaultConfig::new(FaultType::StorageCorruption, 1.0)
                .with_filter("load")
                .with_max_injections(1),
        );

        let thought = sample_thought();
        let mut archive = BTreeMap::new();
        archive.insert(thought.niche_key().to_string(), thought);
        let store = SimStateStore::with_faults(Arc::new(injector)).with_state(PersistedState {
            archive,
            history: Vec::new(),
        });

        // First load hits the corruption fault and recovers empty.
        let state = store.load().await.unwrap();
        assert!(state.archive.is_empty());

        // Second load sees the real state again.
        let state = store.load().await.unwrap();
        assert_eq!(state.archive.len(), 1);
    }
}
