//! State Store - Persistence Capability for Archive and History
//!
//! The engine never touches the filesystem directly. It talks to a
//! [`StateStore`], loaded once at startup and written through on every
//! mutation. Two implementations ship with the crate:
//!
//! - [`JsonFileStore`] - archive and history as pretty-printed JSON files
//! - [`SimStateStore`] - in-memory, deterministic, fault-injectable

mod file;
mod sim;

pub use file::JsonFileStore;
pub use sim::SimStateStore;

use std::collections::BTreeMap;

use async_trait::async_trait;
use thiserror::Error;

use crate::history::CycleRecord;
use crate::thought::Thought;

// =============================================================================
// Error Types
// =============================================================================

/// Errors from persistence operations.
///
/// Write failures are surfaced to the caller rather than swallowed; a cycle
/// whose state cannot be saved is a failed cycle.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem operation failed.
    #[error("storage i/o failure during {operation} on '{path}': {message}")]
    Io {
        operation: String,
        path: String,
        message: String,
    },

    /// State could not be serialized for writing.
    #[error("storage serialization failure: {message}")]
    Serialization { message: String },

    /// A simulated fault fired.
    #[error("storage fault injected during {operation}")]
    FaultInjected { operation: String },
}

impl StoreError {
    pub fn io(operation: impl Into<String>, path: impl Into<String>, source: &std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            path: path.into(),
            message: source.to_string(),
        }
    }

    pub fn serialization(source: &serde_json::Error) -> Self {
        Self::Serialization {
            message: source.to_string(),
        }
    }

    pub fn fault_injected(operation: impl Into<String>) -> Self {
        Self::FaultInjected {
            operation: operation.into(),
        }
    }

    /// Whether retrying the same operation could succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::FaultInjected { .. })
    }
}

// =============================================================================
// PersistedState
// =============================================================================

/// Everything a store holds: the niche-keyed archive plus the cycle log.
///
/// Archive keys are `"domain::strategy"` strings, matching the on-disk JSON
/// object keys.
#[derive(Debug, Clone, Default)]
pub struct PersistedState {
    pub archive: BTreeMap<String, Thought>,
    pub history: Vec<CycleRecord>,
}

impl PersistedState {
    /// Empty state, used when nothing has been persisted yet.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }
}

// =============================================================================
// StateStore Trait
// =============================================================================

/// Persistence capability.
///
/// `load` tolerates absent state by returning
/// [`PersistedState::empty`]; the save methods never swallow failures.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the persisted state, or empty state when none exists.
    async fn load(&self) -> Result<PersistedState, StoreError>;

    /// Persist the full archive.
    async fn save_archive(&self, archive: &BTreeMap<String, Thought>) -> Result<(), StoreError>;

    /// Persist the full history log.
    async fn save_history(&self, history: &[CycleRecord]) -> Result<(), StoreError>;

    /// Implementation name for logs.
    fn name(&self) -> &'static str;

    /// Whether this is a simulation store.
    fn is_simulation(&self) -> bool;
}

// Delegation through Arc lets callers keep a handle on a store they hand to
// the engine, e.g. to inspect persisted state in tests.
#[async_trait]
impl<S: StateStore + ?Sized> StateStore for std::sync::Arc<S> {
    async fn load(&self) -> Result<PersistedState, StoreError> {
        (**self).load().await
    }

    async fn save_archive(&self, archive: &BTreeMap<String, Thought>) -> Result<(), StoreError> {
        (**self).save_archive(archive).await
    }

    async fn save_history(&self, history: &[CycleRecord]) -> Result<(), StoreError> {
        (**self).save_history(history).await
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn is_simulation(&self) -> bool {
        (**self).is_simulation()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::io(
            "write",
            "/tmp/archive.json",
            &std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let text = err.to_string();
        assert!(text.contains("write"));
        assert!(text.contains("/tmp/archive.json"));
    }

    #[test]
    fn test_error_retryability() {
        let io = StoreError::io("read", "x", &std::io::Error::other("boom"));
        assert!(io.is_retryable());
        assert!(StoreError::fault_injected("write").is_retryable());
        assert!(!StoreError::Serialization {
            message: "bad".to_string()
        }
        .is_retryable());
    }

    #[test]
    fn test_empty_state() {
        let state = PersistedState::empty();
        assert!(state.archive.is_empty());
        assert!(state.history.is_empty());
    }
}
