//! Cycle History - Append-Only Log of MAP-Elites Iterations
//!
//! Every cycle leaves one record, whether or not the candidate entered the
//! archive. The log is capped at [`HISTORY_ENTRIES_COUNT_MAX`] entries; older
//! records are dropped from the front.

use serde::{Deserialize, Serialize};

use crate::constants::HISTORY_ENTRIES_COUNT_MAX;
use crate::thought::Thought;

// =============================================================================
// CycleRecord
// =============================================================================

/// Outcome of a single MAP-Elites cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleRecord {
    /// Cycle number that produced this record. Starts at 1.
    pub generation: u64,
    /// ISO date (YYYY-MM-DD) of the cycle.
    pub date: String,
    /// Whether the candidate entered the archive.
    pub stored: bool,
    /// ID of the incumbent it displaced, when one existed.
    pub replaced_id: Option<String>,
    /// The candidate thought, classified and scored.
    pub thought: Thought,
}

impl CycleRecord {
    /// Create a record for a completed cycle.
    ///
    /// # Panics
    /// Panics if `replaced_id` is set while `stored` is false.
    #[must_use]
    pub fn new(stored: bool, replaced_id: Option<String>, thought: Thought) -> Self {
        // Precondition: a rejected candidate displaces nothing
        assert!(
            stored || replaced_id.is_none(),
            "rejected candidate cannot have displaced an incumbent"
        );

        Self {
            generation: thought.generation,
            date: thought.created_date.clone(),
            stored,
            replaced_id,
            thought,
        }
    }
}

// =============================================================================
// HistoryLog
// =============================================================================

/// Bounded in-memory log of cycle records.
///
/// Records are held oldest-first. The generation counter survives trimming
/// because it is read from the last record, not from the log length.
#[derive(Debug, Clone, Default)]
pub struct HistoryLog {
    records: Vec<CycleRecord>,
}

impl HistoryLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a log from previously persisted records.
    ///
    /// Trims to the cap in case the persisted data predates it.
    #[must_use]
    pub fn from_records(mut records: Vec<CycleRecord>) -> Self {
        if records.len() > HISTORY_ENTRIES_COUNT_MAX {
            records.drain(..records.len() - HISTORY_ENTRIES_COUNT_MAX);
        }
        Self { records }
    }

    /// Append a record, dropping the oldest entry past the cap.
    pub fn push(&mut self, record: CycleRecord) {
        self.records.push(record);
        if self.records.len() > HISTORY_ENTRIES_COUNT_MAX {
            self.records.drain(..self.records.len() - HISTORY_ENTRIES_COUNT_MAX);
        }

        // Postcondition
        debug_assert!(self.records.len() <= HISTORY_ENTRIES_COUNT_MAX);
    }

    /// The `limit` most recent records, oldest-first.
    #[must_use]
    pub fn recent(&self, limit: usize) -> &[CycleRecord] {
        let start = self.records.len().saturating_sub(limit);
        &self.records[start..]
    }

    /// Generation of the most recent record, or 0 for an empty log.
    #[must_use]
    pub fn last_generation(&self) -> u64 {
        self.records.last().map_or(0, |record| record.generation)
    }

    /// All records, oldest-first.
    #[must_use]
    pub fn records(&self) -> &[CycleRecord] {
        &self.records
    }

    /// Number of records currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the log holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================
