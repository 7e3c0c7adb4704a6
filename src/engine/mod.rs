//! Reverie Engine - MAP-Elites Cycle Orchestrator
//!
//! One `run_cycle` call performs a full quality-diversity iteration:
//! generate a candidate thought, score it, classify it into a niche, and
//! offer it to the elitist archive. State is written through to the
//! [`StateStore`] before it becomes visible to queries.
//!
//! The engine owns its state exclusively. Callers share it behind an `Arc`;
//! overlapping `run_cycle` calls are rejected rather than queued.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use thiserror::Error;
use tracing::{info, warn};

use crate::archive::{Archive, Coverage};
use crate::constants::{
    CONTEXT_BLOCK_CHARS_MAX, CONTEXT_SNIPPET_CHARS_MAX, CONTEXT_TOP_THOUGHTS_COUNT,
};
use crate::grid::{BehaviorGrid, NicheKey};
use crate::history::{CycleRecord, HistoryLog};
use crate::store::{StateStore, StoreError};
use crate::strategy::{FitnessEvaluator, StrategyError, ThoughtGenerator};
use crate::thought::Thought;

// =============================================================================
// Error Types
// =============================================================================

/// Errors from engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// `run_cycle` was called while another cycle was still running.
    #[error("a cycle is already in flight")]
    CycleInFlight,

    /// Generation or evaluation failed.
    #[error(transparent)]
    Strategy(#[from] StrategyError),

    /// Persistence failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EngineError {
    /// Whether retrying the cycle could succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::CycleInFlight => true,
            Self::Strategy(e) => e.is_retryable(),
            Self::Store(e) => e.is_retryable(),
        }
    }
}

// =============================================================================
// Engine State
// =============================================================================

/// Mutable state, guarded by a lock that is never held across an await.
#[derive(Debug)]
struct EngineState {
    archive: Archive,
    history: HistoryLog,
    /// Number of the most recently completed cycle.
    generation: u64,
}

/// Releases the single-flight flag on every exit path.
struct FlightGuard<'a>(&'a AtomicBool);

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

// =============================================================================
// ReverieEngine
// =============================================================================

/// MAP-Elites engine over a behavior-descriptor grid.
///
/// Generic over its three capabilities so tests run fully deterministic
/// sim implementations and production wires in model-backed ones.
#[derive(Debug)]
pub struct ReverieEngine<G, E, S> {
    generator: G,
    evaluator: E,
    store: S,
    grid: BehaviorGrid,
    state: RwLock<EngineState>,
    cycle_in_flight: AtomicBool,
}

impl<G, E, S> ReverieEngine<G, E, S>
where
    G: ThoughtGenerator,
    E: FitnessEvaluator,
    S: StateStore,
{
    /// Open an engine with the default 6x8 grid, hydrating from the store.
    pub async fn open(generator: G, evaluator: E, store: S) -> Result<Self, EngineError> {
        Self::open_with_grid(generator, evaluator, store, BehaviorGrid::default()).await
    }

    /// Open an engine over a custom grid, hydrating from the store.
    ///
    /// The generation counter resumes from the last persisted cycle record,
    /// so it keeps climbing across restarts even after history trimming.
    pub async fn open_with_grid(
        generator: G,
        evaluator: E,
        store: S,
        grid: BehaviorGrid,
    ) -> Result<Self, EngineError> {
        let persisted = store.load().await?;
        let mut cells = persisted.archive;
        let loaded = cells.len();
        cells.retain(|_, thought| {
            thought.is_classified() && grid.contains(&thought.niche_key())
        });
        let dropped = loaded - cells.len();
        if dropped > 0 {
            warn!(dropped, "dropping archived thoughts outside the configured grid");
        }
        let archive = Archive::from_cells(cells);
        let history = HistoryLog::from_records(persisted.history);
        let generation = history.last_generation();

        info!(
            store = store.name(),
            cells = archive.len(),
            records = history.len(),
            generation,
            "reverie engine opened"
        );

        Ok(Self {
            generator,
            evaluator,
            store,
            grid,
            state: RwLock::new(EngineState {
                archive,
                history,
                generation,
            }),
            cycle_in_flight: AtomicBool::new(false),
        })
    }

    /// Run one MAP-Elites cycle: generate, evaluate, classify, place.
    ///
    /// At most one cycle runs at a time; an overlapping call fails fast with
    /// [`EngineError::CycleInFlight`]. State is persisted before it is
    /// committed to memory; if the history save fails after the archive was
    /// written, the previous archive is re-saved so a failed cycle leaves
    /// nothing behind on disk.
    #[tracing::instrument(skip(self))]
    pub async fn run_cycle(&self) -> Result<CycleRecord, EngineError> {
        if self
            .cycle_in_flight
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Acquire)
            .is_err()
        {
            return Err(EngineError::CycleInFlight);
        }
        let _guard = FlightGuard(&self.cycle_in_flight);

        let generation = self.state.read().unwrap().generation + 1;
        info!(generation, "starting cycle");

        // Step 1 - generate a candidate
        let draft = self.generator.generate().await?;

        // Step 2 - score it
        let report = self.evaluator.evaluate(&draft).await?;

        // Step 3 - classify into a niche, falling back axis-by-axis
        let niche = self.grid.classify(
            draft.proposed_domain.as_deref(),
            draft.proposed_strategy.as_deref(),
        );

        let thought = Thought::assemble(draft, niche, report, generation);

        // Step 4 - offer to the archive on a working copy
        let (mut archive, mut history) = {
            let state = self.state.read().unwrap();
            (state.archive.clone(), state.history.clone())
        };
        let placement = archive.challenge(thought.clone());
        let stored = placement.is_accepted();
        let replaced_id = placement.replaced_id().map(ToString::to_string);

        let record = CycleRecord::new(stored, replaced_id, thought);
        history.push(record.clone());

        // Persist, then commit. The archive goes first so a cancellation
        // between the two saves loses at most the history entry. If the
        // history save fails instead, roll the persisted archive back to the
        // pre-cycle cells so the failed cycle leaves no trace on disk.
        if stored {
            self.store.save_archive(archive.cells()).await?;
        }
        if let Err(history_err) = self.store.save_history(history.records()).await {
            if stored {
                let previous = {
                    let state = self.state.read().unwrap();
                    state.archive.clone()
                };
                if let Err(rollback_err) = self.store.save_archive(previous.cells()).await {
                    warn!(
                        error = %rollback_err,
                        "archive rollback failed after history save failure"
                    );
                }
            }
            return Err(history_err.into());
        }

        {
            let mut state = self.state.write().unwrap();
            state.archive = archive;
            state.history = history;
            state.generation = generation;
        }

        info!(
            generation,
            domain = %record.thought.domain,
            strategy = %record.thought.strategy,
            fitness = record.thought.fitness,
            stored,
            "cycle complete"
        );

        Ok(record)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// The elite occupying a niche, if any.
    #[must_use]
    pub fn thought_at(&self, key: &NicheKey) -> Option<Thought> {
        self.state.read().unwrap().archive.get(key).cloned()
    }

    /// Snapshot of every filled cell, keyed by `"domain::strategy"`.
    #[must_use]
    pub fn archive_snapshot(&self) -> std::collections::BTreeMap<String, Thought> {
        self.state.read().unwrap().archive.cells().clone()
    }

    /// Grid coverage.
    #[must_use]
    pub fn coverage(&self) -> Coverage {
        self.state.read().unwrap().archive.coverage(&self.grid)
    }

    /// The top `n` elites by fitness, descending.
    ///
    /// [`TOP_THOUGHTS_COUNT_DEFAULT`](crate::constants::TOP_THOUGHTS_COUNT_DEFAULT)
    /// is the conventional `n` for dashboards and prompts.
    #[must_use]
    pub fn top_thoughts(&self, n: usize) -> Vec<Thought> {
        self.state
            .read()
            .unwrap()
            .archive
            .top_n(n)
            .into_iter()
            .cloned()
            .collect()
    }

    /// The `limit` most recent cycle records, oldest-first.
    ///
    /// [`HISTORY_RECENT_LIMIT_DEFAULT`](crate::constants::HISTORY_RECENT_LIMIT_DEFAULT)
    /// is the conventional `limit`.
    #[must_use]
    pub fn recent_history(&self, limit: usize) -> Vec<CycleRecord> {
        self.state.read().unwrap().history.recent(limit).to_vec()
    }

    /// Number of cycles completed, across restarts.
    #[must_use]
    pub fn total_cycles(&self) -> u64 {
        self.state.read().unwrap().generation
    }

    /// The grid this engine explores.
    #[must_use]
    pub fn grid(&self) -> &BehaviorGrid {
        &self.grid
    }

    /// Prompt context block summarising the archive, or `None` when empty.
    ///
    /// Capped at [`CONTEXT_BLOCK_CHARS_MAX`] characters; when truncated the
    /// block ends with a `...` marker line.
    #[must_use]
    pub fn context_block(&self) -> Option<String> {
        let state = self.state.read().unwrap();
        let coverage = state.archive.coverage(&self.grid);
        if coverage.filled == 0 {
            return None;
        }

        let mut sections = vec![
            "## Creative Repertoire (Thought Archive)".to_string(),
            format!(
                "Coverage: {}/{} niches ({}%)",
                coverage.filled, coverage.total, coverage.percent
            ),
            format!("Total cycles: {}", state.generation),
        ];

        let top = state.archive.top_n(CONTEXT_TOP_THOUGHTS_COUNT);
        if !top.is_empty() {
            sections.push("Top insights:".to_string());
            for thought in top {
                let label = format!(
                    "{} \u{d7} {}",
                    thought.domain,
                    thought.strategy.replace('_', " ")
                );
                let snippet = if thought.content.is_empty() {
                    "(pending)".to_string()
                } else {
                    thought
                        .content
                        .chars()
                        .take(CONTEXT_SNIPPET_CHARS_MAX)
                        .collect()
                };
                sections.push(format!(
                    "- [{label}] (fitness {:.2}): {snippet}",
                    thought.fitness
                ));
            }
        }

        let block = sections.join("\n");
        if block.chars().count() > CONTEXT_BLOCK_CHARS_MAX {
            let truncated: String = block.chars().take(CONTEXT_BLOCK_CHARS_MAX).collect();
            Some(format!("{truncated}\n..."))
        } else {
            Some(block)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::sim::{DeterministicRng, FaultConfig, FaultInjector, FaultType};
    use crate::store::SimStateStore;
    use crate::strategy::{SimFitnessEvaluator, SimThoughtGenerator};

    async fn sim_engine(
        seed: u64,
    ) -> ReverieEngine<SimThoughtGenerator, SimFitnessEvaluator, SimStateStore> {
        ReverieEngine::open(
            SimThoughtGenerator::with_seed(seed),
            SimFitnessEvaluator::with_seed(seed),
            SimStateStore::new(),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_first_cycle_fills_a_niche() {
        let engine = sim_engine(42).await;
        let record = engine.run_cycle().await.unwrap();

        assert!(record.stored);
        assert!(record.replaced_id.is_none());
        assert_eq!(record.generation, 1);
        assert_eq!(engine.coverage().filled, 1);
    }

    #[tokio::test]
    async fn test_generations_increment() {
        let engine = sim_engine(42).await;
        for expected in 1..=5 {
            let record = engine.run_cycle().await.unwrap();
            assert_eq!(record.generation, expected);
        }
        assert_eq!(engine.total_cycles(), 5);
    }

    #[tokio::test]
    async fn test_unclassified_draft_lands_in_fallback_niche() {
        // The sim generator proposes no axes by default, so every candidate
        // falls back to the first cell of each axis.
        let engine = sim_engine(42).await;
        let record = engine.run_cycle().await.unwrap();

        assert_eq!(record.thought.domain, "technical");
        assert_eq!(record.thought.strategy, "analytical_decomposition");
    }

    #[tokio::test]
    async fn test_strategy_error_releases_flight_flag() {
        let mut injector = FaultInjector::new(DeterministicRng::new(7));
        injector.register(
            FaultConfig::new(FaultType::LlmTimeout, 1.0)
                .with_filter("generate")
                .with_max_injections(1),
        );
        let engine = ReverieEngine::open(
            SimThoughtGenerator::with_faults(42, Arc::new(injector)),
            SimFitnessEvaluator::with_seed(42),
            SimStateStore::new(),
        )
        .await
        .unwrap();

        let err = engine.run_cycle().await.unwrap_err();
        assert!(matches!(err, EngineError::Strategy(StrategyError::Timeout)));

        // The guard must have released; the next cycle runs.
        let record = engine.run_cycle().await.unwrap();
        assert_eq!(record.generation, 1);
    }

    #[tokio::test]
    async fn test_failed_save_leaves_memory_unchanged() {
        let mut injector = FaultInjector::new(DeterministicRng::new(7));
        injector.register(
            FaultConfig::new(FaultType::StorageWriteFail, 1.0)
                .with_filter("save_archive")
                .with_max_injections(1),
        );
        let engine = ReverieEngine::open(
            SimThoughtGenerator::with_seed(42),
            SimFitnessEvaluator::with_seed(42),
            SimStateStore::with_faults(Arc::new(injector)),
        )
        .await
        .unwrap();

        let err = engine.run_cycle().await.unwrap_err();
        assert!(matches!(err, EngineError::Store(_)));
        assert_eq!(engine.coverage().filled, 0);
        assert_eq!(engine.total_cycles(), 0);

        // After the fault budget is spent, the cycle succeeds.
        let record = engine.run_cycle().await.unwrap();
        assert!(record.stored);
        assert_eq!(record.generation, 1);
    }

    #[tokio::test]
    async fn test_history_save_failure_rolls_back_archive() {
        let mut injector = FaultInjector::new(DeterministicRng::new(7));
        injector.register(
            FaultConfig::new(FaultType::StorageWriteFail, 1.0)
                .with_filter("save_history")
                .with_max_injections(1),
        );
        let store = Arc::new(SimStateStore::with_faults(Arc::new(injector)));
        let engine = ReverieEngine::open(
            SimThoughtGenerator::with_seed(42),
            SimFitnessEvaluator::with_seed(42),
            Arc::clone(&store),
        )
        .await
        .unwrap();

        let err = engine.run_cycle().await.unwrap_err();
        assert!(matches!(err, EngineError::Store(_)));

        // The archive written before the history failure must be rolled back.
        assert_eq!(store.persisted_cells(), 0);
        assert_eq!(store.persisted_records(), 0);

        // A restart over the same store sees no trace of the failed cycle.
        let reopened = ReverieEngine::open(
            SimThoughtGenerator::with_seed(9),
            SimFitnessEvaluator::with_seed(9),
            Arc::clone(&store),
        )
        .await
        .unwrap();
        assert_eq!(reopened.coverage().filled, 0);
        assert_eq!(reopened.total_cycles(), 0);

        // Fault budget spent; the next cycle persists both documents.
        let record = engine.run_cycle().await.unwrap();
        assert!(record.stored);
        assert_eq!(record.generation, 1);
        assert_eq!(store.persisted_cells(), 1);
        assert_eq!(store.persisted_records(), 1);
    }

    #[tokio::test]
    async fn test_open_drops_cells_outside_grid() {
        use crate::store::PersistedState;
        use crate::thought::{DraftThought, FitnessReport};

        let kept = Thought::assemble(
            DraftThought::new("stays in the grid"),
            NicheKey::new("creative", "lateral_thinking"),
            FitnessReport::new(0.5, 0.5, 0.5, 0.5),
            1,
        );
        let stray = Thought::assemble(
            DraftThought::new("from an older, wider grid"),
            NicheKey::new("archaic", "free_association"),
            FitnessReport::new(0.9, 0.9, 0.9, 0.9),
            2,
        );
        let mut state = PersistedState::empty();
        for thought in [kept, stray] {
            state
                .archive
                .insert(thought.niche_key().to_string(), thought);
        }

        let grid = BehaviorGrid::new(
            vec!["creative".to_string()],
            vec!["lateral_thinking".to_string()],
        );
        let engine = ReverieEngine::open_with_grid(
            SimThoughtGenerator::with_seed(42),
            SimFitnessEvaluator::with_seed(42),
            SimStateStore::new().with_state(state),
            grid,
        )
        .await
        .unwrap();

        let coverage = engine.coverage();
        assert_eq!(coverage.filled, 1);
        assert_eq!(coverage.total, 1);
        assert_eq!(coverage.percent, 100);
        assert!(engine
            .thought_at(&NicheKey::new("archaic", "free_association"))
            .is_none());
    }

    #[tokio::test]
    async fn test_context_block_none_when_empty() {
        let engine = sim_engine(42).await;
        assert!(engine.context_block().is_none());
    }

    #[tokio::test]
    async fn test_context_block_shape() {
        let engine = sim_engine(42).await;
        engine.run_cycle().await.unwrap();

        let block = engine.context_block().unwrap();
        assert!(block.starts_with("## Creative Repertoire"));
        assert!(block.contains("Coverage: 1/48 niches (2%)"));
        assert!(block.contains("Total cycles: 1"));
        assert!(block.contains("Top insights:"));
        assert!(block.contains("technical \u{d7} analytical decomposition"));
        assert!(block.chars().count() <= CONTEXT_BLOCK_CHARS_MAX + 4);
    }

    #[tokio::test]
    async fn test_restart_resumes_generation_and_archive() {
        let store = SimStateStore::new();
        let engine = ReverieEngine::open(
            SimThoughtGenerator::with_seed(42),
            SimFitnessEvaluator::with_seed(42),
            store,
        )
        .await
        .unwrap();
        for _ in 0..3 {
            engine.run_cycle().await.unwrap();
        }
        let snapshot = engine.archive_snapshot();

        // Reopen over the same persisted state.
        let persisted = crate::store::PersistedState {
            archive: snapshot.clone(),
            history: engine.recent_history(usize::MAX),
        };
        let engine2 = ReverieEngine::open(
            SimThoughtGenerator::with_seed(99),
            SimFitnessEvaluator::with_seed(99),
            SimStateStore::new().with_state(persisted),
        )
        .await
        .unwrap();

        assert_eq!(engine2.total_cycles(), 3);
        assert_eq!(engine2.archive_snapshot().len(), snapshot.len());
        let record = engine2.run_cycle().await.unwrap();
        assert_eq!(record.generation, 4);
    }
}
