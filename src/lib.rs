//! # Reverie
//!
//! A MAP-Elites quality-diversity engine for creative thought, with
//! deterministic simulation testing.
//!
//! Instead of optimising for a single "best" idea, the engine keeps an
//! archive of the best thought *per niche* of a behaviour-descriptor grid
//! (domain x cognitive strategy), building a diverse repertoire of
//! high-quality insights over time.
//!
//! ## Features
//!
//! - **Elitist Archive**: One best thought per niche, strict-greater-wins
//! - **Pluggable Strategies**: Generation and evaluation behind async traits
//! - **Write-Through Persistence**: JSON files on disk, surfaced failures
//! - **Graceful Degradation**: Damaged state files recover to empty state
//! - **Deterministic Testing**: Seeded RNG plus fault injection for
//!   reproducible failure scenarios
//!
//! ## Quick Start
//!
//! ```rust
//! use reverie::engine::ReverieEngine;
//! use reverie::store::SimStateStore;
//! use reverie::strategy::{SimFitnessEvaluator, SimThoughtGenerator};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Deterministic sim capabilities, seed 42
//! let engine = ReverieEngine::open(
//!     SimThoughtGenerator::with_seed(42),
//!     SimFitnessEvaluator::with_seed(42),
//!     SimStateStore::new(),
//! )
//! .await?;
//!
//! let record = engine.run_cycle().await?;
//! println!(
//!     "cycle {}: [{}::{}] stored={}",
//!     record.generation, record.thought.domain, record.thought.strategy, record.stored
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                  ReverieEngine                      │
//! │        generate → evaluate → classify → place       │
//! ├──────────────┬───────────────────┬──────────────────┤
//! │ ThoughtGen.  │ FitnessEvaluator  │ StateStore       │
//! │ (LLM or sim) │ (LLM or sim)      │ (JSON or sim)    │
//! ├──────────────┴───────────────────┴──────────────────┤
//! │  Archive (48 niches)  │  HistoryLog (200 records)   │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! Every capability has a deterministic simulation implementation; same seed,
//! same thoughts, same scores, same faults.

pub mod archive;
pub mod constants;
pub mod engine;
pub mod grid;
pub mod history;
pub mod sim;
pub mod store;
pub mod strategy;
pub mod telemetry;
pub mod thought;

pub use archive::{Archive, Coverage, Placement};
pub use engine::{EngineError, ReverieEngine};
pub use grid::{BehaviorGrid, NicheKey};
pub use history::{CycleRecord, HistoryLog};
pub use store::{JsonFileStore, PersistedState, SimStateStore, StateStore, StoreError};
pub use strategy::{
    FitnessEvaluator, SimFitnessEvaluator, SimThoughtGenerator, StrategyError, ThoughtGenerator,
};
pub use thought::{DraftThought, FitnessReport, Thought};
