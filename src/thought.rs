//! Thought - The Unit of Archived Content
//!
//! `TigerStyle`: Explicit fields, validated construction, serde matches the
//! on-disk JSON (camelCase, `"domain::strategy"` archive keys elsewhere).
//!
//! A [`DraftThought`] is what the generation strategy produces: content and
//! seed concepts, optionally a proposed niche, no fitness yet. The cycle
//! orchestrator turns it into a [`Thought`] once evaluated and classified.
//! A `Thought` is replaced wholesale in the archive, never mutated in place.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{
    FITNESS_MAX, FITNESS_MIN, THOUGHT_CONTENT_BYTES_MAX, THOUGHT_SEED_CONCEPTS_COUNT_MAX,
};
use crate::grid::NicheKey;

// =============================================================================
// Fitness Report
// =============================================================================

/// The three sub-scores and their composite, each in [0, 1].
///
/// The combination rule belongs to the evaluation strategy, not this crate;
/// the composite is recorded as received (after clamping).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitnessReport {
    /// How different the thought is from the existing archive
    pub novelty: f64,
    /// How substantive and well-reasoned the insight is
    pub depth: f64,
    /// How readily the thought could drive a concrete change
    pub actionability: f64,
    /// The evaluator's combined score
    pub composite: f64,
}

impl FitnessReport {
    /// A zeroed report, as carried by an unevaluated draft.
    #[must_use]
    pub fn zero() -> Self {
        Self {
            novelty: 0.0,
            depth: 0.0,
            actionability: 0.0,
            composite: 0.0,
        }
    }

    /// Create a report with all four values, clamped into [0, 1].
    #[must_use]
    pub fn new(novelty: f64, depth: f64, actionability: f64, composite: f64) -> Self {
        Self {
            novelty,
            depth,
            actionability,
            composite,
        }
        .clamped()
    }

    /// Clamp every value into [0, 1]. NaN becomes 0.
    #[must_use]
    pub fn clamped(self) -> Self {
        fn clamp(value: f64) -> f64 {
            if value.is_nan() {
                FITNESS_MIN
            } else {
                value.clamp(FITNESS_MIN, FITNESS_MAX)
            }
        }

        let result = Self {
            novelty: clamp(self.novelty),
            depth: clamp(self.depth),
            actionability: clamp(self.actionability),
            composite: clamp(self.composite),
        };

        // Postcondition
        debug_assert!(
            (FITNESS_MIN..=FITNESS_MAX).contains(&result.composite),
            "composite must be in [0, 1]"
        );
        result
    }
}

// =============================================================================
// Draft Thought
// =============================================================================

/// Output of the thought-generation strategy: not yet evaluated or classified.
#[derive(Debug, Clone)]
pub struct DraftThought {
    /// Free-text payload; may be empty for a placeholder draft
    pub content: String,
    /// Names of the knowledge inputs the generator drew on; may be empty
    pub seed_concepts: Vec<String>,
    /// Domain the generator proposes, if any (validated by the classifier)
    pub proposed_domain: Option<String>,
    /// Strategy the generator proposes, if any (validated by the classifier)
    pub proposed_strategy: Option<String>,
}

impl DraftThought {
    /// Create a draft with just content.
    ///
    /// # Panics
    /// Panics if content exceeds `THOUGHT_CONTENT_BYTES_MAX`.
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        let content = content.into();

        // Precondition
        assert!(
            content.len() <= THOUGHT_CONTENT_BYTES_MAX,
            "content {} bytes exceeds max {THOUGHT_CONTENT_BYTES_MAX}",
            content.len()
        );

        Self {
            content,
            seed_concepts: Vec::new(),
            proposed_domain: None,
            proposed_strategy: None,
        }
    }

    /// Attach the seed concepts the generator drew on.
    ///
    /// # Panics
    /// Panics if the count exceeds `THOUGHT_SEED_CONCEPTS_COUNT_MAX`.
    #[must_use]
    pub fn with_seed_concepts(mut self, seed_concepts: Vec<String>) -> Self {
        assert!(
            seed_concepts.len() <= THOUGHT_SEED_CONCEPTS_COUNT_MAX,
            "seed concepts {} exceed max {THOUGHT_SEED_CONCEPTS_COUNT_MAX}",
            seed_concepts.len()
        );
        self.seed_concepts = seed_concepts;
        self
    }

    /// Propose a domain axis value.
    #[must_use]
    pub fn with_proposed_domain(mut self, domain: impl Into<String>) -> Self {
        self.proposed_domain = Some(domain.into());
        self
    }

    /// Propose a strategy axis value.
    #[must_use]
    pub fn with_proposed_strategy(mut self, strategy: impl Into<String>) -> Self {
        self.proposed_strategy = Some(strategy.into());
        self
    }
}

// =============================================================================
// Thought
// =============================================================================

/// A fully evaluated, classified thought as stored in the archive.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thought {
    /// Opaque unique identifier (prefix `th`), never reused
    pub id: String,
    /// Calendar date of creation (YYYY-MM-DD, UTC)
    pub created_date: String,
    /// Creation instant; strictly increasing across thoughts in one process run
    pub created_at: DateTime<Utc>,
    /// The synthesized insight
    pub content: String,
    /// Domain axis cell (always a valid axis member once classified)
    pub domain: String,
    /// Strategy axis cell (always a valid axis member once classified)
    pub strategy: String,
    /// Composite fitness in [0, 1]; 0 for an unevaluated draft
    pub fitness: f64,
    /// The sub-scores behind `fitness`
    pub fitness_breakdown: FitnessReport,
    /// Knowledge-base concepts that seeded this thought
    pub seed_concepts: Vec<String>,
    /// The cycle index that produced this thought
    pub generation: u64,
}

impl Thought {
    /// Assemble a thought from an evaluated, classified draft.
    ///
    /// # Panics
    /// Panics if generation is 0 (cycles are 1-indexed).
    #[must_use]
    pub fn assemble(
        draft: DraftThought,
        niche: NicheKey,
        report: FitnessReport,
        generation: u64,
    ) -> Self {
        // Preconditions
        assert!(generation > 0, "generation must be >= 1");
        let report = report.clamped();

        let created_at = monotonic_now();
        Self {
            id: format!("th-{}", uuid::Uuid::new_v4()),
            created_date: created_at.format("%Y-%m-%d").to_string(),
            created_at,
            content: draft.content,
            domain: niche.domain,
            strategy: niche.strategy,
            fitness: report.composite,
            fitness_breakdown: report,
            seed_concepts: draft.seed_concepts,
            generation,
        }
    }

    /// The niche key this thought occupies.
    ///
    /// # Panics
    /// Panics if the thought was never classified.
    #[must_use]
    pub fn niche_key(&self) -> NicheKey {
        NicheKey::new(self.domain.clone(), self.strategy.clone())
    }

    /// Whether both axis values are set.
    #[must_use]
    pub fn is_classified(&self) -> bool {
        !self.domain.is_empty() && !self.strategy.is_empty()
    }
}

// =============================================================================
// Monotonic Clock
// =============================================================================

/// Latest creation instant handed out, in microseconds since the epoch.
static LAST_INSTANT_MICROS: AtomicI64 = AtomicI64::new(0);

/// Current instant, strictly later than the previous call in this process.
///
/// Wall clocks can step backwards; thought creation instants must not, and
/// tie-breaking in the archive relies on them being distinct.
fn monotonic_now() -> DateTime<Utc> {
    let now = Utc::now().timestamp_micros();
    let mut prev = LAST_INSTANT_MICROS.load(Ordering::SeqCst);
    loop {
        let next = now.max(prev + 1);
        match LAST_INSTANT_MICROS.compare_exchange_weak(
            prev,
            next,
            Ordering::SeqCst,
            Ordering::SeqCst,
        ) {
            Ok(_) => {
                return Utc
                    .timestamp_micros(next)
                    .single()
                    .unwrap_or_else(Utc::now)
            }
            Err(actual) => prev = actual,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
