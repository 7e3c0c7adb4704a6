//! Sim Strategies - Deterministic Generation and Evaluation
//!
//! `TigerStyle`: Primary implementations for all tests and development.
//! Real model-backed strategies are secondary and live outside this crate.
//!
//! Same seed = same drafts, same scores. Faults are injected through a
//! shared [`FaultInjector`], so a test can make generation time out or the
//! evaluator rate-limit on demand.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{FitnessEvaluator, StrategyError, ThoughtGenerator};
use crate::constants::{SIM_SEED_CONCEPTS_COUNT_MAX, SIM_SEED_CONCEPTS_COUNT_MIN};
use crate::sim::{DeterministicRng, FaultInjector, FaultType};
use crate::thought::{DraftThought, FitnessReport};

/// Concept pool the sim generator samples from when none is supplied.
const SIM_CONCEPTS_DEFAULT: &[&str] = &[
    "compression",
    "feedback loops",
    "habit formation",
    "error budgets",
    "metaphor",
    "negotiation",
    "spaced repetition",
    "emergence",
    "constraint propagation",
    "storytelling",
];

/// Map an injected fault to the strategy error it simulates.
fn fault_to_error(fault: FaultType) -> StrategyError {
    match fault {
        FaultType::LlmTimeout => StrategyError::timeout(),
        FaultType::LlmRateLimit => StrategyError::rate_limit(None),
        FaultType::LlmInvalidResponse => StrategyError::invalid_response("simulated garbled output"),
        _ => StrategyError::service_unavailable(fault.as_str()),
    }
}

// =============================================================================
// SimThoughtGenerator
// =============================================================================

/// Deterministic thought generator.
///
/// Samples 2-3 concepts from its pool and composes a bridging insight.
/// Optionally proposes a niche drawn from supplied axis values, so tests can
/// exercise the classifier's accept path as well as its fallback path.
#[derive(Debug)]
pub struct SimThoughtGenerator {
    rng: Mutex<DeterministicRng>,
    faults: Arc<FaultInjector>,
    concepts: Vec<String>,
    propose_domains: Option<Vec<String>>,
    propose_strategies: Option<Vec<String>>,
}

impl SimThoughtGenerator {
    /// Create a standalone generator with the given seed.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        let mut rng = DeterministicRng::new(seed);
        let fault_rng = rng.fork();
        Self {
            rng: Mutex::new(rng),
            faults: Arc::new(FaultInjector::new(fault_rng)),
            concepts: SIM_CONCEPTS_DEFAULT
                .iter()
                .map(ToString::to_string)
                .collect(),
            propose_domains: None,
            propose_strategies: None,
        }
    }

    /// Create a generator with a shared fault injector.
    #[must_use]
    pub fn with_faults(seed: u64, faults: Arc<FaultInjector>) -> Self {
        Self {
            rng: Mutex::new(DeterministicRng::new(seed)),
            faults,
            concepts: SIM_CONCEPTS_DEFAULT
                .iter()
                .map(ToString::to_string)
                .collect(),
            propose_domains: None,
            propose_strategies: None,
        }
    }

    /// Replace the concept pool.
    ///
    /// # Panics
    /// Panics if the pool is smaller than the sample size.
    #[must_use]
    pub fn with_concepts(mut self, concepts: Vec<String>) -> Self {
        assert!(
            concepts.len() >= SIM_SEED_CONCEPTS_COUNT_MIN,
            "concept pool must hold at least {SIM_SEED_CONCEPTS_COUNT_MIN} entries"
        );
        self.concepts = concepts;
        self
    }

    /// Propose niches drawn from these axis values on every draft.
    #[must_use]
    pub fn with_proposed_axes(mut self, domains: Vec<String>, strategies: Vec<String>) -> Self {
        assert!(!domains.is_empty(), "domains must not be empty");
        assert!(!strategies.is_empty(), "strategies must not be empty");
        self.propose_domains = Some(domains);
        self.propose_strategies = Some(strategies);
        self
    }
}

#[async_trait]
impl ThoughtGenerator for SimThoughtGenerator {
    #[tracing::instrument(skip(self))]
    async fn generate(&self) -> Result<DraftThought, StrategyError> {
        if let Some(fault) = self.faults.should_inject("generate") {
            return Err(fault_to_error(fault));
        }

        let mut rng = self.rng.lock().unwrap();

        let count = rng
            .next_usize(SIM_SEED_CONCEPTS_COUNT_MIN, SIM_SEED_CONCEPTS_COUNT_MAX)
            .min(self.concepts.len());
        let mut pool: Vec<usize> = (0..self.concepts.len()).collect();
        let mut seeds: Vec<String> = Vec::with_capacity(count);
        for _ in 0..count {
            let slot = rng.next_usize(0, pool.len() - 1);
            seeds.push(self.concepts[pool.swap_remove(slot)].clone());
        }

        let content = format!(
            "What if {} were reframed through {}? Treating one as a model of \
             the other suggests a shared mechanism worth testing.",
            seeds[0],
            seeds[1..].join(" and "),
        );

        let mut draft = DraftThought::new(content).with_seed_concepts(seeds);
        if let (Some(domains), Some(strategies)) =
            (&self.propose_domains, &self.propose_strategies)
        {
            draft = draft
                .with_proposed_domain(rng.choose(domains).clone())
                .with_proposed_strategy(rng.choose(strategies).clone());
        }

        Ok(draft)
    }

    fn name(&self) -> &'static str {
        "sim-generator"
    }

    fn is_simulation(&self) -> bool {
        true
    }
}

// =============================================================================
// SimFitnessEvaluator
// =============================================================================

/// Deterministic fitness evaluator.
///
/// Draws the three sub-scores from the seeded RNG and combines them with
/// fixed weights. `with_fixed_composite` pins every score, which is how
/// elitism-scenario tests script exact replacement sequences.
#[derive(Debug)]
pub struct SimFitnessEvaluator {
    rng: Mutex<DeterministicRng>,
    faults: Arc<FaultInjector>,
    fixed_composite: Option<f64>,
}

impl SimFitnessEvaluator {
    /// Create a standalone evaluator with the given seed.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        let mut rng = DeterministicRng::new(seed);
        let fault_rng = rng.fork();
        Self {
            rng: Mutex::new(rng),
            faults: Arc::new(FaultInjector::new(fault_rng)),
            fixed_composite: None,
        }
    }

    /// Create an evaluator with a shared fault injector.
    #[must_use]
    pub fn with_faults(seed: u64, faults: Arc<FaultInjector>) -> Self {
        Self {
            rng: Mutex::new(DeterministicRng::new(seed)),
            faults,
            fixed_composite: None,
        }
    }

    /// Pin all four report values to one composite.
    ///
    /// # Panics
    /// Panics if composite is not in [0, 1].
    #[must_use]
    pub fn with_fixed_composite(mut self, composite: f64) -> Self {
        assert!(
            (0.0..=1.0).contains(&composite),
            "composite must be in [0, 1], got {composite}"
        );
        self.fixed_composite = Some(composite);
        self
    }
}

#[async_trait]
impl FitnessEvaluator for SimFitnessEvaluator {
    #[tracing::instrument(skip(self, draft), fields(content_len = draft.content.len()))]
    async fn evaluate(&self, draft: &DraftThought) -> Result<FitnessReport, StrategyError> {
        if let Some(fault) = self.faults.should_inject("evaluate") {
            return Err(fault_to_error(fault));
        }

        if let Some(fixed) = self.fixed_composite {
            return Ok(FitnessReport::new(fixed, fixed, fixed, fixed));
        }

        let mut rng = self.rng.lock().unwrap();
        let novelty = rng.next_float();
        let depth = rng.next_float();
        let actionability = rng.next_float();
        let composite = 0.4 * novelty + 0.35 * depth + 0.25 * actionability;

        Ok(FitnessReport::new(novelty, depth, actionability, composite))
    }

    fn name(&self) -> &'static str {
        "sim-evaluator"
    }

    fn is_simulation(&self) -> bool {
        true
    }
}

// =============================================================================
// Tests
// =============================================================================
