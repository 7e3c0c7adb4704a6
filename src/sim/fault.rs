//! `FaultInjector` - Probabilistic Fault Injection
//!
//! `TigerStyle`: Explicit fault registration, deterministic through the RNG,
//! interior mutability so an injector can be shared via `Arc` between the
//! sim strategies and the sim store.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::constants::SIM_FAULT_PROBABILITY_MAX;
use crate::sim::DeterministicRng;

/// Faults this crate can experience.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultType {
    /// Persisting the archive or history document fails
    StorageWriteFail,
    /// Loading a persisted document fails
    StorageReadFail,
    /// A persisted document is garbled
    StorageCorruption,
    /// Strategy (LLM) request timeout
    LlmTimeout,
    /// Strategy rate limit exceeded
    LlmRateLimit,
    /// Strategy returned an unusable response
    LlmInvalidResponse,
    /// Strategy service unavailable
    LlmServiceUnavailable,
}

impl FaultType {
    /// The fault type name as a string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StorageWriteFail => "storage_write_fail",
            Self::StorageReadFail => "storage_read_fail",
            Self::StorageCorruption => "storage_corruption",
            Self::LlmTimeout => "llm_timeout",
            Self::LlmRateLimit => "llm_rate_limit",
            Self::LlmInvalidResponse => "llm_invalid_response",
            Self::LlmServiceUnavailable => "llm_service_unavailable",
        }
    }
}

/// Configuration for one registered fault.
#[derive(Debug, Clone)]
pub struct FaultConfig {
    /// The type of fault
    pub fault_type: FaultType,
    /// Probability of injection (0.0 to 1.0)
    pub probability: f64,
    /// Optional operation filter (substring match)
    pub operation_filter: Option<String>,
    /// Maximum number of injections (None = unlimited)
    pub max_injections: Option<u64>,
}

impl FaultConfig {
    /// Create a new fault configuration.
    ///
    /// # Panics
    /// Panics if probability is not in [0, 1].
    #[must_use]
    pub fn new(fault_type: FaultType, probability: f64) -> Self {
        assert!(
            (0.0..=SIM_FAULT_PROBABILITY_MAX).contains(&probability),
            "probability must be in [0, {SIM_FAULT_PROBABILITY_MAX}], got {probability}"
        );

        Self {
            fault_type,
            probability,
            operation_filter: None,
            max_injections: None,
        }
    }

    /// Restrict the fault to operations containing this substring.
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.operation_filter = Some(filter.into());
        self
    }

    /// Cap the number of injections.
    ///
    /// # Panics
    /// Panics if max is 0.
    #[must_use]
    pub fn with_max_injections(mut self, max: u64) -> Self {
        assert!(max > 0, "max_injections must be positive");
        self.max_injections = Some(max);
        self
    }
}

/// Fault injector for simulation testing.
///
/// Registration happens before sharing via `Arc`; `should_inject` only needs
/// `&self` (RNG and counters behind a `Mutex`).
#[derive(Debug)]
pub struct FaultInjector {
    rng: Mutex<DeterministicRng>,
    configs: Vec<FaultConfig>,
    injection_counts: Mutex<HashMap<FaultType, u64>>,
}

impl FaultInjector {
    /// Create a new fault injector with the given RNG.
    #[must_use]
    pub fn new(rng: DeterministicRng) -> Self {
        Self {
            rng: Mutex::new(rng),
            configs: Vec::new(),
            injection_counts: Mutex::new(HashMap::new()),
        }
    }

    /// Create an injector that never fires.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(DeterministicRng::new(0))
    }

    /// Register a fault configuration.
    pub fn register(&mut self, config: FaultConfig) {
        self.injection_counts
            .lock()
            .unwrap()
            .entry(config.fault_type)
            .or_insert(0);
        self.configs.push(config);
    }

    /// Decide whether a fault fires for the given operation.
    ///
    /// Returns the fault type if one should be injected, None otherwise.
    pub fn should_inject(&self, operation: &str) -> Option<FaultType> {
        for config in &self.configs {
            if let Some(ref filter) = config.operation_filter {
                if !operation.contains(filter.as_str()) {
                    continue;
                }
            }

            if let Some(max) = config.max_injections {
                let counts = self.injection_counts.lock().unwrap();
                if counts.get(&config.fault_type).copied().unwrap_or(0) >= max {
                    continue;
                }
            }

            let fires = {
                let mut rng = self.rng.lock().unwrap();
                rng.next_bool(config.probability)
            };

            if fires {
                let mut counts = self.injection_counts.lock().unwrap();
                *counts.entry(config.fault_type).or_insert(0) += 1;
                return Some(config.fault_type);
            }
        }

        None
    }

    /// Total number of injections across all fault types.
    #[must_use]
    pub fn total_injections(&self) -> u64 {
        self.injection_counts.lock().unwrap().values().sum()
    }
}
