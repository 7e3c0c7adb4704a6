//! Strategy Traits - Injected Generation and Evaluation Capabilities
//!
//! `TigerStyle`: Unified interface for simulation and production.
//!
//! The cycle orchestrator never talks to a model provider directly; it is
//! generic over two capabilities:
//!
//! ```text
//! ThoughtGenerator (trait)          FitnessEvaluator (trait)
//! └── SimThoughtGenerator           └── SimFitnessEvaluator
//!     (always available)                (always available)
//! ```
//!
//! Production implementations (an LLM cross-pollinating a knowledge base, an
//! LLM-as-judge scorer) live with their providers, outside this crate. Both
//! capabilities are total from the orchestrator's point of view: any failure
//! propagates as a [`StrategyError`] and fails the whole cycle.

mod sim;

pub use sim::{SimFitnessEvaluator, SimThoughtGenerator};

use async_trait::async_trait;

use crate::thought::{DraftThought, FitnessReport};

// =============================================================================
// Error Types
// =============================================================================

/// Unified error type for generation and evaluation strategies.
///
/// `TigerStyle`: Explicit variants for all failure modes.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StrategyError {
    /// Request timed out
    #[error("request timed out")]
    Timeout,

    /// Rate limit exceeded
    #[error("rate limit exceeded, retry after {retry_after_secs:?}s")]
    RateLimit {
        /// Seconds until the limit resets (if known)
        retry_after_secs: Option<u64>,
    },

    /// Unusable response from the strategy
    #[error("invalid response: {message}")]
    InvalidResponse {
        /// Description of what was invalid
        message: String,
    },

    /// Service unavailable
    #[error("service unavailable: {message}")]
    ServiceUnavailable {
        /// Reason for unavailability
        message: String,
    },
}

impl StrategyError {
    /// Create a timeout error.
    #[must_use]
    pub fn timeout() -> Self {
        Self::Timeout
    }

    /// Create a rate limit error.
    #[must_use]
    pub fn rate_limit(retry_after_secs: Option<u64>) -> Self {
        Self::RateLimit { retry_after_secs }
    }

    /// Create an invalid response error.
    #[must_use]
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    /// Create a service unavailable error.
    #[must_use]
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            message: message.into(),
        }
    }

    /// Check if this error is worth retrying on a later cycle.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout | Self::RateLimit { .. } | Self::ServiceUnavailable { .. }
        )
    }
}

// =============================================================================
// Capability Traits
// =============================================================================

/// Produces one candidate thought per call.
///
/// Typically backed by an LLM cross-pollinating sampled knowledge-base
/// concepts; the draft carries content and seed concepts, and may carry a
/// proposed niche for the classifier to validate.
#[async_trait]
pub trait ThoughtGenerator: Send + Sync {
    /// Generate a candidate draft.
    ///
    /// # Errors
    /// Returns `StrategyError` on failure; the caller fails the cycle.
    async fn generate(&self) -> Result<DraftThought, StrategyError>;

    /// Strategy name for logging/debugging.
    fn name(&self) -> &'static str;

    /// Whether this is a simulation strategy.
    fn is_simulation(&self) -> bool;
}

/// Scores a draft on novelty, depth, and actionability.
///
/// The combination rule producing the composite belongs to the evaluator;
/// the archive only compares composites.
#[async_trait]
pub trait FitnessEvaluator: Send + Sync {
    /// Evaluate a draft; every value of the report must land in [0, 1].
    ///
    /// # Errors
    /// Returns `StrategyError` on failure; the caller fails the cycle.
    async fn evaluate(&self, draft: &DraftThought) -> Result<FitnessReport, StrategyError>;

    /// Strategy name for logging/debugging.
    fn name(&self) -> &'static str;

    /// Whether this is a simulation strategy.
    fn is_simulation(&self) -> bool;
}

// =============================================================================
// Tests
// =============================================================================
