//! `TigerStyle` Constants
//!
//! All limits use big-endian naming: `CATEGORY_SPECIFICS_UNIT_LIMIT`
//! Example: `HISTORY_ENTRIES_COUNT_MAX` (not `MAX_HISTORY_ENTRIES`)
//!
//! Every constant includes units in the name:
//! - _`BYTES_MAX` for size limits
//! - _`CHARS_MAX` for character budgets
//! - _`COUNT_MAX/DEFAULT` for quantity limits

// =============================================================================
// Fitness Limits
// =============================================================================

/// Minimum fitness score (composite and every sub-score)
pub const FITNESS_MIN: f64 = 0.0;

/// Maximum fitness score (composite and every sub-score)
pub const FITNESS_MAX: f64 = 1.0;

// =============================================================================
// Thought Limits
// =============================================================================

/// Maximum size of a thought's content
pub const THOUGHT_CONTENT_BYTES_MAX: usize = 64 * 1024; // 64KB

/// Maximum number of seed concepts per thought
pub const THOUGHT_SEED_CONCEPTS_COUNT_MAX: usize = 16;

// =============================================================================
// Behavior Grid Limits
// =============================================================================

/// Maximum number of values on one descriptor axis
pub const GRID_AXIS_VALUES_COUNT_MAX: usize = 64;

/// Maximum length of one axis value
pub const GRID_AXIS_VALUE_BYTES_MAX: usize = 64;

// =============================================================================
// History Log Limits
// =============================================================================

/// Maximum retained history entries (oldest trimmed first)
pub const HISTORY_ENTRIES_COUNT_MAX: usize = 200;

/// Default number of entries returned by recent-history queries
pub const HISTORY_RECENT_LIMIT_DEFAULT: usize = 10;

// =============================================================================
// Query Surface Limits
// =============================================================================

/// Default number of thoughts returned by top-N ranking
pub const TOP_THOUGHTS_COUNT_DEFAULT: usize = 5;

/// Number of top thoughts rendered into the context block
pub const CONTEXT_TOP_THOUGHTS_COUNT: usize = 3;

/// Character budget for one thought snippet in the context block
pub const CONTEXT_SNIPPET_CHARS_MAX: usize = 120;

/// Character budget for the whole context block
pub const CONTEXT_BLOCK_CHARS_MAX: usize = 600;

// =============================================================================
// Simulation Limits
// =============================================================================

/// Maximum probability for fault injection (1.0 = 100%)
pub const SIM_FAULT_PROBABILITY_MAX: f64 = 1.0;

/// Minimum seed concepts sampled by the sim generator
pub const SIM_SEED_CONCEPTS_COUNT_MIN: usize = 2;

/// Maximum seed concepts sampled by the sim generator
pub const SIM_SEED_CONCEPTS_COUNT_MAX: usize = 3;

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fitness_bounds_valid() {
        assert!(FITNESS_MIN < FITNESS_MAX);
        assert!((FITNESS_MIN - 0.0).abs() < f64::EPSILON);
        assert!((FITNESS_MAX - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_context_budgets_consistent() {
        // A snippet must always fit inside the block budget.
        assert!(CONTEXT_SNIPPET_CHARS_MAX < CONTEXT_BLOCK_CHARS_MAX);
        assert!(CONTEXT_TOP_THOUGHTS_COUNT <= TOP_THOUGHTS_COUNT_DEFAULT);
    }

    #[test]
    fn test_history_limits_valid() {
        assert!(HISTORY_RECENT_LIMIT_DEFAULT <= HISTORY_ENTRIES_COUNT_MAX);
        assert!(HISTORY_ENTRIES_COUNT_MAX > 0);
    }

    #[test]
    fn test_sim_seed_concepts_range_valid() {
        assert!(SIM_SEED_CONCEPTS_COUNT_MIN <= SIM_SEED_CONCEPTS_COUNT_MAX);
        assert!(SIM_SEED_CONCEPTS_COUNT_MAX <= THOUGHT_SEED_CONCEPTS_COUNT_MAX);
    }
}
