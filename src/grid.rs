//! Behavior-Descriptor Grid
//!
//! `TigerStyle`: Pure data, validated at construction, no mutation.
//!
//! The grid defines the two discrete axes of the MAP-Elites search space:
//! a *domain* axis and a *cognitive-strategy* axis. Every archived thought
//! occupies exactly one cell (niche), identified by a [`NicheKey`].
//!
//! Classification is total: unknown or missing axis values fall back to the
//! first value of the axis, so a bad upstream classification can never block
//! the archive.

use crate::constants::{GRID_AXIS_VALUES_COUNT_MAX, GRID_AXIS_VALUE_BYTES_MAX};

/// The reference domain axis (6 values).
pub const DOMAINS_DEFAULT: &[&str] = &[
    "technical",
    "creative",
    "philosophical",
    "interpersonal",
    "strategic",
    "self_improvement",
];

/// The reference cognitive-strategy axis (8 values).
pub const STRATEGIES_DEFAULT: &[&str] = &[
    "analytical_decomposition",
    "analogical_reasoning",
    "first_principles",
    "lateral_thinking",
    "divergent_exploration",
    "dialectical_reasoning",
    "counterfactual_thinking",
    "abductive_inference",
];

// =============================================================================
// NicheKey
// =============================================================================

/// One cell of the behavior grid: a (domain, strategy) pair.
///
/// Rendered as `"domain::strategy"`, which is also the archive's on-disk
/// object key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NicheKey {
    /// Domain axis value
    pub domain: String,
    /// Cognitive-strategy axis value
    pub strategy: String,
}

impl NicheKey {
    /// Create a new niche key.
    ///
    /// # Panics
    /// Panics if either axis value is empty.
    #[must_use]
    pub fn new(domain: impl Into<String>, strategy: impl Into<String>) -> Self {
        let domain = domain.into();
        let strategy = strategy.into();

        // Preconditions
        assert!(!domain.is_empty(), "domain must not be empty");
        assert!(!strategy.is_empty(), "strategy must not be empty");

        Self { domain, strategy }
    }
}

impl std::fmt::Display for NicheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}::{}", self.domain, self.strategy)
    }
}

// =============================================================================
// BehaviorGrid
// =============================================================================

/// The two enumerated descriptor axes.
///
/// `TigerStyle`: Axis sizes are configuration, not hard assumptions. The
/// reference configuration is 6 domains x 8 strategies = 48 cells.
#[derive(Debug, Clone)]
pub struct BehaviorGrid {
    domains: Vec<String>,
    strategies: Vec<String>,
}

impl BehaviorGrid {
    /// Create a grid from explicit axis value sets.
    ///
    /// # Panics
    /// Panics if either axis is empty, exceeds `GRID_AXIS_VALUES_COUNT_MAX`,
    /// or contains an overlong value.
    #[must_use]
    pub fn new(domains: Vec<String>, strategies: Vec<String>) -> Self {
        // Preconditions
        assert!(!domains.is_empty(), "domain axis must not be empty");
        assert!(!strategies.is_empty(), "strategy axis must not be empty");
        assert!(
            domains.len() <= GRID_AXIS_VALUES_COUNT_MAX,
            "domain axis exceeds {GRID_AXIS_VALUES_COUNT_MAX} values"
        );
        assert!(
            strategies.len() <= GRID_AXIS_VALUES_COUNT_MAX,
            "strategy axis exceeds {GRID_AXIS_VALUES_COUNT_MAX} values"
        );
        for value in domains.iter().chain(strategies.iter()) {
            assert!(!value.is_empty(), "axis value must not be empty");
            assert!(
                value.len() <= GRID_AXIS_VALUE_BYTES_MAX,
                "axis value exceeds {GRID_AXIS_VALUE_BYTES_MAX} bytes: {value}"
            );
        }

        Self {
            domains,
            strategies,
        }
    }

    /// The domain axis values, in definition order.
    #[must_use]
    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    /// The cognitive-strategy axis values, in definition order.
    #[must_use]
    pub fn strategies(&self) -> &[String] {
        &self.strategies
    }

    /// Total number of cells: |domains| x |strategies|.
    #[must_use]
    pub fn total_cells(&self) -> usize {
        self.domains.len() * self.strategies.len()
    }

    /// Check whether a key names a valid cell of this grid.
    #[must_use]
    pub fn contains(&self, key: &NicheKey) -> bool {
        self.domains.iter().any(|d| *d == key.domain)
            && self.strategies.iter().any(|s| *s == key.strategy)
    }

    /// Classify a candidate's proposed axis values into a valid cell.
    ///
    /// Total by construction: an unknown, empty, or absent value falls back
    /// to the first value of its axis, independently per axis. The upstream
    /// classification step may be heuristic or model-driven and can mis-name
    /// an axis value; the archive must never block on that.
    #[must_use]
    pub fn classify(&self, domain: Option<&str>, strategy: Option<&str>) -> NicheKey {
        let domain = domain
            .filter(|d| self.domains.iter().any(|v| v == d))
            .unwrap_or(&self.domains[0]);
        let strategy = strategy
            .filter(|s| self.strategies.iter().any(|v| v == s))
            .unwrap_or(&self.strategies[0]);

        let key = NicheKey::new(domain, strategy);

        // Postcondition
        debug_assert!(self.contains(&key), "classify must return a valid cell");
        key
    }
}

impl Default for BehaviorGrid {
    /// The reference 6x8 grid.
    fn default() -> Self {
        Self::new(
            DOMAINS_DEFAULT.iter().map(ToString::to_string).collect(),
            STRATEGIES_DEFAULT.iter().map(ToString::to_string).collect(),
        )
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_grid_dimensions() {
        let grid = BehaviorGrid::default();
        assert_eq!(grid.domains().len(), 6);
        assert_eq!(grid.strategies().len(), 8);
        assert_eq!(grid.total_cells(), 48);
    }

    #[test]
    fn test_custom_axes() {
        let grid = BehaviorGrid::new(
            vec!["a".to_string(), "b".to_string()],
            vec!["x".to_string(), "y".to_string(), "z".to_string()],
        );
        assert_eq!(grid.total_cells(), 6);
    }

    #[test]
    fn test_classify_known_values() {
        let grid = BehaviorGrid::default();
        let key = grid.classify(Some("creative"), Some("lateral_thinking"));
        assert_eq!(key.domain, "creative");
        assert_eq!(key.strategy, "lateral_thinking");
    }

    #[test]
    fn test_classify_unknown_falls_back_to_first() {
        let grid = BehaviorGrid::default();
        let key = grid.classify(Some("cooking"), Some("vibes"));
        assert_eq!(key.domain, "technical");
        assert_eq!(key.strategy, "analytical_decomposition");
    }

    #[test]
    fn test_classify_absent_falls_back_to_first() {
        let grid = BehaviorGrid::default();
        let key = grid.classify(None, None);
        assert_eq!(key.domain, "technical");
        assert_eq!(key.strategy, "analytical_decomposition");
    }

    #[test]
    fn test_classify_empty_string_falls_back() {
        let grid = BehaviorGrid::default();
        let key = grid.classify(Some(""), Some(""));
        assert_eq!(key.domain, "technical");
        assert_eq!(key.strategy, "analytical_decomposition");
    }

    #[test]
    fn test_classify_axes_independent() {
        let grid = BehaviorGrid::default();
        let key = grid.classify(Some("strategic"), Some("nonsense"));
        assert_eq!(key.domain, "strategic");
        assert_eq!(key.strategy, "analytical_decomposition");
    }

    #[test]
    fn test_classify_always_valid() {
        let grid = BehaviorGrid::default();
        for domain in [None, Some(""), Some("unknown"), Some("technical")] {
            for strategy in [None, Some(""), Some("unknown"), Some("first_principles")] {
                let key = grid.classify(domain, strategy);
                assert!(grid.contains(&key));
            }
        }
    }

    #[test]
    fn test_niche_key_display() {
        let key = NicheKey::new("technical", "first_principles");
        assert_eq!(key.to_string(), "technical::first_principles");
    }

    #[test]
    #[should_panic(expected = "domain axis must not be empty")]
    fn test_empty_domain_axis_panics() {
        let _ = BehaviorGrid::new(vec![], vec!["x".to_string()]);
    }

    #[test]
    #[should_panic(expected = "domain must not be empty")]
    fn test_empty_key_domain_panics() {
        let _ = NicheKey::new("", "x");
    }
}
