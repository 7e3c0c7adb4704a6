//! Elitist Archive - One Best Thought per Niche
//!
//! The archive is the heart of MAP-Elites: a map from `"domain::strategy"`
//! keys to the single fittest thought seen for that niche. A candidate
//! displaces the incumbent only when its fitness is strictly higher, so ties
//! keep the earlier elite.

use std::collections::BTreeMap;

use crate::grid::{BehaviorGrid, NicheKey};
use crate::thought::Thought;

// =============================================================================
// Placement
// =============================================================================

/// Outcome of offering a candidate to the archive.
#[derive(Debug, Clone, PartialEq)]
pub enum Placement {
    /// Candidate entered the archive, displacing `replaced_id` if occupied.
    Accepted { replaced_id: Option<String> },
    /// Incumbent stood; its fitness was at least the candidate's.
    Rejected { incumbent_fitness: f64 },
}

impl Placement {
    /// Whether the candidate entered the archive.
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }

    /// ID of the displaced incumbent, when one existed.
    #[must_use]
    pub fn replaced_id(&self) -> Option<&str> {
        match self {
            Self::Accepted { replaced_id } => replaced_id.as_deref(),
            Self::Rejected { .. } => None,
        }
    }
}

// =============================================================================
// Coverage
// =============================================================================

/// How much of the behavior grid the archive has explored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coverage {
    /// Niches holding an elite.
    pub filled: usize,
    /// Total cells in the grid.
    pub total: usize,
    /// `round(100 * filled / total)`.
    pub percent: u32,
}

// =============================================================================
// Archive
// =============================================================================

/// In-memory elitist archive.
#[derive(Debug, Clone, Default)]
pub struct Archive {
    cells: BTreeMap<String, Thought>,
}

impl Archive {
    /// Create an empty archive.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild an archive from persisted cells.
    #[must_use]
    pub fn from_cells(cells: BTreeMap<String, Thought>) -> Self {
        Self { cells }
    }

    /// Offer a candidate to its niche.
    ///
    /// Strict-greater-wins: an empty cell always accepts; an occupied cell
    /// accepts only when the candidate's fitness exceeds the incumbent's.
    ///
    /// # Panics
    /// Panics if the thought was never classified.
    pub fn challenge(&mut self, thought: Thought) -> Placement {
        // Precondition
        assert!(
            thought.is_classified(),
            "candidate must be classified before archive placement"
        );

        let key = thought.niche_key().to_string();
        match self.cells.get(&key) {
            Some(incumbent) if thought.fitness <= incumbent.fitness => Placement::Rejected {
                incumbent_fitness: incumbent.fitness,
            },
            incumbent => {
                let replaced_id = incumbent.map(|t| t.id.clone());
                self.cells.insert(key, thought);
                Placement::Accepted { replaced_id }
            }
        }
    }

    /// The elite occupying a niche, if any.
    #[must_use]
    pub fn get(&self, key: &NicheKey) -> Option<&Thought> {
        self.cells.get(&key.to_string())
    }

    /// All cells, keyed by `"domain::strategy"`.
    #[must_use]
    pub fn cells(&self) -> &BTreeMap<String, Thought> {
        &self.cells
    }

    /// Number of filled niches.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether no niche is filled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Coverage of the given grid.
    #[must_use]
    pub fn coverage(&self, grid: &BehaviorGrid) -> Coverage {
        let total = grid.total_cells();
        let filled = self.cells.len();
        let percent = if total > 0 {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let percent = ((filled as f64 / total as f64) * 100.0).round() as u32;
            percent
        } else {
            0
        };

        Coverage {
            filled,
            total,
            percent,
        }
    }

    /// The top `n` elites by fitness, descending.
    ///
    /// Ties break on earlier creation, then on ID, so the ranking is stable
    /// across runs.
    #[must_use]
    pub fn top_n(&self, n: usize) -> Vec<&Thought> {
        let mut elites: Vec<&Thought> = self.cells.values().collect();
        elites.sort_by(|a, b| {
            b.fitness
                .total_cmp(&a.fitness)
                .then_with(|| a.created_at.cmp(&b.created_at))
                .then_with(|| a.id.cmp(&b.id))
        });
        elites.truncate(n);
        elites
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thought::{DraftThought, FitnessReport};

    fn thought_in(domain: &str, strategy: &str, fitness: f64) -> Thought {
        Thought::assemble(
            DraftThought::new(format!("insight about {domain}")),
            NicheKey::new(domain, strategy),
            FitnessReport::new(fitness, fitness, fitness, fitness),
            1,
        )
    }

    #[test]
    fn test_empty_cell_accepts() {
        let mut archive = Archive::new();
        let placement = archive.challenge(thought_in("technical", "first_principles", 0.1));

        assert!(placement.is_accepted());
        assert!(placement.replaced_id().is_none());
        assert_eq!(archive.len(), 1);
    }

    #[test]
    fn test_higher_fitness_displaces() {
        let mut archive = Archive::new();
        let weak = thought_in("technical", "first_principles", 0.6);
        let weak_id = weak.id.clone();
        archive.challenge(weak);

        let placement = archive.challenge(thought_in("technical", "first_principles", 0.75));
        assert!(placement.is_accepted());
        assert_eq!(placement.replaced_id(), Some(weak_id.as_str()));

        let key = NicheKey::new("technical", "first_principles");
        assert!((archive.get(&key).unwrap().fitness - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_equal_fitness_keeps_incumbent() {
        let mut archive = Archive::new();
        let incumbent = thought_in("creative", "lateral_thinking", 0.6);
        let incumbent_id = incumbent.id.clone();
        archive.challenge(incumbent);

        let placement = archive.challenge(thought_in("creative", "lateral_thinking", 0.6));
        assert!(matches!(
            placement,
            Placement::Rejected { incumbent_fitness } if (incumbent_fitness - 0.6).abs() < f64::EPSILON
        ));

        let key = NicheKey::new("creative", "lateral_thinking");
        assert_eq!(archive.get(&key).unwrap().id, incumbent_id);
    }

    #[test]
    fn test_lower_fitness_rejected() {
        let mut archive = Archive::new();
        archive.challenge(thought_in("creative", "lateral_thinking", 0.6));

        let placement = archive.challenge(thought_in("creative", "lateral_thinking", 0.4));
        assert!(!placement.is_accepted());
        assert_eq!(archive.len(), 1);
    }

    #[test]
    fn test_distinct_niches_do_not_compete() {
        let mut archive = Archive::new();
        archive.challenge(thought_in("technical", "first_principles", 0.9));
        let placement = archive.challenge(thought_in("technical", "lateral_thinking", 0.1));

        assert!(placement.is_accepted());
        assert_eq!(archive.len(), 2);
    }

    #[test]
    fn test_coverage_rounds() {
        let mut archive = Archive::new();
        let grid = BehaviorGrid::default();
        assert_eq!(archive.coverage(&grid).percent, 0);

        archive.challenge(thought_in("technical", "first_principles", 0.5));
        let coverage = archive.coverage(&grid);
        assert_eq!(coverage.filled, 1);
        assert_eq!(coverage.total, 48);
        // 1/48 = 2.08%, rounds to 2
        assert_eq!(coverage.percent, 2);
    }

    #[test]
    fn test_top_n_orders_by_fitness() {
        let mut archive = Archive::new();
        archive.challenge(thought_in("technical", "first_principles", 0.3));
        archive.challenge(thought_in("creative", "lateral_thinking", 0.9));
        archive.challenge(thought_in("strategic", "abductive_inference", 0.6));

        let top = archive.top_n(2);
        assert_eq!(top.len(), 2);
        assert!((top[0].fitness - 0.9).abs() < f64::EPSILON);
        assert!((top[1].fitness - 0.6).abs() < f64::EPSILON);
    }

    #[test]
    fn test_top_n_ties_break_on_creation_order() {
        let mut archive = Archive::new();
        let first = thought_in("technical", "first_principles", 0.5);
        let first_id = first.id.clone();
        archive.challenge(first);
        archive.challenge(thought_in("creative", "lateral_thinking", 0.5));

        let top = archive.top_n(2);
        assert_eq!(top[0].id, first_id);
    }

    #[test]
    fn test_top_n_larger_than_archive() {
        let mut archive = Archive::new();
        archive.challenge(thought_in("technical", "first_principles", 0.5));

        assert_eq!(archive.top_n(10).len(), 1);
    }

    #[test]
    #[should_panic(expected = "classified")]
    fn test_unclassified_candidate_panics() {
        let mut archive = Archive::new();
        let mut thought = thought_in("technical", "first_principles", 0.5);
        thought.domain = String::new();
        archive.challenge(thought);
    }
}
