//! Two-objective hypervolume indicator.
//!
//! The hypervolume of a slot is the area dominated by the slot's rank-1
//! chromosomes and bounded by a fixed reference point. The reference point
//! is frozen at initialization so values are comparable across generations.
//!
//! # References
//!
//! - Zitzler & Thiele (1998), "Multiobjective Optimization Using
//!   Evolutionary Algorithms — A Comparative Case Study"

use super::types::Individual;

/// Area dominated by `points` and bounded by `(ref_f1, ref_f2)`.
///
/// Points are swept from the reference edge inward (descending f1); each
/// point strictly inside the reference box adds the strip
/// `(prev_f1 - f1) * (ref_f2 - f2)`. The sweep assumes the points are
/// mutually non-dominated, as a Pareto front is, so f2 rises as f1 falls.
///
/// # Example
///
/// ```
/// use u_evosched::ga::hypervolume::hypervolume_2d;
///
/// let front = [(1.0, 3.0), (2.0, 1.0)];
/// // (4 - 2) * (4 - 1) + (2 - 1) * (4 - 3)
/// assert_eq!(hypervolume_2d(&front, 4.0, 4.0), 7.0);
/// ```
pub fn hypervolume_2d(points: &[(f64, f64)], ref_f1: f64, ref_f2: f64) -> f64 {
    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    let mut volume = 0.0;
    let mut prev_f1 = ref_f1;
    for (f1, f2) in sorted {
        if f1 < ref_f1 && f2 < ref_f2 {
            volume += (prev_f1 - f1) * (ref_f2 - f2);
            prev_f1 = f1;
        }
    }
    volume
}

/// Hypervolume of slot `slot` over the rank-1 chromosomes of `population`.
pub fn slot_hypervolume(population: &[Individual], slot: usize, ref_f1: f64, ref_f2: f64) -> f64 {
    let front: Vec<(f64, f64)> = population
        .iter()
        .filter_map(|ind| ind.chromosomes.get(slot))
        .filter(|c| c.rank == Some(1))
        .map(|c| (c.makespan, c.energy))
        .collect();
    hypervolume_2d(&front, ref_f1, ref_f2)
}

/// Min, max and mean of one slot's hypervolume over the recorded history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HypervolumeSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// Append-only per-generation, per-slot hypervolume record.
///
/// Entry `g` holds one value per slot; entry 0 comes from initialization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HypervolumeHistory {
    snapshots: Vec<Vec<f64>>,
}

impl HypervolumeHistory {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one snapshot.
    pub fn push(&mut self, snapshot: Vec<f64>) {
        self.snapshots.push(snapshot);
    }

    /// Number of snapshots.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Whether no snapshot has been recorded.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// All snapshots, oldest first.
    pub fn snapshots(&self) -> &[Vec<f64>] {
        &self.snapshots
    }

    /// Most recent snapshot.
    pub fn latest(&self) -> Option<&[f64]> {
        self.snapshots.last().map(Vec::as_slice)
    }

    /// One slot's values, oldest first.
    pub fn series(&self, slot: usize) -> Vec<f64> {
        self.snapshots.iter().filter_map(|s| s.get(slot).copied()).collect()
    }

    /// The last `n` values of one slot, oldest first.
    pub fn recent(&self, slot: usize, n: usize) -> Vec<f64> {
        let series = self.series(slot);
        let skip = series.len().saturating_sub(n);
        series[skip..].to_vec()
    }

    /// Summary of one slot, or `None` if the slot has no values.
    pub fn summary(&self, slot: usize) -> Option<HypervolumeSummary> {
        let series = self.series(slot);
        if series.is_empty() {
            return None;
        }
        let min = series.iter().copied().fold(f64::INFINITY, f64::min);
        let max = series.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = series.iter().sum::<f64>() / series.len() as f64;
        Some(HypervolumeSummary { min, max, mean })
    }
}
