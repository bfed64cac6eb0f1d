//! Pareto ranking: non-dominated sorting and crowding distance.
//!
//! Both objectives (makespan, energy) are **minimized**. Ranking happens
//! per encoding slot: the chromosomes at slot `c` of every individual in a
//! cohort form one ranking problem, independent of all other slots.
//!
//! # Algorithms
//!
//! - [`non_dominated_sort`]: Fast non-dominated sorting (Deb et al., 2002)
//! - [`crowding_distance`]: Crowding distance assignment for diversity preservation
//! - [`rank_slot`] / [`rank_cohort`]: write rank and crowding distance into chromosomes
//!
//! # References
//!
//! - Deb et al. (2002), "A Fast and Elitist Multiobjective Genetic Algorithm: NSGA-II"
//! - IEEE Transactions on Evolutionary Computation, 6(2), 182-197

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::types::Individual;

/// Result of non-dominated sorting.
///
/// Each element of `ranks` corresponds to the Pareto rank of the solution
/// at the same index. Rank 1 is the Pareto front (non-dominated solutions).
#[derive(Debug, Clone, PartialEq)]
pub struct NondominatedSortResult {
    /// Pareto rank for each solution (1 = front).
    pub ranks: Vec<usize>,

    /// Indices grouped by front: `fronts[0]` contains rank-1 indices, etc.
    pub fronts: Vec<Vec<usize>>,
}

/// Whether `a` Pareto-dominates `b` (minimization).
///
/// `a` dominates `b` when it is no worse in every objective and strictly
/// better in at least one.
///
/// ```
/// use u_evosched::ga::multi_objective::dominates;
///
/// assert!(dominates(&[1.0, 2.0], &[1.0, 3.0]));
/// assert!(!dominates(&[1.0, 3.0], &[2.0, 2.0]));
/// assert!(!dominates(&[2.0, 2.0], &[2.0, 2.0]));
/// ```
pub fn dominates(a: &[f64], b: &[f64]) -> bool {
    dominance_cmp(a, b) == Dominance::Left
}

/// Fast non-dominated sorting.
///
/// Assigns a Pareto rank to each solution. The fronts are exactly those
/// obtained by repeatedly peeling off the non-dominated subset of the
/// remaining solutions; dominance counting finds them without rescanning.
///
/// # Complexity
///
/// O(m * n²) where m = number of objectives, n = number of solutions
///
/// # Example
///
/// ```
/// use u_evosched::ga::multi_objective::non_dominated_sort;
///
/// let objectives = vec![
///     [1.0, 5.0],  // A
///     [3.0, 3.0],  // B
///     [5.0, 1.0],  // C
///     [4.0, 4.0],  // D: dominated by B
/// ];
///
/// let result = non_dominated_sort(&objectives);
/// assert_eq!(result.ranks, vec![1, 1, 1, 2]);
/// ```
pub fn non_dominated_sort<O: AsRef<[f64]>>(objectives: &[O]) -> NondominatedSortResult {
    let n = objectives.len();
    if n == 0 {
        return NondominatedSortResult {
            ranks: Vec::new(),
            fronts: Vec::new(),
        };
    }

    let mut domination_count = vec![0usize; n];
    let mut dominated_by: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut ranks = vec![0usize; n];
    let mut front_1 = Vec::new();

    for i in 0..n {
        for j in (i + 1)..n {
            match dominance_cmp(objectives[i].as_ref(), objectives[j].as_ref()) {
                Dominance::Left => {
                    dominated_by[i].push(j);
                    domination_count[j] += 1;
                }
                Dominance::Right => {
                    dominated_by[j].push(i);
                    domination_count[i] += 1;
                }
                Dominance::Neither => {}
            }
        }

        // Every j < i has already been compared with i.
        if domination_count[i] == 0 {
            ranks[i] = 1;
            front_1.push(i);
        }
    }

    let mut fronts = Vec::new();
    let mut current = front_1;
    while !current.is_empty() {
        let mut next_front = Vec::new();

        for &i in &current {
            for &j in &dominated_by[i] {
                domination_count[j] -= 1;
                if domination_count[j] == 0 {
                    ranks[j] = fronts.len() + 2;
                    next_front.push(j);
                }
            }
        }

        fronts.push(current);
        current = next_front;
    }

    NondominatedSortResult { ranks, fronts }
}

#[derive(Debug, PartialEq)]
enum Dominance {
    Left,
    Right,
    Neither,
}

fn dominance_cmp(a: &[f64], b: &[f64]) -> Dominance {
    let mut a_better_in_some = false;
    let mut b_better_in_some = false;

    for (&va, &vb) in a.iter().zip(b.iter()) {
        if va < vb {
            a_better_in_some = true;
        } else if vb < va {
            b_better_in_some = true;
        }
    }

    match (a_better_in_some, b_better_in_some) {
        (true, false) => Dominance::Left,
        (false, true) => Dominance::Right,
        _ => Dominance::Neither,
    }
}

/// Crowding distance of each member of one front.
///
/// For each objective in turn: sort by it, set both ends to infinity, and
/// add `(next - prev) / (max - min)` to every interior member, skipping the
/// objective when its range is zero. Distances accumulate across
/// objectives, so an end in any objective stays infinite.
///
/// # Example
///
/// ```
/// use u_evosched::ga::multi_objective::crowding_distance;
///
/// let front = vec![[1.0, 5.0], [3.0, 3.0], [5.0, 1.0]];
/// let d = crowding_distance(&front);
///
/// assert!(d[0].is_infinite() && d[2].is_infinite());
/// assert!((d[1] - 2.0).abs() < 1e-12);
/// ```
pub fn crowding_distance<O: AsRef<[f64]>>(objectives: &[O]) -> Vec<f64> {
    let n = objectives.len();
    if n <= 2 {
        return vec![f64::INFINITY; n];
    }

    let m = objectives[0].as_ref().len();
    let mut distances = vec![0.0f64; n];
    let value = |i: usize, k: usize| objectives[i].as_ref()[k];

    for obj_idx in 0..m {
        let mut indices: Vec<usize> = (0..n).collect();
        indices.sort_by(|&a, &b| {
            value(a, obj_idx)
                .partial_cmp(&value(b, obj_idx))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        distances[indices[0]] = f64::INFINITY;
        distances[indices[n - 1]] = f64::INFINITY;

        let range = value(indices[n - 1], obj_idx) - value(indices[0], obj_idx);
        if range > 0.0 {
            for i in 1..(n - 1) {
                let prev = value(indices[i - 1], obj_idx);
                let next = value(indices[i + 1], obj_idx);
                distances[indices[i]] += (next - prev) / range;
            }
        }
    }

    distances
}

/// Rank and crowding distance for every member of a slot's cohort.
fn slot_ranking(objectives: &[[f64; 2]]) -> (Vec<usize>, Vec<f64>) {
    let sorted = non_dominated_sort(objectives);
    let mut distances = vec![0.0; objectives.len()];
    for front in &sorted.fronts {
        let front_objs: Vec<[f64; 2]> = front.iter().map(|&i| objectives[i]).collect();
        for (&i, d) in front.iter().zip(crowding_distance(&front_objs)) {
            distances[i] = d;
        }
    }
    (sorted.ranks, distances)
}

fn slot_objectives(cohort: &[Individual], slot: usize) -> Vec<[f64; 2]> {
    cohort
        .iter()
        .map(|ind| {
            let c = &ind.chromosomes[slot];
            [c.makespan, c.energy]
        })
        .collect()
}

fn write_slot(cohort: &mut [Individual], slot: usize, ranks: &[usize], distances: &[f64]) {
    for ((ind, &rank), &dist) in cohort.iter_mut().zip(ranks).zip(distances) {
        let c = &mut ind.chromosomes[slot];
        c.rank = Some(rank);
        c.crowding_distance = Some(dist);
    }
}

/// Ranks slot `slot` of every individual in `cohort`.
///
/// Only the chromosomes at that slot are compared with each other; their
/// previous rank and crowding distance are overwritten.
pub fn rank_slot(cohort: &mut [Individual], slot: usize) {
    if cohort.is_empty() {
        return;
    }
    let objectives = slot_objectives(cohort, slot);
    let (ranks, distances) = slot_ranking(&objectives);
    write_slot(cohort, slot, &ranks, &distances);
}

/// Ranks every slot of `cohort`.
///
/// Slots are independent; with the `parallel` feature and `parallel` set,
/// the per-slot sorts run on the rayon pool. Results are identical either
/// way.
pub fn rank_cohort(cohort: &mut [Individual], parallel: bool) {
    let Some(first) = cohort.first() else {
        return;
    };
    let slots = first.num_chromosomes();
    let results = slot_rankings(cohort, slots, parallel);
    for (slot, (ranks, distances)) in results.iter().enumerate() {
        write_slot(cohort, slot, ranks, distances);
    }
}

#[cfg(feature = "parallel")]
fn slot_rankings(cohort: &[Individual], slots: usize, parallel: bool) -> Vec<(Vec<usize>, Vec<f64>)> {
    if parallel {
        (0..slots)
            .into_par_iter()
            .map(|slot| slot_ranking(&slot_objectives(cohort, slot)))
            .collect()
    } else {
        (0..slots)
            .map(|slot| slot_ranking(&slot_objectives(cohort, slot)))
            .collect()
    }
}

#[cfg(not(feature = "parallel"))]
fn slot_rankings(cohort: &[Individual], slots: usize, _parallel: bool) -> Vec<(Vec<usize>, Vec<f64>)> {
    (0..slots)
        .map(|slot| slot_ranking(&slot_objectives(cohort, slot)))
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
