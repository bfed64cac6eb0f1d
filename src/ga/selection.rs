//! Per-slot binary tournament selection.
//!
//! Two competitors are drawn uniformly with replacement. For every slot
//! independently, the winner is the competitor with the lower rank, or on a
//! rank tie the higher crowding distance (Deb's crowded-comparison
//! operator). The result is a synthetic individual whose slot `c` carries
//! the genes of slot `c`'s winner; its objectives and ranking are left unset
//! until the next decode and ranking pass.
//!
//! # References
//!
//! - Goldberg & Deb (1991), "A Comparative Analysis of Selection Schemes
//!   Used in Genetic Algorithms"
//! - Deb et al. (2002), "A Fast and Elitist Multiobjective GA: NSGA-II"

use std::cmp::Ordering;

use rand::{Rng, RngExt};

use super::types::{Chromosome, Individual};

/// Crowded comparison: `Less` means `a` is preferred over `b`.
///
/// Lower rank wins; on equal rank, larger crowding distance wins.
/// Objective values are never consulted. Unranked chromosomes lose to ranked
/// ones.
pub fn crowded_cmp(a: &Chromosome, b: &Chromosome) -> Ordering {
    let rank = |c: &Chromosome| c.rank.unwrap_or(usize::MAX);
    let crowd = |c: &Chromosome| c.crowding_distance.unwrap_or(f64::NEG_INFINITY);

    rank(a).cmp(&rank(b)).then_with(|| {
        crowd(b)
            .partial_cmp(&crowd(a))
            .unwrap_or(Ordering::Equal)
    })
}

/// Runs one binary tournament over `population`.
///
/// On a complete tie the second competitor wins.
///
/// # Panics
/// Panics if `population` is empty.
pub fn tournament<R: Rng>(population: &[Individual], rng: &mut R) -> Individual {
    assert!(
        !population.is_empty(),
        "cannot select from empty population"
    );

    let n = population.len();
    let a = &population[rng.random_range(0..n)];
    let b = &population[rng.random_range(0..n)];

    let chromosomes = a
        .chromosomes
        .iter()
        .zip(&b.chromosomes)
        .map(|(ca, cb)| {
            let winner = if crowded_cmp(ca, cb) == Ordering::Less {
                ca
            } else {
                cb
            };
            Chromosome::with_genes(ca.encoding, winner.genes.clone())
        })
        .collect();

    Individual { chromosomes }
}

/// Runs `count` independent tournaments.
pub fn select<R: Rng>(population: &[Individual], count: usize, rng: &mut R) -> Vec<Individual> {
    (0..count).map(|_| tournament(population, rng)).collect()
}
