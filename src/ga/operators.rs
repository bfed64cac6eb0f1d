//! Variation operators for polyploid individuals.
//!
//! All operators act on machine-assignment genes in `1..=num_machines` and
//! only move existing values around, so gene ranges and lengths are
//! preserved by construction.
//!
//! # Crossover
//!
//! - [`uniform_crossover`]: per-position coin flips shared across all slots,
//!   so corresponding positions of an individual's chromosomes travel
//!   together.
//!
//! # Mutation
//!
//! - [`inter_chromosome_mutation`]: swap the gene sequences of two slots
//! - [`reciprocal_exchange_mutation`]: swap up to three random position
//!   pairs per slot
//! - [`shift_mutation`]: rotate a short window one step right per slot
//!
//! [`mutate`] applies the three mutations in that order, each behind its own
//! probability gate.
//!
//! # References
//!
//! - Syswerda (1989), "Uniform Crossover in Genetic Algorithms"
//! - Zhang, Gao & Shi (2011), "An effective genetic algorithm for the
//!   flexible job-shop scheduling problem"

use rand::{Rng, RngExt};
use u_numflow::random::shuffle;

use super::config::MutationRates;
use super::types::{Chromosome, Individual};

// ============================================================================
// Crossover
// ============================================================================

/// Uniform crossover over consecutive parent pairs.
///
/// Parents are paired `(0, 1), (2, 3), ...`; with an odd count the last
/// parent pairs with parent 0. Each pair is crossed with probability
/// `crossover_rate`, otherwise cloned. The result has exactly
/// `parents.len()` offspring, all unevaluated.
///
/// # Panics
/// Panics if paired parents differ in slot count or gene length.
pub fn uniform_crossover<R: Rng>(
    parents: &[Individual],
    crossover_rate: f64,
    rng: &mut R,
) -> Vec<Individual> {
    let n = parents.len();
    let mut offspring = Vec::with_capacity(n + 1);

    for i in (0..n).step_by(2) {
        let p1 = &parents[i];
        let p2 = &parents[(i + 1) % n];

        if rng.random_bool(crossover_rate) {
            let (c1, c2) = cross_pair(p1, p2, rng);
            offspring.push(c1);
            offspring.push(c2);
        } else {
            offspring.push(unevaluated(p1));
            offspring.push(unevaluated(p2));
        }
    }

    offspring.truncate(n);
    offspring
}

/// Crosses one pair with a single coin sequence shared by every slot.
fn cross_pair<R: Rng>(p1: &Individual, p2: &Individual, rng: &mut R) -> (Individual, Individual) {
    assert_eq!(
        p1.num_chromosomes(),
        p2.num_chromosomes(),
        "parents must have equal slot counts"
    );
    let len = p1.gene_len();
    let coins: Vec<bool> = (0..len).map(|_| rng.random_bool(0.5)).collect();

    let mut c1 = Vec::with_capacity(p1.num_chromosomes());
    let mut c2 = Vec::with_capacity(p1.num_chromosomes());
    for (a, b) in p1.chromosomes.iter().zip(&p2.chromosomes) {
        assert_eq!(a.len(), b.len(), "parents must have equal gene length");
        let mut g1 = Vec::with_capacity(len);
        let mut g2 = Vec::with_capacity(len);
        for ((&x, &y), &keep) in a.genes.iter().zip(&b.genes).zip(&coins) {
            if keep {
                g1.push(x);
                g2.push(y);
            } else {
                g1.push(y);
                g2.push(x);
            }
        }
        c1.push(Chromosome::with_genes(a.encoding, g1));
        c2.push(Chromosome::with_genes(b.encoding, g2));
    }

    (Individual { chromosomes: c1 }, Individual { chromosomes: c2 })
}

fn unevaluated(ind: &Individual) -> Individual {
    Individual {
        chromosomes: ind
            .chromosomes
            .iter()
            .map(|c| Chromosome::with_genes(c.encoding, c.genes.clone()))
            .collect(),
    }
}

// ============================================================================
// Mutation
// ============================================================================

/// Swaps the full gene sequences of two distinct random slots.
///
/// Slot encodings stay in place; only the genes move. No-op with fewer than
/// two slots.
pub fn inter_chromosome_mutation<R: Rng>(individual: &mut Individual, rng: &mut R) {
    let slots = individual.num_chromosomes();
    if slots < 2 {
        return;
    }

    let a = rng.random_range(0..slots);
    let mut b = rng.random_range(0..slots - 1);
    if b >= a {
        b += 1;
    }

    let genes_a = std::mem::take(&mut individual.chromosomes[a].genes);
    let genes_b = std::mem::replace(&mut individual.chromosomes[b].genes, genes_a);
    individual.chromosomes[a].genes = genes_b;
    log::trace!("inter-chromosome swap of slots {a} and {b}");
}

/// For every slot, swaps `k` random disjoint position pairs, `k` in `1..=3`.
///
/// `k` is capped at `len / 2` so pairs never overlap.
pub fn reciprocal_exchange_mutation<R: Rng>(individual: &mut Individual, rng: &mut R) {
    for chromosome in &mut individual.chromosomes {
        let len = chromosome.len();
        let k = rng.random_range(1..=3usize).min(len / 2);

        let mut indices: Vec<usize> = (0..len).collect();
        shuffle(&mut indices, rng);
        for pair in indices[..2 * k].chunks_exact(2) {
            chromosome.genes.swap(pair[0], pair[1]);
        }
    }
}

/// For every slot, rotates a window of width `w` in `3..=5` one step right.
///
/// The window's last gene moves to its start. `w` is capped at the gene
/// length; slots shorter than two genes are left alone.
pub fn shift_mutation<R: Rng>(individual: &mut Individual, rng: &mut R) {
    for chromosome in &mut individual.chromosomes {
        let len = chromosome.len();
        if len < 2 {
            continue;
        }
        let w = rng.random_range(3..=5usize).min(len);
        let start = rng.random_range(0..=len - w);
        chromosome.genes[start..start + w].rotate_right(1);
    }
}

/// Applies the three mutations in order, each gated by its own rate.
///
/// Returns whether any mutation fired; a mutated individual's objectives
/// are stale until it is decoded again.
pub fn mutate<R: Rng>(individual: &mut Individual, rates: &MutationRates, rng: &mut R) -> bool {
    let mut mutated = false;
    if rng.random_range(0.0..1.0) < rates.inter_chromosome {
        inter_chromosome_mutation(individual, rng);
        mutated = true;
    }
    if rng.random_range(0.0..1.0) < rates.reciprocal_exchange {
        reciprocal_exchange_mutation(individual, rng);
        mutated = true;
    }
    if rng.random_range(0.0..1.0) < rates.shift {
        shift_mutation(individual, rng);
        mutated = true;
    }
    mutated
}
