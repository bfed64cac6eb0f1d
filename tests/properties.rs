//! Property-based tests for u-evosched.
//!
//! Uses proptest to check the ranking, hypervolume, operator and decoding
//! invariants over random inputs.

use proptest::prelude::*;
use rand::RngExt;
use u_evosched::ga::hypervolume::hypervolume_2d;
use u_evosched::ga::multi_objective::{crowding_distance, dominates, non_dominated_sort};
use u_evosched::ga::operators::{mutate, reciprocal_exchange_mutation, shift_mutation};
use u_evosched::ga::{decode, Chromosome, EvolutionEngine, Individual, MutationRates, NsgaConfig};
use u_evosched::scenario::{Encoding, Job, Scenario};
use u_numflow::random::create_rng;

fn points() -> impl Strategy<Value = Vec<[f64; 2]>> {
    prop::collection::vec((0u8..10, 0u8..10), 0..30)
        .prop_map(|v| v.into_iter().map(|(a, b)| [a as f64, b as f64]).collect())
}

/// Ranks by repeatedly removing the non-dominated subset.
fn peel_ranks(objs: &[[f64; 2]]) -> Vec<usize> {
    let mut ranks = vec![0; objs.len()];
    let mut remaining: Vec<usize> = (0..objs.len()).collect();
    let mut rank = 1;
    while !remaining.is_empty() {
        let front: Vec<usize> = remaining
            .iter()
            .copied()
            .filter(|&i| !remaining.iter().any(|&j| dominates(&objs[j], &objs[i])))
            .collect();
        for &i in &front {
            ranks[i] = rank;
        }
        remaining.retain(|i| !front.contains(i));
        rank += 1;
    }
    ranks
}

fn front_of(objs: &[[f64; 2]]) -> Vec<(f64, f64)> {
    let sorted = non_dominated_sort(objs);
    sorted
        .fronts
        .first()
        .map(|f| f.iter().map(|&i| (objs[i][0], objs[i][1])).collect())
        .unwrap_or_default()
}

fn sorted(genes: &[usize]) -> Vec<usize> {
    let mut v = genes.to_vec();
    v.sort_unstable();
    v
}

/// Random scenario with `ops_per_job[j]` operations for job `j`.
fn random_scenario(machines: usize, ops_per_job: &[usize], seed: u64) -> Scenario {
    let mut rng = create_rng(seed);
    let total: usize = ops_per_job.iter().sum();
    let table = |rng: &mut rand::rngs::SmallRng| -> Vec<Vec<f64>> {
        (0..total)
            .map(|_| (0..machines).map(|_| rng.random_range(1..10) as f64).collect())
            .collect()
    };
    let processing = table(&mut rng);
    let energy = table(&mut rng);

    let mut next = 0;
    let jobs = ops_per_job
        .iter()
        .enumerate()
        .map(|(id, &n)| {
            let ops = (next..next + n).collect();
            next += n;
            Job::new(id, ops)
        })
        .collect();

    Scenario::new(processing, energy, jobs)
        .unwrap()
        .with_encodings(&Encoding::ALL)
}

proptest! {
    // ==================== Ranking ====================

    #[test]
    fn sort_matches_peel(objs in points()) {
        let result = non_dominated_sort(&objs);
        prop_assert_eq!(result.ranks, peel_ranks(&objs));
    }

    #[test]
    fn first_front_nonempty_and_mutually_nondominated(objs in points()) {
        let result = non_dominated_sort(&objs);
        if objs.is_empty() {
            prop_assert!(result.fronts.is_empty());
        } else {
            prop_assert!(!result.fronts[0].is_empty());
        }
        for front in &result.fronts {
            for &a in front {
                for &b in front {
                    prop_assert!(!dominates(&objs[a], &objs[b]));
                }
            }
        }
    }

    #[test]
    fn crowding_boundaries_infinite(objs in points()) {
        let d = crowding_distance(&objs);
        prop_assert_eq!(d.len(), objs.len());
        prop_assert!(d.iter().all(|&x| x >= 0.0));
        if !objs.is_empty() {
            let inf = d.iter().filter(|x| x.is_infinite()).count();
            prop_assert!(inf >= objs.len().min(2));
        }
        // A unique minimum of f1 is always a boundary.
        if let Some(min) = objs.iter().map(|o| o[0]).reduce(f64::min) {
            let at_min: Vec<usize> = (0..objs.len()).filter(|&i| objs[i][0] == min).collect();
            if at_min.len() == 1 {
                prop_assert!(d[at_min[0]].is_infinite());
            }
        }
    }

    // ==================== Hypervolume ====================

    #[test]
    fn hypervolume_non_negative(objs in points()) {
        let all: Vec<(f64, f64)> = objs.iter().map(|o| (o[0], o[1])).collect();
        prop_assert!(hypervolume_2d(&all, 11.0, 11.0) >= 0.0);
        prop_assert!(hypervolume_2d(&front_of(&objs), 11.0, 11.0) >= 0.0);
    }

    #[test]
    fn hypervolume_grows_with_strictly_better_point(objs in points(), pick in any::<prop::sample::Index>()) {
        let front = front_of(&objs);
        prop_assume!(!front.is_empty());
        let before = hypervolume_2d(&front, 11.0, 11.0);

        let (f1, f2) = front[pick.index(front.len())];
        let mut extended: Vec<[f64; 2]> = front.iter().map(|&(a, b)| [a, b]).collect();
        extended.push([f1 - 0.5, f2 - 0.5]);
        let after = hypervolume_2d(&front_of(&extended), 11.0, 11.0);

        prop_assert!(after >= before, "{} < {}", after, before);
    }

    // ==================== Operators ====================

    #[test]
    fn slot_mutations_permute_genes(
        genes in prop::collection::vec(1usize..6, 1..40),
        seed in any::<u64>()
    ) {
        let mut rng = create_rng(seed);
        let mut ind = Individual {
            chromosomes: vec![
                Chromosome::with_genes(Encoding::Fifo, genes.clone()),
                Chromosome::with_genes(Encoding::Stp, genes.clone()),
            ],
        };
        reciprocal_exchange_mutation(&mut ind, &mut rng);
        shift_mutation(&mut ind, &mut rng);
        for c in &ind.chromosomes {
            prop_assert_eq!(c.len(), genes.len());
            prop_assert_eq!(sorted(&c.genes), sorted(&genes));
        }
    }

    #[test]
    fn mutate_keeps_lengths_and_values(
        a in prop::collection::vec(1usize..6, 8),
        b in prop::collection::vec(1usize..6, 8),
        rates in (0.0..=1.0f64, 0.0..=1.0f64, 0.0..=1.0f64),
        seed in any::<u64>()
    ) {
        let mut rng = create_rng(seed);
        let mut ind = Individual {
            chromosomes: vec![
                Chromosome::with_genes(Encoding::Ltp, a.clone()),
                Chromosome::with_genes(Encoding::RrFifo, b.clone()),
            ],
        };
        mutate(&mut ind, &MutationRates::new(rates.0, rates.1, rates.2), &mut rng);

        prop_assert!(ind.chromosomes.iter().all(|c| c.len() == 8));
        let mut pooled = [a, b].concat();
        pooled.sort_unstable();
        let mut after = [ind.chromosomes[0].genes.clone(), ind.chromosomes[1].genes.clone()].concat();
        after.sort_unstable();
        prop_assert_eq!(after, pooled);
    }

    // ==================== Decoding ====================

    #[test]
    fn decode_respects_precedence_and_machines(
        machines in 1usize..4,
        ops_per_job in prop::collection::vec(1usize..4, 1..4),
        seed in any::<u64>()
    ) {
        let scenario = random_scenario(machines, &ops_per_job, seed);
        let mut rng = create_rng(seed ^ 0x9e37_79b9);

        for encoding in Encoding::ALL {
            let order = scenario.dispatch_order(encoding).unwrap();
            let genes: Vec<usize> = (0..order.len()).map(|_| rng.random_range(1..=machines)).collect();

            let d = decode(&scenario, order, &genes);
            prop_assert_eq!(&d, &decode(&scenario, order, &genes));
            prop_assert_eq!(d.schedule.len(), scenario.total_operations());

            for job in scenario.jobs() {
                let ops: Vec<_> = d.schedule.iter().filter(|o| o.job == job.id).collect();
                for w in ops.windows(2) {
                    prop_assert!(w[0].end <= w[1].start);
                }
            }
            for m in 0..machines {
                let mut on: Vec<_> = d.schedule.iter().filter(|o| o.machine == m).collect();
                on.sort_by(|a, b| a.start.partial_cmp(&b.start).unwrap());
                for w in on.windows(2) {
                    prop_assert!(w[0].end <= w[1].start);
                }
            }
            let latest = d.schedule.iter().map(|o| o.end).fold(0.0, f64::max);
            prop_assert_eq!(d.makespan, latest);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    // ==================== Engine ====================

    #[test]
    fn engine_preserves_population_shape(
        machines in 1usize..4,
        ops_per_job in prop::collection::vec(1usize..4, 1..4),
        population in 1usize..12,
        generations in 0usize..4,
        seed in any::<u64>()
    ) {
        let scenario = random_scenario(machines, &ops_per_job, seed);
        let encodings = [Encoding::Stp, Encoding::RrLtp];
        let config = NsgaConfig::default()
            .with_population_size(population)
            .with_mutation_rates(MutationRates::new(0.5, 0.5, 0.5))
            .with_seed(seed);
        let mut engine = EvolutionEngine::new(&scenario, &encodings, config).unwrap();
        engine.initialize();
        engine.run(generations).unwrap();

        prop_assert_eq!(engine.hypervolumes().len(), generations + 1);
        prop_assert_eq!(engine.population().len(), population);
        for ind in engine.population() {
            prop_assert_eq!(ind.num_chromosomes(), 2);
            for (c, &e) in ind.chromosomes.iter().zip(&encodings) {
                prop_assert_eq!(c.encoding, e);
                prop_assert_eq!(c.len(), scenario.total_operations());
                prop_assert!(c.genes.iter().all(|&g| (1..=machines).contains(&g)));
            }
        }
        for slot in 0..2 {
            prop_assert!(!engine.pareto_front(slot).is_empty());
        }
    }
}
