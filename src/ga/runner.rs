//! Multi-policy NSGA-II driver.
//!
//! [`EvolutionEngine`] owns the population, the random stream and the
//! hypervolume history of one run:
//! initialize → (select → crossover → mutate → rank → truncate) per
//! generation.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use rand::rngs::SmallRng;
use u_numflow::random::create_rng;

use super::config::{MutationRates, NsgaConfig};
use super::decode::decode;
use super::hypervolume::{slot_hypervolume, HypervolumeHistory};
use super::multi_objective::rank_cohort;
use super::operators::{mutate, uniform_crossover};
use super::selection::select;
use super::types::{Chromosome, Individual, OperationSchedule};
use crate::error::{EngineError, EngineResult};
use crate::scenario::{DispatchEntry, Encoding, Scenario};

/// Evolves one population of polyploid individuals over a scenario.
///
/// Slot `c` of every individual is decoded under `encodings[c]`. Dispatch
/// orders are resolved and checked once at construction; afterwards every
/// chromosome produced by the engine is decodable by construction.
///
/// # Usage
///
/// ```
/// use u_evosched::ga::{EvolutionEngine, NsgaConfig};
/// use u_evosched::scenario::{Encoding, Job, Scenario};
///
/// let encodings = [Encoding::Fifo, Encoding::RrEca];
/// let scenario = Scenario::new(
///     vec![vec![3.0, 5.0], vec![2.0, 1.0], vec![4.0, 4.0]],
///     vec![vec![1.0, 0.5], vec![2.0, 3.0], vec![1.0, 1.0]],
///     vec![Job::new(0, vec![0, 1]), Job::new(1, vec![2])],
/// )
/// .unwrap()
/// .with_encodings(&encodings);
///
/// let config = NsgaConfig::default().with_population_size(20).with_seed(42);
/// let mut engine = EvolutionEngine::new(&scenario, &encodings, config).unwrap();
/// engine.initialize();
/// engine.run(5).unwrap();
///
/// assert_eq!(engine.hypervolumes().len(), 6);
/// assert_eq!(engine.population().len(), 20);
/// ```
#[derive(Debug, Clone)]
pub struct EvolutionEngine<'a> {
    scenario: &'a Scenario,
    encodings: Vec<Encoding>,
    orders: Vec<&'a [DispatchEntry]>,
    config: NsgaConfig,
    rng: SmallRng,
    population: Vec<Individual>,
    history: HypervolumeHistory,
    reference: Option<(f64, f64)>,
    generation: usize,
}

impl<'a> EvolutionEngine<'a> {
    /// Creates an engine over `scenario` with one slot per entry of
    /// `encodings`.
    ///
    /// Fails if the configuration is invalid, if `encodings` is empty or
    /// repeats an encoding, or if the scenario lacks a dispatch order for an
    /// encoding, has one of the wrong length, or has one that breaks a job's
    /// operation sequence.
    pub fn new(
        scenario: &'a Scenario,
        encodings: &[Encoding],
        config: NsgaConfig,
    ) -> EngineResult<Self> {
        config.validate()?;
        if encodings.is_empty() {
            return Err(EngineError::InvalidConfig(
                "at least one encoding is required".into(),
            ));
        }
        for (i, e) in encodings.iter().enumerate() {
            if encodings[..i].contains(e) {
                return Err(EngineError::InvalidConfig(format!(
                    "encoding {e} is listed twice"
                )));
            }
        }

        let orders = encodings
            .iter()
            .map(|&e| resolve_order(scenario, e))
            .collect::<EngineResult<Vec<_>>>()?;

        let rng = match config.seed {
            Some(seed) => create_rng(seed),
            None => create_rng(rand::random()),
        };

        Ok(Self {
            scenario,
            encodings: encodings.to_vec(),
            orders,
            config,
            rng,
            population: Vec::new(),
            history: HypervolumeHistory::new(),
            reference: None,
            generation: 0,
        })
    }

    /// Creates an engine from raw rates, as `[inter, reciprocal, shift]`.
    ///
    /// Fails with [`EngineError::MutationRateCount`] unless `mutation_rates`
    /// has exactly three entries.
    pub fn with_rates(
        scenario: &'a Scenario,
        encodings: &[Encoding],
        population_size: usize,
        crossover_rate: f64,
        mutation_rates: &[f64],
    ) -> EngineResult<Self> {
        let config = NsgaConfig::default()
            .with_population_size(population_size)
            .with_crossover_rate(crossover_rate)
            .with_mutation_rates(MutationRates::from_slice(mutation_rates)?);
        Self::new(scenario, encodings, config)
    }

    /// Creates a random population, decodes and ranks it, freezes the
    /// hypervolume reference point and records the first snapshot.
    ///
    /// Calling it again restarts the run; the random stream continues.
    pub fn initialize(&mut self) {
        let len = self.scenario.total_operations();
        let machines = self.scenario.num_machines();
        let mut population: Vec<Individual> = (0..self.config.population_size)
            .map(|_| Individual::random(&self.encodings, len, machines, &mut self.rng))
            .collect();

        self.decode_population(&mut population);
        rank_cohort(&mut population, self.config.parallel);

        let (max_f1, max_f2) = population
            .iter()
            .flat_map(|ind| &ind.chromosomes)
            .fold((f64::NEG_INFINITY, f64::NEG_INFINITY), |(a, b), c| {
                (a.max(c.makespan), b.max(c.energy))
            });
        let offset = self.config.reference_offset;
        self.reference = Some((max_f1 + offset, max_f2 + offset));

        self.population = population;
        self.history = HypervolumeHistory::new();
        self.generation = 0;
        self.record_hypervolume();

        log::info!(
            "initialized {} individuals x {} slots, {} genes each, reference ({:.3}, {:.3})",
            self.population.len(),
            self.encodings.len(),
            len,
            max_f1 + offset,
            max_f2 + offset
        );
    }

    /// Advances exactly one generation.
    ///
    /// Draw order on the random stream: parent tournaments, crossover,
    /// mutation, truncation tournaments.
    pub fn run_generation(&mut self) -> EngineResult<()> {
        if self.population.is_empty() {
            return Err(EngineError::NotInitialized);
        }
        let n = self.config.population_size;
        let parallel = self.config.parallel;

        let parents = select(&self.population, n, &mut self.rng);
        let mut offspring = uniform_crossover(&parents, self.config.crossover_rate, &mut self.rng);
        self.decode_population(&mut offspring);

        let mut combined = std::mem::take(&mut self.population);
        combined.append(&mut offspring);

        let mut mutated = Vec::new();
        for (i, ind) in combined.iter_mut().enumerate() {
            if mutate(ind, &self.config.mutation_rates, &mut self.rng) {
                mutated.push(i);
            }
        }
        for &i in &mutated {
            evaluate_individual(self.scenario, &self.orders, &mut combined[i]);
        }
        log::trace!("{} of {} individuals mutated", mutated.len(), combined.len());

        rank_cohort(&mut combined, parallel);

        let mut next = select(&combined, n, &mut self.rng);
        self.decode_population(&mut next);
        rank_cohort(&mut next, parallel);

        self.population = next;
        self.generation += 1;
        self.record_hypervolume();

        if log::log_enabled!(log::Level::Debug) {
            log::debug!(
                "generation {}: hypervolume {:?}",
                self.generation,
                self.history.latest().unwrap_or(&[])
            );
        }
        Ok(())
    }

    /// Runs `generations` generations, initializing first if needed.
    pub fn run(&mut self, generations: usize) -> EngineResult<()> {
        if self.population.is_empty() {
            self.initialize();
        }
        for _ in 0..generations {
            self.run_generation()?;
        }
        Ok(())
    }

    /// Current population.
    pub fn population(&self) -> &[Individual] {
        &self.population
    }

    /// Per-generation, per-slot hypervolume record.
    pub fn hypervolumes(&self) -> &HypervolumeHistory {
        &self.history
    }

    /// Active encodings in slot order.
    pub fn encodings(&self) -> &[Encoding] {
        &self.encodings
    }

    /// Current configuration.
    pub fn config(&self) -> &NsgaConfig {
        &self.config
    }

    /// Generations run since the last [`initialize`](Self::initialize).
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Hypervolume reference point, frozen at initialization.
    pub fn reference_point(&self) -> Option<(f64, f64)> {
        self.reference
    }

    /// The individual holding the smallest makespan at any slot.
    pub fn best_makespan(&self) -> EngineResult<&Individual> {
        self.best_by(|c| c.makespan)
    }

    /// The individual holding the smallest energy at any slot.
    pub fn best_energy(&self) -> EngineResult<&Individual> {
        self.best_by(|c| c.energy)
    }

    fn best_by(&self, key: impl Fn(&Chromosome) -> f64) -> EngineResult<&Individual> {
        let key = &key;
        self.population
            .iter()
            .flat_map(|ind| ind.chromosomes.iter().map(move |c| (ind, key(c))))
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(ind, _)| ind)
            .ok_or(EngineError::NotInitialized)
    }

    /// The individual whose rank-1 chromosome lies nearest to the ideal
    /// point.
    ///
    /// The ideal point is `(min f1, min f2)` over every rank-1 chromosome of
    /// every slot; distance is Euclidean.
    pub fn knee_point(&self) -> EngineResult<&Individual> {
        let front = || {
            self.population.iter().flat_map(|ind| {
                ind.chromosomes
                    .iter()
                    .filter(|c| c.rank == Some(1))
                    .map(move |c| (ind, c.makespan, c.energy))
            })
        };

        let (ideal_f1, ideal_f2) = front()
            .fold((f64::INFINITY, f64::INFINITY), |(a, b), (_, f1, f2)| {
                (a.min(f1), b.min(f2))
            });

        front()
            .map(|(ind, f1, f2)| (ind, (f1 - ideal_f1).hypot(f2 - ideal_f2)))
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(ind, _)| ind)
            .ok_or(EngineError::NotInitialized)
    }

    /// Rank-1 chromosomes of the current population at `slot`.
    pub fn pareto_front(&self, slot: usize) -> Vec<&Chromosome> {
        self.population
            .iter()
            .filter_map(|ind| ind.chromosomes.get(slot))
            .filter(|c| c.rank == Some(1))
            .collect()
    }

    /// Replaces the mutation rates, given as `[inter, reciprocal, shift]`.
    ///
    /// On error the current rates are kept.
    pub fn set_mutation_rates(&mut self, rates: &[f64]) -> EngineResult<()> {
        self.config.mutation_rates = MutationRates::from_slice(rates)?;
        Ok(())
    }

    /// Replaces the crossover rate, clamped to `[0, 1]`.
    ///
    /// A non-finite rate is rejected and the current rate is kept.
    pub fn set_crossover_rate(&mut self, rate: f64) -> EngineResult<()> {
        if !rate.is_finite() {
            return Err(EngineError::InvalidConfig(format!(
                "crossover rate must be finite, got {rate}"
            )));
        }
        self.config.crossover_rate = rate.clamp(0.0, 1.0);
        Ok(())
    }

    /// Decodes a chromosome under its encoding and returns the schedule.
    ///
    /// The chromosome's encoding must be active in this engine, its length
    /// must equal the scenario's operation count and every gene must lie in
    /// `1..=num_machines`.
    pub fn evaluate_chromosome(&self, chromosome: &Chromosome) -> EngineResult<Vec<OperationSchedule>> {
        let slot = self
            .encodings
            .iter()
            .position(|&e| e == chromosome.encoding)
            .ok_or(EngineError::MissingDispatchOrder(chromosome.encoding))?;

        let expected = self.scenario.total_operations();
        if chromosome.len() != expected {
            return Err(EngineError::GeneLength {
                expected,
                actual: chromosome.len(),
            });
        }
        let machines = self.scenario.num_machines();
        if let Some((position, &gene)) = chromosome
            .genes
            .iter()
            .enumerate()
            .find(|(_, &g)| g == 0 || g > machines)
        {
            return Err(EngineError::GeneOutOfRange {
                position,
                gene,
                machines,
            });
        }

        Ok(decode(self.scenario, self.orders[slot], &chromosome.genes).schedule)
    }

    fn record_hypervolume(&mut self) {
        let Some((ref_f1, ref_f2)) = self.reference else {
            return;
        };
        let snapshot = (0..self.encodings.len())
            .map(|slot| slot_hypervolume(&self.population, slot, ref_f1, ref_f2))
            .collect();
        self.history.push(snapshot);
    }

    fn decode_population(&self, population: &mut [Individual]) {
        decode_population(self.scenario, &self.orders, population, self.config.parallel);
    }
}

#[cfg(feature = "parallel")]
fn decode_population(
    scenario: &Scenario,
    orders: &[&[DispatchEntry]],
    population: &mut [Individual],
    parallel: bool,
) {
    if parallel {
        population.par_iter_mut().for_each(|ind| {
            evaluate_individual(scenario, orders, ind);
        });
    } else {
        for ind in population.iter_mut() {
            evaluate_individual(scenario, orders, ind);
        }
    }
}

#[cfg(not(feature = "parallel"))]
fn decode_population(
    scenario: &Scenario,
    orders: &[&[DispatchEntry]],
    population: &mut [Individual],
    _parallel: bool,
) {
    for ind in population.iter_mut() {
        evaluate_individual(scenario, orders, ind);
    }
}

/// Decodes every slot of `individual` and stores its objectives.
fn evaluate_individual(scenario: &Scenario, orders: &[&[DispatchEntry]], individual: &mut Individual) {
    for (chromosome, order) in individual.chromosomes.iter_mut().zip(orders) {
        let decoded = decode(scenario, order, &chromosome.genes);
        chromosome.makespan = decoded.makespan;
        chromosome.energy = decoded.energy;
    }
}

/// Looks up `encoding`'s dispatch order and checks that it presents every
/// job's operations exactly once, in sequence.
fn resolve_order(scenario: &Scenario, encoding: Encoding) -> EngineResult<&[DispatchEntry]> {
    let order = scenario
        .dispatch_order(encoding)
        .ok_or(EngineError::MissingDispatchOrder(encoding))?;

    let expected = scenario.total_operations();
    if order.len() != expected {
        return Err(EngineError::DispatchLength {
            encoding,
            expected,
            actual: order.len(),
        });
    }

    let jobs = scenario.jobs();
    let mut next = vec![0usize; jobs.len()];
    for entry in order {
        let in_sequence = jobs
            .get(entry.job)
            .and_then(|job| job.operations.get(next[entry.job]))
            == Some(&entry.operation);
        if !in_sequence {
            return Err(EngineError::PrecedenceViolation {
                encoding,
                job: entry.job,
            });
        }
        next[entry.job] += 1;
    }

    Ok(order)
}
