//! Engine configuration.
//!
//! [`NsgaConfig`] holds the parameters of the multi-policy NSGA-II loop;
//! [`MutationRates`] holds the three per-individual mutation probabilities.

use crate::error::{EngineError, EngineResult};

/// Probabilities of the three mutation operators, applied in this order.
///
/// # Examples
///
/// ```
/// use u_evosched::ga::MutationRates;
///
/// let rates = MutationRates::from_slice(&[0.1, 0.2, 0.3]).unwrap();
/// assert_eq!(rates.to_array(), [0.1, 0.2, 0.3]);
///
/// assert!(MutationRates::from_slice(&[0.1, 0.2]).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MutationRates {
    /// Swap the gene sequences of two slots.
    pub inter_chromosome: f64,
    /// Swap 1–3 random gene pairs in every slot.
    pub reciprocal_exchange: f64,
    /// Rotate a 3–5 gene window one step right in every slot.
    pub shift: f64,
}

impl MutationRates {
    /// Number of mutation kinds.
    pub const COUNT: usize = 3;

    /// Creates rates, clamping each to `[0, 1]`.
    pub fn new(inter_chromosome: f64, reciprocal_exchange: f64, shift: f64) -> Self {
        Self {
            inter_chromosome: inter_chromosome.clamp(0.0, 1.0),
            reciprocal_exchange: reciprocal_exchange.clamp(0.0, 1.0),
            shift: shift.clamp(0.0, 1.0),
        }
    }

    /// Reads `[inter, reciprocal, shift]`.
    ///
    /// Fails with [`EngineError::MutationRateCount`] unless exactly three
    /// entries are given, and with [`EngineError::InvalidConfig`] if any
    /// entry is not finite.
    pub fn from_slice(rates: &[f64]) -> EngineResult<Self> {
        match *rates {
            [inter, recip, shift] => {
                if !rates.iter().all(|r| r.is_finite()) {
                    return Err(EngineError::InvalidConfig(
                        "mutation rates must be finite".into(),
                    ));
                }
                Ok(Self::new(inter, recip, shift))
            }
            _ => Err(EngineError::MutationRateCount {
                expected: Self::COUNT,
                actual: rates.len(),
            }),
        }
    }

    /// `[inter, reciprocal, shift]`.
    pub fn to_array(self) -> [f64; 3] {
        [self.inter_chromosome, self.reciprocal_exchange, self.shift]
    }
}

impl Default for MutationRates {
    fn default() -> Self {
        Self::new(0.1, 0.1, 0.1)
    }
}

impl TryFrom<&[f64]> for MutationRates {
    type Error = EngineError;

    fn try_from(rates: &[f64]) -> EngineResult<Self> {
        Self::from_slice(rates)
    }
}

/// Configuration for [`EvolutionEngine`](super::EvolutionEngine).
///
/// # Defaults
///
/// ```
/// use u_evosched::ga::NsgaConfig;
///
/// let config = NsgaConfig::default();
/// assert_eq!(config.population_size, 100);
/// assert!((config.reference_offset - 50.0).abs() < 1e-12);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_evosched::ga::{MutationRates, NsgaConfig};
///
/// let config = NsgaConfig::default()
///     .with_population_size(40)
///     .with_crossover_rate(0.8)
///     .with_mutation_rates(MutationRates::new(0.05, 0.2, 0.2))
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct NsgaConfig {
    /// Number of individuals N, constant across generations.
    pub population_size: usize,

    /// Probability that a parent pair is recombined instead of cloned.
    pub crossover_rate: f64,

    /// Per-individual mutation probabilities.
    pub mutation_rates: MutationRates,

    /// Added to the initial population's worst f1 and f2 to form the
    /// hypervolume reference point.
    pub reference_offset: f64,

    /// Random seed for reproducibility.
    ///
    /// `None` uses a random seed.
    pub seed: Option<u64>,

    /// Whether to decode chromosomes in parallel using rayon.
    ///
    /// Only effective with the `parallel` feature. Decoding is pure, so
    /// results do not depend on this flag.
    pub parallel: bool,
}

impl Default for NsgaConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            crossover_rate: 0.9,
            mutation_rates: MutationRates::default(),
            reference_offset: 50.0,
            seed: None,
            parallel: false,
        }
    }
}

impl NsgaConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the crossover rate.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the mutation rates.
    pub fn with_mutation_rates(mut self, rates: MutationRates) -> Self {
        self.mutation_rates = rates;
        self
    }

    /// Sets the hypervolume reference offset.
    pub fn with_reference_offset(mut self, offset: f64) -> Self {
        self.reference_offset = offset.max(0.0);
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enables or disables parallel decoding.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> EngineResult<()> {
        if self.population_size == 0 {
            return Err(EngineError::InvalidConfig(
                "population_size must be at least 1".into(),
            ));
        }
        let in_unit = |r: &f64| (0.0..=1.0).contains(r);
        if !in_unit(&self.crossover_rate) || !self.mutation_rates.to_array().iter().all(in_unit) {
            return Err(EngineError::InvalidConfig("rates must lie in [0, 1]".into()));
        }
        if !self.reference_offset.is_finite() || self.reference_offset < 0.0 {
            return Err(EngineError::InvalidConfig(
                "reference_offset must be finite and non-negative".into(),
            ));
        }
        Ok(())
    }
}
