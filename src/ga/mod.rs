//! Multi-policy NSGA-II for energy-aware job-shop scheduling.
//!
//! Every individual carries one chromosome per active dispatch policy
//! ([`Encoding`](crate::scenario::Encoding)). Chromosomes at the same slot
//! form their own ranking problem, so the population evolves several
//! policy-specific Pareto fronts at once over makespan and energy.
//!
//! # Key Types
//!
//! - [`Chromosome`], [`Individual`]: polyploid representation
//! - [`NsgaConfig`], [`MutationRates`]: algorithm parameters
//! - [`EvolutionEngine`]: initialization, the generation loop and queries
//!
//! # Submodules
//!
//! - [`multi_objective`]: Pareto dominance, non-dominated sorting, crowding distance
//! - [`hypervolume`]: 2-D hypervolume indicator and its per-generation history
//! - [`operators`]: uniform crossover and the three mutations
//! - [`selection`]: binary tournament on rank and crowding distance
//!
//! # References
//!
//! - Deb et al. (2002), *A Fast and Elitist Multiobjective GA: NSGA-II*
//! - Zitzler & Thiele (1998), *Multiobjective Optimization Using Evolutionary
//!   Algorithms: A Comparative Case Study*

mod config;
mod decode;
pub mod hypervolume;
pub mod multi_objective;
pub mod operators;
mod runner;
pub mod selection;
mod types;

pub use config::{MutationRates, NsgaConfig};
pub use decode::{decode, Decoded};
pub use hypervolume::{HypervolumeHistory, HypervolumeSummary};
pub use runner::EvolutionEngine;
pub use types::{Chromosome, Individual, OperationSchedule};
