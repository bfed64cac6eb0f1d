//! Multi-objective evolutionary scheduling for energy-aware job shops.
//!
//! Searches for trade-offs between makespan and total energy with an
//! NSGA-II variant that co-evolves one chromosome per dispatch policy:
//!
//! - **Scenario**: machines, jobs, processing-time and energy tables, and
//!   one fixed dispatch order per policy (FIFO, LTP, STP and their
//!   round-robin variants).
//! - **Decoding**: a deterministic simulator that turns machine assignments
//!   into a schedule plus both objectives.
//! - **Ranking**: non-dominated sorting and crowding distance per policy slot.
//! - **Hypervolume**: a per-generation quality record against a reference
//!   point frozen at initialization.
//! - **Engine**: tournament selection, uniform crossover and three mutation
//!   operators driven one generation at a time.
//!
//! # Architecture
//!
//! [`scenario`] is the read-only problem description; [`ga`] holds the
//! algorithm and borrows a scenario for the whole run. The engine performs
//! no I/O; [`scenario::load_scenario`] is the only file access.

pub mod error;
pub mod ga;
pub mod scenario;
