//! Job-shop scenario: machines, operations, jobs, and dispatch orders.
//!
//! A [`Scenario`] is immutable once built and is shared by reference across
//! a whole evolutionary run. It carries:
//!
//! - `processing_time[op][machine]` and `energy_cost[op][machine]` tables
//! - the jobs, each an ordered list of operation ids
//! - one dispatch order per installed [`Encoding`]
//!
//! Scenarios come from [`Scenario::new`] (programmatic) or
//! [`Scenario::parse`] / [`load_scenario`] (text format).

mod encoding;
mod loader;
mod types;

pub use encoding::Encoding;
pub use loader::load_scenario;
pub use types::{DispatchEntry, Job, Scenario};
