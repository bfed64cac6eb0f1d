//! Scenario data model.

use super::encoding::Encoding;
use crate::error::ScenarioError;

/// A job: an ordered list of operation ids.
///
/// The order of `operations` is the mandatory intra-job precedence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    /// Job id (`0..num_jobs`).
    pub id: usize,
    /// Operation ids in precedence order.
    pub operations: Vec<usize>,
}

impl Job {
    /// Creates a job.
    pub fn new(id: usize, operations: Vec<usize>) -> Self {
        Self { id, operations }
    }
}

/// One position of a dispatch order: which operation of which job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchEntry {
    pub job: usize,
    pub operation: usize,
}

/// Read-only problem description shared by the whole run.
///
/// Tables are indexed `[operation][machine]`. Dispatch orders are stored
/// per [`Encoding`] and looked up by its dense index, never by name.
///
/// # Examples
///
/// ```
/// use u_evosched::scenario::{Encoding, Job, Scenario};
///
/// let scenario = Scenario::new(
///     vec![vec![5.0, 3.0]],
///     vec![vec![2.0, 4.0]],
///     vec![Job::new(0, vec![0])],
/// )
/// .unwrap()
/// .with_encoding(Encoding::Fifo);
///
/// assert_eq!(scenario.num_machines(), 2);
/// assert_eq!(scenario.total_operations(), 1);
/// assert_eq!(scenario.dispatch_order(Encoding::Fifo).unwrap().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Scenario {
    num_machines: usize,
    processing_time: Vec<Vec<f64>>,
    energy_cost: Vec<Vec<f64>>,
    jobs: Vec<Job>,
    total_operations: usize,
    dispatch_orders: Vec<Option<Vec<DispatchEntry>>>,
}

impl Scenario {
    /// Builds a scenario from its tables and jobs.
    ///
    /// Checks only the shape: both tables have the same dimensions, at least
    /// one machine and one job exist, and every referenced operation has a
    /// table row. No dispatch order is installed yet.
    pub fn new(
        processing_time: Vec<Vec<f64>>,
        energy_cost: Vec<Vec<f64>>,
        jobs: Vec<Job>,
    ) -> Result<Self, ScenarioError> {
        let num_machines = processing_time.first().map_or(0, Vec::len);
        if num_machines == 0 {
            return Err(ScenarioError::Empty("processing times"));
        }
        if jobs.is_empty() {
            return Err(ScenarioError::Empty("jobs"));
        }
        if energy_cost.len() != processing_time.len() {
            return Err(ScenarioError::TableShape {
                energy_rows: energy_cost.len(),
                operations: processing_time.len(),
            });
        }
        for (i, (t, e)) in processing_time.iter().zip(&energy_cost).enumerate() {
            for row in [t, e] {
                if row.len() != num_machines {
                    return Err(ScenarioError::RowWidth {
                        line: i + 1,
                        expected: num_machines,
                        actual: row.len(),
                    });
                }
            }
        }
        let operations = processing_time.len();
        for (i, job) in jobs.iter().enumerate() {
            if job.id != i {
                return Err(ScenarioError::JobId {
                    position: i,
                    id: job.id,
                });
            }
            if let Some(&op) = job.operations.iter().find(|&&op| op >= operations) {
                return Err(ScenarioError::UnknownOperation {
                    job: job.id,
                    operation: op,
                    operations,
                });
            }
        }

        let total_operations = jobs.iter().map(|j| j.operations.len()).sum();
        Ok(Self {
            num_machines,
            processing_time,
            energy_cost,
            jobs,
            total_operations,
            dispatch_orders: vec![None; Encoding::COUNT],
        })
    }

    /// Installs the standard dispatch order for `encoding`.
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        let order = encoding.dispatch_order(&self.jobs, &self.processing_time, &self.energy_cost);
        self.dispatch_orders[encoding.index()] = Some(order);
        self
    }

    /// Installs the standard dispatch orders for several encodings.
    pub fn with_encodings(self, encodings: &[Encoding]) -> Self {
        encodings.iter().fold(self, |s, &e| s.with_encoding(e))
    }

    /// Installs a caller-supplied dispatch order for `encoding`.
    ///
    /// The order is checked when an engine is constructed, not here.
    pub fn with_dispatch_order(mut self, encoding: Encoding, order: Vec<DispatchEntry>) -> Self {
        self.dispatch_orders[encoding.index()] = Some(order);
        self
    }

    /// Number of machines M.
    pub fn num_machines(&self) -> usize {
        self.num_machines
    }

    /// Number of jobs J.
    pub fn num_jobs(&self) -> usize {
        self.jobs.len()
    }

    /// Number of distinct operations (table rows).
    pub fn num_operations(&self) -> usize {
        self.processing_time.len()
    }

    /// Total operation count T over all jobs.
    pub fn total_operations(&self) -> usize {
        self.total_operations
    }

    /// Jobs in declaration order.
    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    /// Processing time of `operation` on `machine`.
    #[inline]
    pub fn processing_time(&self, operation: usize, machine: usize) -> f64 {
        self.processing_time[operation][machine]
    }

    /// Energy cost of `operation` on `machine`.
    #[inline]
    pub fn energy_cost(&self, operation: usize, machine: usize) -> f64 {
        self.energy_cost[operation][machine]
    }

    /// Dispatch order for `encoding`, if installed.
    pub fn dispatch_order(&self, encoding: Encoding) -> Option<&[DispatchEntry]> {
        self.dispatch_orders[encoding.index()].as_deref()
    }

    /// Encodings with an installed dispatch order, in canonical order.
    pub fn encodings(&self) -> Vec<Encoding> {
        Encoding::ALL
            .iter()
            .copied()
            .filter(|e| self.dispatch_orders[e.index()].is_some())
            .collect()
    }
}
