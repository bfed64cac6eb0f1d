//! Dispatch policies ("encodings").
//!
//! An encoding fixes the static order in which operations are presented to
//! the scheduling simulator. Each encoding yields one dispatch order of
//! length T that preserves every job's internal operation sequence; the
//! chromosome for that encoding then only chooses machines.

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use super::types::{DispatchEntry, Job};
use crate::error::ScenarioError;

/// A named static priority rule.
///
/// # Examples
///
/// ```
/// use u_evosched::scenario::Encoding;
///
/// let enc: Encoding = "rrltp".parse().unwrap();
/// assert_eq!(enc, Encoding::RrLtp);
/// assert_eq!(enc.name(), "RRLTP");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Encoding {
    /// Jobs in declaration order, each job run to completion.
    Fifo,
    /// Longest total processing time first.
    Ltp,
    /// Shortest total processing time first.
    Stp,
    /// Round robin over jobs in declaration order.
    RrFifo,
    /// Round robin over jobs, longest total processing time first.
    RrLtp,
    /// Round robin over jobs, lowest total energy cost first.
    RrEca,
}

impl Encoding {
    /// Every encoding, in canonical order.
    pub const ALL: [Encoding; 6] = [
        Encoding::Fifo,
        Encoding::Ltp,
        Encoding::Stp,
        Encoding::RrFifo,
        Encoding::RrLtp,
        Encoding::RrEca,
    ];

    /// Number of encodings.
    pub const COUNT: usize = Self::ALL.len();

    /// Canonical upper-case name.
    pub fn name(self) -> &'static str {
        match self {
            Encoding::Fifo => "FIFO",
            Encoding::Ltp => "LTP",
            Encoding::Stp => "STP",
            Encoding::RrFifo => "RRFIFO",
            Encoding::RrLtp => "RRLTP",
            Encoding::RrEca => "RRECA",
        }
    }

    /// Dense index in `0..COUNT`, used for table lookup.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Builds this encoding's dispatch order.
    ///
    /// `processing_time` and `energy_cost` are indexed `[operation][machine]`.
    pub fn dispatch_order(
        self,
        jobs: &[Job],
        processing_time: &[Vec<f64>],
        energy_cost: &[Vec<f64>],
    ) -> Vec<DispatchEntry> {
        let by_time = || job_weights(jobs, processing_time);
        let by_energy = || job_weights(jobs, energy_cost);
        let declared: Vec<usize> = (0..jobs.len()).collect();

        match self {
            Encoding::Fifo => sequential(jobs, &declared),
            Encoding::Ltp => sequential(jobs, &sorted_jobs(&by_time(), true)),
            Encoding::Stp => sequential(jobs, &sorted_jobs(&by_time(), false)),
            Encoding::RrFifo => round_robin(jobs, &declared),
            Encoding::RrLtp => round_robin(jobs, &sorted_jobs(&by_time(), true)),
            Encoding::RrEca => round_robin(jobs, &sorted_jobs(&by_energy(), false)),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Encoding {
    type Err = ScenarioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Encoding::ALL
            .iter()
            .copied()
            .find(|e| e.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ScenarioError::UnknownEncoding(trimmed.to_string()))
    }
}

/// Per-job sum over its operations of the machine-averaged table value.
fn job_weights(jobs: &[Job], table: &[Vec<f64>]) -> Vec<f64> {
    jobs.iter()
        .map(|job| {
            job.operations
                .iter()
                .map(|&op| {
                    let row = &table[op];
                    if row.is_empty() {
                        0.0
                    } else {
                        row.iter().sum::<f64>() / row.len() as f64
                    }
                })
                .sum()
        })
        .collect()
}

/// Job indices sorted by weight; ties keep declaration order.
fn sorted_jobs(weights: &[f64], descending: bool) -> Vec<usize> {
    let mut order: Vec<usize> = (0..weights.len()).collect();
    order.sort_by(|&a, &b| {
        let cmp = weights[a]
            .partial_cmp(&weights[b])
            .unwrap_or(std::cmp::Ordering::Equal);
        if descending {
            cmp.reverse()
        } else {
            cmp
        }
    });
    order
}

fn sequential(jobs: &[Job], order: &[usize]) -> Vec<DispatchEntry> {
    order
        .iter()
        .flat_map(|&j| {
            jobs[j].operations.iter().map(move |&op| DispatchEntry {
                job: jobs[j].id,
                operation: op,
            })
        })
        .collect()
}

/// One operation from each unfinished job per round, in `order`.
fn round_robin(jobs: &[Job], order: &[usize]) -> Vec<DispatchEntry> {
    let mut queues: Vec<VecDeque<DispatchEntry>> = order
        .iter()
        .map(|&j| {
            jobs[j]
                .operations
                .iter()
                .map(|&op| DispatchEntry {
                    job: jobs[j].id,
                    operation: op,
                })
                .collect()
        })
        .collect();

    let total: usize = queues.iter().map(VecDeque::len).sum();
    let mut result = Vec::with_capacity(total);
    while !queues.is_empty() {
        queues.retain(|q| !q.is_empty());
        for queue in &mut queues {
            if let Some(entry) = queue.pop_front() {
                result.push(entry);
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    // time weights: job0 = 4, job1 = 10, job2 = 3
    // energy weights: job0 = 10, job1 = 1, job2 = 6
    fn fixture() -> (Vec<Job>, Vec<Vec<f64>>, Vec<Vec<f64>>) {
        let jobs = vec![
            Job::new(0, vec![0, 1]),
            Job::new(1, vec![2]),
            Job::new(2, vec![3, 4, 5]),
        ];
        let times = vec![
            vec![1.0, 1.0],
            vec![2.0, 4.0],
            vec![10.0, 10.0],
            vec![1.0, 1.0],
            vec![1.0, 1.0],
            vec![1.0, 1.0],
        ];
        let energy = vec![
            vec![5.0, 5.0],
            vec![5.0, 5.0],
            vec![1.0, 1.0],
            vec![2.0, 2.0],
            vec![2.0, 2.0],
            vec![2.0, 2.0],
        ];
        (jobs, times, energy)
    }

    fn pairs(order: &[DispatchEntry]) -> Vec<(usize, usize)> {
        order.iter().map(|e| (e.job, e.operation)).collect()
    }

    #[test]
    fn test_fifo_order() {
        let (jobs, t, e) = fixture();
        let order = Encoding::Fifo.dispatch_order(&jobs, &t, &e);
        assert_eq!(
            pairs(&order),
            vec![(0, 0), (0, 1), (1, 2), (2, 3), (2, 4), (2, 5)]
        );
    }

    #[test]
    fn test_ltp_and_stp_orders() {
        let (jobs, t, e) = fixture();
        let ltp = Encoding::Ltp.dispatch_order(&jobs, &t, &e);
        assert_eq!(
            pairs(&ltp),
            vec![(1, 2), (0, 0), (0, 1), (2, 3), (2, 4), (2, 5)]
        );
        let stp = Encoding::Stp.dispatch_order(&jobs, &t, &e);
        assert_eq!(
            pairs(&stp),
            vec![(2, 3), (2, 4), (2, 5), (0, 0), (0, 1), (1, 2)]
        );
    }

    #[test]
    fn test_round_robin_interleaves() {
        let (jobs, t, e) = fixture();
        let rr = Encoding::RrFifo.dispatch_order(&jobs, &t, &e);
        assert_eq!(
            pairs(&rr),
            vec![(0, 0), (1, 2), (2, 3), (0, 1), (2, 4), (2, 5)]
        );
    }

    #[test]
    fn test_rreca_lowest_energy_first() {
        let (jobs, t, e) = fixture();
        let rr = Encoding::RrEca.dispatch_order(&jobs, &t, &e);
        assert_eq!(
            pairs(&rr),
            vec![(1, 2), (2, 3), (0, 0), (2, 4), (0, 1), (2, 5)]
        );
    }

    #[test]
    fn test_every_order_preserves_job_sequence() {
        let (jobs, t, e) = fixture();
        for enc in Encoding::ALL {
            let order = enc.dispatch_order(&jobs, &t, &e);
            assert_eq!(order.len(), 6, "{enc} has wrong length");
            for job in &jobs {
                let seen: Vec<usize> = order
                    .iter()
                    .filter(|d| d.job == job.id)
                    .map(|d| d.operation)
                    .collect();
                assert_eq!(seen, job.operations, "{enc} reorders job {}", job.id);
            }
        }
    }

    #[test]
    fn test_parse_names() {
        for enc in Encoding::ALL {
            assert_eq!(enc.name().parse::<Encoding>().unwrap(), enc);
            assert_eq!(enc.to_string(), enc.name());
        }
        assert_eq!(" fifo ".parse::<Encoding>().unwrap(), Encoding::Fifo);
        assert!("EDD".parse::<Encoding>().is_err());
    }

    #[test]
    fn test_index_is_dense() {
        for (i, enc) in Encoding::ALL.iter().enumerate() {
            assert_eq!(enc.index(), i);
        }
    }
}
