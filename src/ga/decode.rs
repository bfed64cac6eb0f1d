//! Scheduling simulator.
//!
//! Decodes a gene sequence into a concrete schedule by walking the
//! encoding's dispatch order. Each operation starts at
//! `max(machine free time, job's previous end time)`; that single
//! expression prevents machine double-booking and, because every dispatch
//! order keeps each job's operations in sequence, enforces job precedence.
//!
//! Decoding is a pure function of `(genes, dispatch order, scenario)`:
//! machine and job state live in local arenas sized by the scenario and are
//! discarded on return.

use super::types::OperationSchedule;
use crate::scenario::{DispatchEntry, Scenario};

/// Result of decoding one chromosome.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    /// One entry per gene position, in dispatch order.
    pub schedule: Vec<OperationSchedule>,
    /// f1: latest finish time over machines that ran at least one operation.
    pub makespan: f64,
    /// f2: total energy over machines that ran at least one operation.
    pub energy: f64,
}

#[derive(Debug, Clone, Copy, Default)]
struct MachineState {
    free_at: f64,
    energy: f64,
    active: bool,
}

#[derive(Debug, Clone, Copy, Default)]
struct JobState {
    next_operation: usize,
    last_end: f64,
}

/// Decodes `genes` under `order` and returns the schedule with both
/// objectives.
///
/// Genes are 1-based machine choices; `order` and `genes` must have the
/// same length and every gene must lie in `1..=scenario.num_machines()`.
/// [`EvolutionEngine`](super::EvolutionEngine) checks these before any
/// externally supplied chromosome reaches this function.
///
/// Machines that receive no operation are excluded from both objectives.
///
/// # Examples
///
/// ```
/// use u_evosched::ga::decode;
/// use u_evosched::scenario::{Encoding, Job, Scenario};
///
/// let s = Scenario::new(vec![vec![5.0, 3.0]], vec![vec![2.0, 4.0]], vec![Job::new(0, vec![0])])
///     .unwrap()
///     .with_encoding(Encoding::Fifo);
/// let order = s.dispatch_order(Encoding::Fifo).unwrap();
///
/// let d = decode(&s, order, &[2]);
/// assert_eq!((d.makespan, d.energy), (3.0, 4.0));
/// ```
pub fn decode(scenario: &Scenario, order: &[DispatchEntry], genes: &[usize]) -> Decoded {
    debug_assert_eq!(order.len(), genes.len(), "one gene per dispatch position");

    let mut machines = vec![MachineState::default(); scenario.num_machines()];
    let mut jobs = vec![JobState::default(); scenario.num_jobs()];
    let mut schedule = Vec::with_capacity(genes.len());

    for (entry, &gene) in order.iter().zip(genes) {
        debug_assert!(gene >= 1 && gene <= machines.len(), "gene {gene} out of range");
        let machine_id = gene - 1;
        let processing_time = scenario.processing_time(entry.operation, machine_id);
        let energy_cost = scenario.energy_cost(entry.operation, machine_id);

        let machine = &mut machines[machine_id];
        let job = &mut jobs[entry.job];
        debug_assert_eq!(
            scenario.jobs()[entry.job].operations.get(job.next_operation),
            Some(&entry.operation),
            "dispatch order breaks job sequence"
        );

        let start = machine.free_at.max(job.last_end);
        let end = start + processing_time;

        machine.free_at = end;
        machine.energy += energy_cost;
        machine.active = true;
        job.last_end = end;
        job.next_operation += 1;

        schedule.push(OperationSchedule {
            operation: entry.operation,
            job: entry.job,
            machine: machine_id,
            start,
            end,
            processing_time,
            energy_cost,
        });
    }

    let (makespan, energy) = machines
        .iter()
        .filter(|m| m.active)
        .fold((0.0f64, 0.0f64), |(mk, en), m| (mk.max(m.free_at), en + m.energy));

    Decoded {
        schedule,
        makespan,
        energy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::{Encoding, Job};

    fn single(times: Vec<f64>, energy: Vec<f64>) -> Scenario {
        Scenario::new(vec![times], vec![energy], vec![Job::new(0, vec![0])])
            .unwrap()
            .with_encoding(Encoding::Fifo)
    }

    #[test]
    fn test_single_machine_single_op() {
        let s = single(vec![5.0], vec![2.0]);
        let d = decode(&s, s.dispatch_order(Encoding::Fifo).unwrap(), &[1]);
        assert_eq!(d.makespan, 5.0);
        assert_eq!(d.energy, 2.0);
        assert_eq!(d.schedule.len(), 1);
        assert_eq!(d.schedule[0].start, 0.0);
        assert_eq!(d.schedule[0].end, 5.0);
    }

    #[test]
    fn test_idle_machine_excluded() {
        let s = single(vec![5.0, 3.0], vec![2.0, 4.0]);
        let d = decode(&s, s.dispatch_order(Encoding::Fifo).unwrap(), &[2]);
        assert_eq!(d.makespan, 3.0);
        assert_eq!(d.energy, 4.0);
        assert_eq!(d.schedule[0].machine, 1);
    }

    /// Two jobs, two machines:
    /// job0 = [op0, op1], job1 = [op2].
    fn two_jobs() -> Scenario {
        Scenario::new(
            vec![vec![3.0, 4.0], vec![2.0, 1.0], vec![5.0, 6.0]],
            vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]],
            vec![Job::new(0, vec![0, 1]), Job::new(1, vec![2])],
        )
        .unwrap()
        .with_encodings(&[Encoding::Fifo, Encoding::RrFifo])
    }

    #[test]
    fn test_job_precedence_delays_start() {
        let s = two_jobs();
        // FIFO: (0,0) (0,1) (1,2)
        let d = decode(&s, s.dispatch_order(Encoding::Fifo).unwrap(), &[1, 2, 1]);
        // op0: m0 [0,3]; op1: m1 waits for job0 -> [3,4]; op2: m0 free at 3 -> [3,8]
        assert_eq!(d.schedule[1].start, 3.0);
        assert_eq!(d.schedule[1].end, 4.0);
        assert_eq!(d.schedule[2].start, 3.0);
        assert_eq!(d.schedule[2].end, 8.0);
        assert_eq!(d.makespan, 8.0);
        assert_eq!(d.energy, 1.0 + 4.0 + 5.0);
    }

    #[test]
    fn test_machine_never_double_booked() {
        let s = two_jobs();
        let d = decode(&s, s.dispatch_order(Encoding::RrFifo).unwrap(), &[1, 1, 1]);
        let mut on_m0: Vec<_> = d.schedule.iter().filter(|o| o.machine == 0).collect();
        on_m0.sort_by(|a, b| a.start.partial_cmp(&b.start).unwrap());
        for w in on_m0.windows(2) {
            assert!(w[0].end <= w[1].start);
        }
        assert_eq!(d.makespan, 3.0 + 5.0 + 2.0);
    }

    #[test]
    fn test_decode_is_deterministic() {
        let s = two_jobs();
        let order = s.dispatch_order(Encoding::RrFifo).unwrap();
        let a = decode(&s, order, &[2, 1, 2]);
        let b = decode(&s, order, &[2, 1, 2]);
        assert_eq!(a, b);
    }
}
