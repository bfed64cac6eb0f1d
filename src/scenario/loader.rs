//! Scenario text format.
//!
//! ```text
//! # Processing times (rows = operations, columns = machines)
//! 5 3 4
//! 2 6 1
//! # Energy costs
//! 2 4 3
//! 1 1 5
//! # Jobs
//! J1 = {O1, O2}
//! J2 = {O2}
//! ```
//!
//! Blank lines and `#` lines are comments. A comment that mentions energy
//! (`energ`), processing times (`tiempo`, `processing`, `time`), or jobs
//! (`trabajo`, `job`) switches the current section. Keywords are checked in
//! that order, so `# energy per time unit` opens the energy section.
//! Operation tokens `O<n>` are 1-based.

use std::fs;
use std::path::Path;

use log::info;

use super::encoding::Encoding;
use super::types::{Job, Scenario};
use crate::error::ScenarioError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Times,
    Energy,
    Jobs,
}

impl Section {
    fn from_comment(line: &str) -> Option<Self> {
        let lower = line.to_lowercase();
        if lower.contains("energ") {
            Some(Section::Energy)
        } else if lower.contains("tiempo") || lower.contains("processing") || lower.contains("time") {
            Some(Section::Times)
        } else if lower.contains("trabajo") || lower.contains("job") {
            Some(Section::Jobs)
        } else {
            None
        }
    }
}

impl Scenario {
    /// Parses a scenario and installs dispatch orders for `encodings`.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_evosched::scenario::{Encoding, Scenario};
    ///
    /// let text = "# times\n5 3\n# energy\n2 4\n# jobs\nJ1 = {O1}\n";
    /// let s = Scenario::parse(text, &[Encoding::Fifo]).unwrap();
    /// assert_eq!(s.num_machines(), 2);
    /// assert_eq!(s.total_operations(), 1);
    /// ```
    pub fn parse(text: &str, encodings: &[Encoding]) -> Result<Self, ScenarioError> {
        let mut section = Section::None;
        let mut times: Vec<Vec<f64>> = Vec::new();
        let mut energy: Vec<Vec<f64>> = Vec::new();
        let mut jobs: Vec<Job> = Vec::new();

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                if let Some(next) = Section::from_comment(line) {
                    section = next;
                }
                continue;
            }

            match section {
                Section::Times => {
                    let row = parse_row(line, line_no)?;
                    if let Some(first) = times.first() {
                        if row.len() != first.len() {
                            return Err(ScenarioError::RowWidth {
                                line: line_no,
                                expected: first.len(),
                                actual: row.len(),
                            });
                        }
                    }
                    times.push(row);
                }
                Section::Energy => {
                    let row = parse_row(line, line_no)?;
                    let expected = times.first().map_or(0, Vec::len);
                    if row.len() != expected {
                        return Err(ScenarioError::RowWidth {
                            line: line_no,
                            expected,
                            actual: row.len(),
                        });
                    }
                    energy.push(row);
                }
                Section::Jobs => {
                    if let Some(ops) = parse_job(line, line_no)? {
                        if !ops.is_empty() {
                            jobs.push(Job::new(jobs.len(), ops));
                        }
                    }
                }
                Section::None => {}
            }
        }

        let scenario = Scenario::new(times, energy, jobs)?.with_encodings(encodings);
        info!(
            "scenario loaded: {} machines, {} operations, {} jobs, {} scheduled operations",
            scenario.num_machines(),
            scenario.num_operations(),
            scenario.num_jobs(),
            scenario.total_operations()
        );
        Ok(scenario)
    }
}

/// Reads and parses a scenario file.
pub fn load_scenario<P: AsRef<Path>>(
    path: P,
    encodings: &[Encoding],
) -> Result<Scenario, ScenarioError> {
    let text = fs::read_to_string(path.as_ref())?;
    info!("loading scenario from {}", path.as_ref().display());
    Scenario::parse(&text, encodings)
}

fn parse_row(line: &str, line_no: usize) -> Result<Vec<f64>, ScenarioError> {
    line.split_whitespace()
        .map(|tok| {
            tok.parse::<f64>().map_err(|e| ScenarioError::Parse {
                line: line_no,
                message: format!("invalid number {tok:?}: {e}"),
            })
        })
        .collect()
}

/// Parses `J1 = {O1, O3}` into 0-based operation ids.
///
/// Lines without a `{...}` group are not job rows and yield `None`.
fn parse_job(line: &str, line_no: usize) -> Result<Option<Vec<usize>>, ScenarioError> {
    let (Some(open), Some(close)) = (line.find('{'), line.find('}')) else {
        return Ok(None);
    };
    if close <= open {
        return Ok(None);
    }

    let mut ops = Vec::new();
    for token in line[open + 1..close].split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        let Some(pos) = token.find(['O', 'o']) else {
            continue;
        };
        let number: usize = token[pos + 1..].trim().parse().map_err(|_| ScenarioError::Parse {
            line: line_no,
            message: format!("invalid operation token {token:?}"),
        })?;
        if number == 0 {
            return Err(ScenarioError::Parse {
                line: line_no,
                message: "operation numbers start at O1".into(),
            });
        }
        ops.push(number - 1);
    }
    Ok(Some(ops))
}
