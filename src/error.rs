//! Error types.
//!
//! [`EngineError`] covers configuration and structural failures raised by
//! the evolution engine; [`ScenarioError`] covers scenario file parsing.

use thiserror::Error;

use crate::scenario::Encoding;

/// Errors raised by [`EvolutionEngine`](crate::ga::EvolutionEngine) and its
/// configuration.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    /// A mutation-rate vector did not have one entry per mutation kind.
    #[error("expected {expected} mutation rates, got {actual}")]
    MutationRateCount { expected: usize, actual: usize },

    /// A configuration parameter is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The scenario has no dispatch order for a requested encoding.
    #[error("scenario has no dispatch order for encoding {0}")]
    MissingDispatchOrder(Encoding),

    /// A dispatch order does not cover every operation exactly once.
    #[error("dispatch order for {encoding} has {actual} entries, expected {expected}")]
    DispatchLength {
        encoding: Encoding,
        expected: usize,
        actual: usize,
    },

    /// A dispatch order presents a job's operations out of sequence.
    #[error("dispatch order for {encoding} breaks the operation sequence of job {job}")]
    PrecedenceViolation { encoding: Encoding, job: usize },

    /// A gene selects a machine outside `1..=machines`.
    #[error("gene {gene} at position {position} is outside 1..={machines}")]
    GeneOutOfRange {
        position: usize,
        gene: usize,
        machines: usize,
    },

    /// A chromosome does not have one gene per scheduled operation.
    #[error("chromosome has {actual} genes, expected {expected}")]
    GeneLength { expected: usize, actual: usize },

    /// A query or generation step ran before `initialize`.
    #[error("population is not initialized")]
    NotInitialized,
}

/// Errors raised while reading a scenario description.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    /// An energy row does not match the machine count of the time table.
    #[error("line {line}: row has {actual} values, expected {expected}")]
    RowWidth {
        line: usize,
        expected: usize,
        actual: usize,
    },

    #[error("unknown encoding: {0}")]
    UnknownEncoding(String),

    /// A required section is missing or has no rows.
    #[error("scenario has no {0}")]
    Empty(&'static str),

    /// The energy table does not have one row per operation.
    #[error("{energy_rows} energy rows for {operations} operations")]
    TableShape {
        energy_rows: usize,
        operations: usize,
    },

    /// Jobs are not numbered consecutively from zero.
    #[error("job at position {position} has id {id}")]
    JobId { position: usize, id: usize },

    /// A job references an operation with no table row.
    #[error("job {job} references operation {operation}, but only {operations} are defined")]
    UnknownOperation {
        job: usize,
        operation: usize,
        operations: usize,
    },
}

/// Result alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
