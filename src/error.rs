use thiserror::Error;

/// Errors raised while validating an auction run.
///
/// Every variant is produced before any solver thread is spawned; a solve that
/// has started never fails.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AuctionError {
    #[error("epsilon must be finite and strictly positive, got {0}")]
    InvalidEpsilon(f64),

    #[error("{name} must be finite and strictly positive, got {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("{role} {index} has a non-finite coordinate")]
    NonFinitePosition { role: &'static str, index: usize },

    #[error("{what} row {row} has {found} entries, expected {expected}")]
    RaggedMatrix {
        what: &'static str,
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("{what} has {found} entries, expected {expected}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("utility of agent {agent} for task {task} is {value}, expected finite or unknown")]
    InvalidUtility { agent: usize, task: usize, value: f64 },

    #[error("visibility matrix is not symmetric at ({row}, {col})")]
    AsymmetricVisibility { row: usize, col: usize },
}
