//! Error types for the analysis engine
//!
//! Two kinds of error exist:
//! - [`AnalysisError`] aborts an analysis before any computation and is
//!   returned to the caller.
//! - [`AlgorithmFailure`] is produced by an individual graph algorithm and is
//!   recovered by the engine (zero vector, fallback clustering). It is never
//!   surfaced through [`crate::AnalysisEngine::analyze`].

use thiserror::Error;

/// Fatal input or configuration errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("corpus is empty: no files to analyze")]
    EmptyCorpus,

    #[error("corpus has {count} files, exceeding the limit of {max}")]
    CorpusTooLarge { count: usize, max: usize },

    #[error("file {path} is {size} bytes, exceeding the limit of {max}")]
    FileTooLarge { path: String, size: u64, max: u64 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Recoverable failure of a single algorithm
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AlgorithmFailure {
    #[error("eigendecomposition did not converge")]
    NoConvergence,

    #[error("degenerate input: {0}")]
    Degenerate(String),

    #[error("partition covers {assigned} of {expected} nodes")]
    InvalidPartition { assigned: usize, expected: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = AnalysisError::CorpusTooLarge { count: 10, max: 5 };
        assert_eq!(err.to_string(), "corpus has 10 files, exceeding the limit of 5");

        let err = AnalysisError::FileTooLarge {
            path: "src/big.js".into(),
            size: 100,
            max: 10,
        };
        assert!(err.to_string().contains("src/big.js"));

        let failure = AlgorithmFailure::InvalidPartition { assigned: 3, expected: 4 };
        assert_eq!(failure.to_string(), "partition covers 3 of 4 nodes");
    }
}
