//! Error types for the distributed simulation.

use crate::comm::Rank;

/// Invalid startup parameters. Every rank derives the same verdict from
/// the same common knowledge, so every rank fails identically.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error(
        "grid size {size} must be divisible by the number of ranks in each dimension (mesh {rows}x{cols})"
    )]
    NotDivisible { size: usize, rows: usize, cols: usize },

    #[error("process group must contain at least one process")]
    ZeroProcesses,

    #[error("grid size must be at least 1")]
    ZeroExtent,

    #[error("mesh {rows}x{cols} does not match process count {processes}")]
    MeshMismatch {
        rows: usize,
        cols: usize,
        processes: usize,
    },

    #[error("unknown pattern: {0}")]
    UnknownPattern(String),

    #[error("seed grid is {actual}x{actual}, simulation grid is {expected}x{expected}")]
    SeedSizeMismatch { expected: usize, actual: usize },
}

/// Point-to-point and collective messaging failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommError {
    #[error("process group aborted: {reason}")]
    Aborted { reason: String },

    #[error("lane from rank {source_rank} disconnected")]
    Disconnected { source_rank: Rank },

    #[error("expected {expected} cells from rank {source_rank}, got {actual}")]
    LengthMismatch {
        source_rank: Rank,
        expected: usize,
        actual: usize,
    },
}

/// Top-level error surfaced by a rank or by the whole simulation.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("unable to allocate {cells} cells for {what}")]
    ResourceExhausted { what: &'static str, cells: usize },

    #[error("communication error: {0}")]
    Comm(#[from] CommError),

    #[error("rank {rank} panicked")]
    RankPanicked { rank: Rank },

    #[error("report output failed: {0}")]
    Report(#[from] std::io::Error),
}

impl SimError {
    /// Process exit code for this failure. Success is always 0.
    pub fn exit_code(&self) -> u8 {
        match self {
            SimError::Configuration(_) => 1,
            SimError::ResourceExhausted { .. } => 2,
            _ => 3,
        }
    }

    /// True when this error is the echo of another rank's abort rather
    /// than the original failure.
    pub fn is_abort_echo(&self) -> bool {
        matches!(self, SimError::Comm(CommError::Aborted { .. }))
    }
}

pub type SimResult<T> = Result<T, SimError>;
