//! Error types for the annealing engine and the replicate orchestrator.

use thiserror::Error;

/// Errors raised while building or running an [`Annealer`](crate::anneal::Annealer).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnnealError {
    /// The cooling schedule violates one of its invariants.
    #[error("invalid schedule: {0}")]
    InvalidSchedule(String),

    /// The system reported a size of zero.
    #[error("system size must be positive")]
    EmptySystem,

    /// The system exposes no moves to sample from.
    #[error("system exposes no moves")]
    NoMoves,

    /// A move reported a negative or non-finite weight.
    #[error("move {index} has invalid weight {weight}")]
    InvalidWeight {
        /// Position of the move in the system's move list.
        index: usize,
        /// The offending weight.
        weight: f64,
    },

    /// Every move weight is zero, so no distribution can be formed.
    #[error("move weights sum to zero")]
    ZeroWeightSum,

    /// The system advertises incremental evaluation but produced no delta.
    #[error("system advertises incremental energy but returned no delta")]
    MissingEnergyDelta,

    /// The system produced a NaN or infinite energy (or energy delta).
    #[error("non-finite energy {energy} at temperature {temperature}")]
    NonFiniteEnergy {
        /// The value returned by the system.
        energy: f64,
        /// Temperature at which it was observed.
        temperature: f64,
    },

    /// The requested replicate count resolves to nothing usable.
    #[error("invalid replica count: {0}")]
    InvalidReplicaCount(String),

    /// The worker pool for replicates could not be created.
    #[error("failed to build worker pool: {0}")]
    WorkerPool(String),
}

/// Failure of a single replicate inside a [`Replicator`](crate::replicate::Replicator) run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReplicaError {
    /// The replicate's engine returned an error.
    #[error("replicate {index} failed: {source}")]
    Anneal {
        /// Replicate number.
        index: usize,
        /// Underlying engine error.
        #[source]
        source: AnnealError,
    },

    /// The replicate's worker panicked.
    #[error("replicate {index} panicked: {message}")]
    Panicked {
        /// Replicate number.
        index: usize,
        /// Panic payload, when it was a string.
        message: String,
    },
}

impl ReplicaError {
    /// Replicate number this error belongs to.
    pub fn index(&self) -> usize {
        match self {
            ReplicaError::Anneal { index, .. } | ReplicaError::Panicked { index, .. } => *index,
        }
    }
}
