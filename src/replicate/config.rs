//! Replicate count resolution.

use crate::error::AnnealError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Share of the available parallelism used by [`ReplicaCount::Auto`].
pub const AUTO_FRACTION: f64 = 0.85;

/// How many independent replicates to run.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ReplicaCount {
    /// 85% of the available execution units, rounded down, at least one.
    #[default]
    Auto,

    /// Exactly this many replicates.
    Fixed(usize),

    /// This multiple of the available execution units, rounded down, at
    /// least one.
    Fraction(f64),
}

impl ReplicaCount {
    /// Resolves the count against `units` available execution units.
    pub fn resolve(self, units: usize) -> Result<usize, AnnealError> {
        let units = units.max(1);
        match self {
            ReplicaCount::Auto => Ok(scaled(AUTO_FRACTION, units)),
            ReplicaCount::Fixed(0) => Err(AnnealError::InvalidReplicaCount(
                "fixed replica count must be at least 1".into(),
            )),
            ReplicaCount::Fixed(n) => Ok(n),
            ReplicaCount::Fraction(f) if f.is_finite() && f > 0.0 => Ok(scaled(f, units)),
            ReplicaCount::Fraction(f) => Err(AnnealError::InvalidReplicaCount(format!(
                "fraction must be positive, got {f}"
            ))),
        }
    }

    /// Resolves the count against this machine's available parallelism.
    pub fn resolve_here(self) -> Result<usize, AnnealError> {
        self.resolve(available_units())
    }
}

fn scaled(fraction: f64, units: usize) -> usize {
    ((fraction * units as f64).floor() as usize).max(1)
}

/// Number of execution units available to this process.
pub fn available_units() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
