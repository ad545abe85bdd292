//! Weighted move selection.

use crate::error::AnnealError;

/// Discrete inverse-CDF sampler over move weights.
///
/// Built once per engine: weights are normalized by their sum and
/// accumulated. [`select`](MoveSelector::select) maps a uniform draw in
/// `[0, 1)` to the first move whose cumulative probability is `>=` the draw.
/// Zero-weight moves are never selected.
#[derive(Debug, Clone)]
pub struct MoveSelector {
    /// Ascending cumulative probabilities of the positive-weight moves.
    cumulative: Vec<f64>,
    /// Move index for each entry of `cumulative`.
    indices: Vec<usize>,
    /// Normalized probability of every move, zero-weight ones included.
    probabilities: Vec<f64>,
}

impl MoveSelector {
    /// Builds the sampler from raw (unnormalized) weights.
    pub fn from_weights(weights: &[f64]) -> Result<Self, AnnealError> {
        if weights.is_empty() {
            return Err(AnnealError::NoMoves);
        }
        for (index, &weight) in weights.iter().enumerate() {
            if !weight.is_finite() || weight < 0.0 {
                return Err(AnnealError::InvalidWeight { index, weight });
            }
        }
        // Scale by the largest weight first so the sum cannot overflow.
        let max = weights.iter().copied().fold(0.0, f64::max);
        if max <= 0.0 {
            return Err(AnnealError::ZeroWeightSum);
        }
        let scaled: Vec<f64> = weights.iter().map(|w| w / max).collect();
        let total: f64 = scaled.iter().sum();

        let probabilities: Vec<f64> = scaled.iter().map(|w| w / total).collect();

        let mut cumulative = Vec::with_capacity(weights.len());
        let mut indices = Vec::with_capacity(weights.len());
        let mut acc = 0.0;
        for (index, &p) in probabilities.iter().enumerate() {
            if p > 0.0 {
                acc += p;
                cumulative.push(acc);
                indices.push(index);
            }
        }
        // Rounding can leave the last entry just under 1.
        match cumulative.last_mut() {
            Some(last) => *last = 1.0,
            None => return Err(AnnealError::ZeroWeightSum),
        }

        Ok(Self {
            cumulative,
            indices,
            probabilities,
        })
    }

    /// Returns the move index for a uniform draw in `[0, 1)`.
    pub fn select(&self, draw: f64) -> usize {
        let pos = self
            .cumulative
            .partition_point(|&p| p < draw)
            .min(self.cumulative.len() - 1);
        self.indices[pos]
    }

    /// Normalized selection probability of each move.
    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    /// Number of moves the sampler was built from.
    pub fn len(&self) -> usize {
        self.probabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probabilities.is_empty()
    }
}
