//! Per-block history and plateau detection for early stopping.

use std::collections::VecDeque;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Temperature and best energy recorded at the end of one block.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BlockRecord {
    /// Temperature the block ran at.
    pub temperature: f64,
    /// Lowest energy seen up to the end of the block.
    pub best_energy: f64,
}

/// Trailing window of [`BlockRecord`]s.
///
/// Only the last `window + 1` records matter for the plateau test, so older
/// ones are dropped.
#[derive(Debug, Clone)]
pub struct BlockHistory {
    window: usize,
    records: VecDeque<BlockRecord>,
}

impl BlockHistory {
    pub fn new(window: usize) -> Self {
        Self {
            window,
            records: VecDeque::with_capacity(window + 1),
        }
    }

    /// Appends the record of a finished block.
    pub fn record(&mut self, temperature: f64, best_energy: f64) {
        if self.records.len() > self.window {
            self.records.pop_front();
        }
        self.records.push_back(BlockRecord {
            temperature,
            best_energy,
        });
    }

    /// Whether the recorded blocks show a plateau.
    ///
    /// Needs more than `window` recorded blocks. The latest best energy is
    /// compared with each of the `window` records before it; the run has
    /// plateaued when every absolute difference is `<= threshold`.
    pub fn plateaued(&self, threshold: f64) -> bool {
        if self.records.len() <= self.window {
            return false;
        }
        let Some(latest) = self.records.back() else {
            return false;
        };
        self.records
            .iter()
            .rev()
            .skip(1)
            .take(self.window)
            .all(|r| (latest.best_energy - r.best_energy).abs() <= threshold)
    }

    /// The most recent record.
    pub fn latest(&self) -> Option<&BlockRecord> {
        self.records.back()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
