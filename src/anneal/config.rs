//! Annealing schedule: geometric cooling parameters.

use crate::error::AnnealError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Geometric cooling schedule.
///
/// Blocks run at `T_0 = initial_temperature`, `T_{k+1} = decay * T_k`, for as
/// long as `T_k >= final_temperature`. Each block is
/// `system.size() * cycles_per_block` steps. The run stops early once the
/// best energy has been flat over `stop_window` consecutive blocks.
///
/// # Examples
///
/// ```
/// use u_anneal::anneal::Schedule;
///
/// let schedule = Schedule::default()
///     .with_initial_temperature(10.0)
///     .with_final_temperature(0.001)
///     .with_decay(0.96)
///     .with_cycles_per_block(200)
///     .with_stop_window(25);
/// assert!(schedule.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Schedule {
    /// Temperature of the first block.
    pub initial_temperature: f64,

    /// Blocks run while the temperature is at or above this value.
    pub final_temperature: f64,

    /// Factor applied to the temperature after every block, in (0, 1).
    pub decay: f64,

    /// Cycles per block. One cycle is `system.size()` steps.
    pub cycles_per_block: usize,

    /// Number of trailing blocks over which a flat best energy stops the run.
    pub stop_window: usize,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            initial_temperature: 100.0,
            final_temperature: 0.01,
            decay: 0.95,
            cycles_per_block: 100,
            stop_window: 25,
        }
    }
}

impl Schedule {
    pub fn with_initial_temperature(mut self, t: f64) -> Self {
        self.initial_temperature = t;
        self
    }

    pub fn with_final_temperature(mut self, t: f64) -> Self {
        self.final_temperature = t;
        self
    }

    pub fn with_decay(mut self, decay: f64) -> Self {
        self.decay = decay;
        self
    }

    pub fn with_cycles_per_block(mut self, n: usize) -> Self {
        self.cycles_per_block = n;
        self
    }

    pub fn with_stop_window(mut self, n: usize) -> Self {
        self.stop_window = n;
        self
    }

    /// Validates the schedule.
    pub fn validate(&self) -> Result<(), AnnealError> {
        let invalid = |msg: String| Err(AnnealError::InvalidSchedule(msg));

        if !self.final_temperature.is_finite() || self.final_temperature <= 0.0 {
            return invalid(format!(
                "final_temperature must be positive, got {}",
                self.final_temperature
            ));
        }
        if !self.initial_temperature.is_finite()
            || self.initial_temperature <= self.final_temperature
        {
            return invalid(format!(
                "initial_temperature must exceed final_temperature, got {} <= {}",
                self.initial_temperature, self.final_temperature
            ));
        }
        if !(self.decay > 0.0 && self.decay < 1.0) {
            return invalid(format!("decay must be in (0, 1), got {}", self.decay));
        }
        if self.cycles_per_block == 0 {
            return invalid("cycles_per_block must be at least 1".into());
        }
        if self.stop_window == 0 {
            return invalid("stop_window must be at least 1".into());
        }
        Ok(())
    }

    /// The block temperatures, in the order the engine visits them.
    pub fn temperatures(&self) -> Temperatures {
        Temperatures {
            next: self.initial_temperature,
            floor: self.final_temperature,
            decay: self.decay,
        }
    }

    /// Number of blocks a run without early stop executes.
    pub fn block_limit(&self) -> usize {
        self.temperatures().count()
    }
}

/// Iterator over block temperatures of a [`Schedule`].
///
/// Yields `T_0, decay * T_0, ...` while the value is `>= final_temperature`.
/// Use [`Temperatures::remaining`] to read the temperature the loop stopped at.
#[derive(Debug, Clone)]
pub struct Temperatures {
    next: f64,
    floor: f64,
    decay: f64,
}

impl Temperatures {
    /// Temperature that the next block would run at.
    pub fn remaining(&self) -> f64 {
        self.next
    }
}

impl Iterator for Temperatures {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        // Guard against a decay that cannot terminate.
        let terminates = self.floor > 0.0 && self.decay < 1.0;
        if !terminates || self.next.is_nan() || self.next < self.floor {
            return None;
        }
        let current = self.next;
        self.next *= self.decay;
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_schedule() {
        let s = Schedule::default();
        assert!((s.initial_temperature - 100.0).abs() < 1e-12);
        assert!((s.final_temperature - 0.01).abs() < 1e-12);
        assert!((s.decay - 0.95).abs() < 1e-12);
        assert_eq!(s.cycles_per_block, 100);
        assert_eq!(s.stop_window, 25);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_builder_sets_fields() {
        let s = Schedule::default()
            .with_initial_temperature(10.0)
            .with_final_temperature(1.0)
            .with_decay(0.9)
            .with_cycles_per_block(10)
            .with_stop_window(5);
        assert_eq!(
            s,
            Schedule {
                initial_temperature: 10.0,
                final_temperature: 1.0,
                decay: 0.9,
                cycles_per_block: 10,
                stop_window: 5,
            }
        );
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let base = Schedule::default();
        assert!(base.with_final_temperature(0.0).validate().is_err());
        assert!(base.with_final_temperature(-1.0).validate().is_err());
        assert!(base
            .with_initial_temperature(0.01)
            .with_final_temperature(0.01)
            .validate()
            .is_err());
        assert!(base.with_initial_temperature(f64::NAN).validate().is_err());
        assert!(base.with_decay(1.0).validate().is_err());
        assert!(base.with_decay(0.0).validate().is_err());
        assert!(base.with_decay(f64::NAN).validate().is_err());
        assert!(base.with_cycles_per_block(0).validate().is_err());
        assert!(base.with_stop_window(0).validate().is_err());
    }

    #[test]
    fn test_temperatures_halving() {
        let s = Schedule::default()
            .with_initial_temperature(1.0)
            .with_final_temperature(0.2)
            .with_decay(0.5);
        let temps: Vec<f64> = s.temperatures().collect();
        assert_eq!(temps, vec![1.0, 0.5, 0.25]);
        assert_eq!(s.block_limit(), 3);

        let mut it = s.temperatures();
        for _ in it.by_ref() {}
        assert!((it.remaining() - 0.125).abs() < 1e-15);
    }

    #[test]
    fn test_temperatures_include_final_when_hit_exactly() {
        let s = Schedule::default()
            .with_initial_temperature(1.0)
            .with_final_temperature(0.25)
            .with_decay(0.5);
        assert_eq!(s.block_limit(), 3);
    }

    proptest! {
        #[test]
        fn prop_temperatures_strictly_decrease_and_are_bounded(
            ti in 1e-3f64..1e3,
            ratio in 1.5f64..1e5,
            decay in 0.3f64..0.98,
        ) {
            let s = Schedule::default()
                .with_initial_temperature(ti)
                .with_final_temperature(ti / ratio)
                .with_decay(decay);
            prop_assert!(s.validate().is_ok());

            let temps: Vec<f64> = s.temperatures().collect();
            prop_assert!(!temps.is_empty());
            prop_assert!((temps[0] - ti).abs() < 1e-12 * ti);
            for w in temps.windows(2) {
                prop_assert!(w[1] < w[0]);
                prop_assert!((w[1] - w[0] * decay).abs() <= 1e-12 * w[0]);
            }
            for &t in &temps {
                prop_assert!(t >= s.final_temperature);
            }

            let bound = ((1.0 / ratio).ln() / decay.ln()).ceil() + 1.0;
            prop_assert!(temps.len() as f64 <= bound);
        }
    }
}
