//! Annealing execution loop.
//!
//! [`Annealer`] owns one system, its moves and a random stream, and runs
//! Metropolis blocks at geometrically decreasing temperatures:
//! initialize → (block → record → cool → early-stop check)* → done.

use super::config::Schedule;
use super::history::{BlockHistory, BlockRecord};
use super::select::MoveSelector;
use super::types::{Move, System};
use crate::error::AnnealError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

/// Result of an annealing run.
#[derive(Debug, Clone)]
pub struct AnnealResult<S> {
    /// The system, in the configuration reached at the end of the last block.
    pub system: S,

    /// Energy of the final configuration.
    pub final_energy: f64,

    /// Lowest energy seen during the run.
    pub best_energy: f64,

    /// Number of blocks executed.
    pub blocks: usize,

    /// Total number of steps (proposed moves).
    pub steps: usize,

    /// Number of accepted moves.
    pub accepted_moves: usize,

    /// Temperature the next block would have run at.
    pub final_temperature: f64,

    /// Whether the run ended because the best energy plateaued.
    pub stopped_early: bool,

    /// Whether the system checkpointed its best configuration.
    pub best_tracked: bool,

    /// Temperature and best energy at the end of every block.
    pub trace: Vec<BlockRecord>,
}

impl<S: System> AnnealResult<S> {
    /// Returns the system in its best configuration.
    ///
    /// Restores the checkpoint when the system supports checkpointing;
    /// otherwise the final configuration is returned unchanged.
    pub fn into_best(mut self) -> S {
        if self.best_tracked {
            self.system.restore_saved_state();
        }
        self.system
    }

    /// Fraction of proposed moves that were accepted.
    pub fn acceptance_ratio(&self) -> f64 {
        if self.steps == 0 {
            0.0
        } else {
            self.accepted_moves as f64 / self.steps as f64
        }
    }
}

/// Metropolis acceptance rule for a uniform draw in `[0, 1)`.
///
/// Downhill and neutral moves (`delta <= 0`) are always accepted. Uphill
/// moves are accepted iff `draw <= exp(-delta / temperature)`.
pub fn metropolis(delta: f64, temperature: f64, draw: f64) -> bool {
    delta <= 0.0 || draw <= (-delta / temperature).exp()
}

/// Applies [`metropolis`], drawing from `rng` only for uphill moves.
fn decide<R: Rng>(delta: f64, temperature: f64, rng: &mut R) -> bool {
    if delta <= 0.0 {
        return true;
    }
    metropolis(delta, temperature, rng.random::<f64>())
}

fn check_finite(energy: f64, temperature: f64) -> Result<f64, AnnealError> {
    if energy.is_finite() {
        Ok(energy)
    } else {
        Err(AnnealError::NonFiniteEnergy {
            energy,
            temperature,
        })
    }
}

/// How the energy change of a step is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EnergyStrategy {
    /// Apply, recompute the full energy, revert on rejection.
    Recompute,
    /// Ask the system for the delta, apply only on acceptance.
    Delta,
}

/// Single-threaded simulated annealing engine.
///
/// # Usage
///
/// ```ignore
/// let schedule = Schedule::default().with_cycles_per_block(50);
/// let result = Annealer::with_seed(system, schedule, 42)?.anneal()?;
/// let best = result.into_best();
/// ```
pub struct Annealer<S: System, R = StdRng> {
    system: S,
    moves: Vec<S::Move>,
    selector: MoveSelector,
    schedule: Schedule,
    rng: R,
    size: usize,
    strategy: EnergyStrategy,
    checkpointing: bool,
    best_energy: f64,
    history: BlockHistory,
    trace: Vec<BlockRecord>,
    steps: usize,
    accepted: usize,
}

impl<S: System> Annealer<S, StdRng> {
    /// Creates an engine with an entropy-seeded random stream.
    pub fn new(system: S, schedule: Schedule) -> Result<Self, AnnealError> {
        Self::with_seed(system, schedule, rand::random())
    }

    /// Creates an engine whose random stream is seeded with `seed`.
    pub fn with_seed(system: S, schedule: Schedule, seed: u64) -> Result<Self, AnnealError> {
        Self::with_rng(system, schedule, StdRng::seed_from_u64(seed))
    }
}

impl<S: System, R: Rng> Annealer<S, R> {
    /// Creates an engine driven by the given random stream.
    ///
    /// Fails if the schedule is invalid, the system is empty, it exposes no
    /// moves, or the move weights cannot form a distribution.
    pub fn with_rng(system: S, schedule: Schedule, rng: R) -> Result<Self, AnnealError> {
        schedule.validate()?;

        let size = system.size();
        if size == 0 {
            return Err(AnnealError::EmptySystem);
        }

        let moves = system.moves();
        let weights: Vec<f64> = moves.iter().map(|m| m.weight()).collect();
        let selector = MoveSelector::from_weights(&weights)?;

        let strategy = if system.uses_energy_delta() {
            EnergyStrategy::Delta
        } else {
            EnergyStrategy::Recompute
        };
        let checkpointing = system.supports_checkpoint();
        if !checkpointing {
            debug!("system has no checkpoint support, best state will not be tracked");
        }

        Ok(Self {
            system,
            moves,
            selector,
            schedule,
            rng,
            size,
            strategy,
            checkpointing,
            best_energy: f64::INFINITY,
            history: BlockHistory::new(schedule.stop_window),
            trace: Vec::new(),
            steps: 0,
            accepted: 0,
        })
    }

    pub fn system(&self) -> &S {
        &self.system
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Lowest energy seen so far.
    pub fn best_energy(&self) -> f64 {
        self.best_energy
    }

    /// Whether the best configuration is checkpointed during the run.
    pub fn tracks_best(&self) -> bool {
        self.checkpointing
    }

    /// Whether steps use the system's incremental energy delta.
    pub fn uses_energy_delta(&self) -> bool {
        self.strategy == EnergyStrategy::Delta
    }

    /// Steps per block: `size * cycles_per_block`.
    pub fn steps_per_block(&self) -> usize {
        self.size * self.schedule.cycles_per_block
    }

    /// Runs one Metropolis step at `temperature` from current energy `energy`.
    ///
    /// Returns the energy after the step. On rejection the system is left
    /// exactly as it was.
    pub fn step(&mut self, temperature: f64, energy: f64) -> Result<f64, AnnealError> {
        let index = self.selector.select(self.rng.random::<f64>());
        let mv = &mut self.moves[index];
        mv.propose(&self.system, &mut self.rng);
        self.steps += 1;

        let accepted = match self.strategy {
            EnergyStrategy::Delta => {
                let delta = self
                    .system
                    .energy_delta(mv)
                    .ok_or(AnnealError::MissingEnergyDelta)?;
                check_finite(delta, temperature)?;
                if decide(delta, temperature, &mut self.rng) {
                    mv.apply(&mut self.system);
                    Some(energy + delta)
                } else {
                    None
                }
            }
            EnergyStrategy::Recompute => {
                mv.apply(&mut self.system);
                let proposed = self.system.energy();
                if let Err(err) = check_finite(proposed, temperature) {
                    mv.revert(&mut self.system);
                    return Err(err);
                }
                if decide(proposed - energy, temperature, &mut self.rng) {
                    Some(proposed)
                } else {
                    mv.revert(&mut self.system);
                    None
                }
            }
        };

        match accepted {
            Some(next) => {
                self.accepted += 1;
                Ok(next)
            }
            None => Ok(energy),
        }
    }

    /// Runs `steps` steps at a fixed temperature, tracking the best energy.
    pub fn block(
        &mut self,
        steps: usize,
        temperature: f64,
        mut energy: f64,
    ) -> Result<f64, AnnealError> {
        for _ in 0..steps {
            energy = self.step(temperature, energy)?;
            if energy < self.best_energy {
                self.best_energy = energy;
                if self.checkpointing {
                    self.system.save_state();
                }
            }
        }
        Ok(energy)
    }

    /// Runs the full schedule with an exact-repeat early-stop test.
    pub fn anneal(self) -> Result<AnnealResult<S>, AnnealError> {
        self.anneal_with_threshold(0.0)
    }

    /// Runs the full schedule.
    ///
    /// Stops once the best energy has changed by at most `threshold` over the
    /// last `stop_window` blocks, or when the temperature drops below the
    /// schedule's final temperature.
    pub fn anneal_with_threshold(mut self, threshold: f64) -> Result<AnnealResult<S>, AnnealError> {
        let mut energy = check_finite(self.system.energy(), self.schedule.initial_temperature)?;
        self.best_energy = energy;
        if self.checkpointing {
            self.system.save_state();
        }

        let steps = self.steps_per_block();
        info!(
            initial_energy = energy,
            steps_per_block = steps,
            block_limit = self.schedule.block_limit(),
            incremental = self.uses_energy_delta(),
            "anneal start"
        );

        let mut temperatures = self.schedule.temperatures();
        let mut blocks = 0usize;
        let mut stopped_early = false;

        for temperature in temperatures.by_ref() {
            let accepted_before = self.accepted;
            energy = self.block(steps, temperature, energy)?;
            blocks += 1;

            self.history.record(temperature, self.best_energy);
            self.trace.push(BlockRecord {
                temperature,
                best_energy: self.best_energy,
            });
            debug!(
                block = blocks,
                temperature,
                energy,
                best_energy = self.best_energy,
                acceptance = (self.accepted - accepted_before) as f64 / steps as f64,
                "block finished"
            );

            if self.history.plateaued(threshold) {
                info!(
                    blocks,
                    window = self.schedule.stop_window,
                    threshold,
                    "anneal stopping: best energy flat over window"
                );
                stopped_early = true;
                break;
            }
        }

        let final_temperature = temperatures.remaining();
        info!(
            blocks,
            final_energy = energy,
            best_energy = self.best_energy,
            stopped_early,
            "anneal finish"
        );

        Ok(AnnealResult {
            system: self.system,
            final_energy: energy,
            best_energy: self.best_energy,
            blocks,
            steps: self.steps,
            accepted_moves: self.accepted,
            final_temperature,
            stopped_early,
            best_tracked: self.checkpointing,
            trace: self.trace,
        })
    }
}
