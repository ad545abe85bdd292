//! Metropolis simulated annealing over pluggable systems and moves.
//!
//! A [`System`] holds a mutable configuration and its energy; its [`Move`]s
//! are reversible local perturbations chosen with probability proportional
//! to their weights. The [`Annealer`] runs blocks of `size * cycles_per_block`
//! Metropolis steps at geometrically decreasing temperatures (see
//! [`Schedule`]), tracks the lowest energy seen, and stops when the schedule
//! is exhausted or the best energy has plateaued.
//!
//! Energy changes are obtained either by full recomputation (apply, evaluate,
//! revert on rejection) or, for systems that opt in, by an incremental delta
//! evaluated before the move is applied. Both paths consume the random
//! stream identically and produce the same trajectory.
//!
//! # References
//!
//! - Metropolis et al. (1953), "Equation of State Calculations by Fast
//!   Computing Machines"
//! - Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"

mod config;
mod history;
mod runner;
mod select;
mod types;

pub use config::{Schedule, Temperatures};
pub use history::{BlockHistory, BlockRecord};
pub use runner::{metropolis, AnnealResult, Annealer};
pub use select::MoveSelector;
pub use types::{Move, System};
