//! Independent parallel replicates of one annealing run.
//!
//! A single anneal can settle in a poor local optimum. [`Replicator`] runs
//! several independent copies of the same system and schedule, each with
//! its own random stream, on a worker pool, and hands every finished system
//! back to the caller for best-of-N selection.
//!
//! Replicates share nothing while running: there is no exchange between
//! them (this is not parallel tempering). Without the `parallel` feature the
//! replicates run one after another on the calling thread.

mod config;
mod runner;

pub use config::{available_units, ReplicaCount, AUTO_FRACTION};
pub use runner::{ReplicateRun, Replicator};
