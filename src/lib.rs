//! Domain-agnostic Metropolis simulated annealing.
//!
//! Provides a generic annealing engine and a parallel replicate runner:
//!
//! - **Annealing ([`anneal`])**: Metropolis Monte Carlo over a user-defined
//!   [`System`](anneal::System) and its weighted, reversible
//!   [`Move`](anneal::Move)s, under a geometric cooling
//!   [`Schedule`](anneal::Schedule) with plateau-based early stopping and
//!   optional best-state checkpointing.
//! - **Replicates ([`replicate`])**: independent copies of one run fanned
//!   out over a worker pool, each with its own seeded random stream.
//!
//! # Architecture
//!
//! The crate contains no problem-specific concepts. Function minimization,
//! particle systems, tour layouts and the like are defined by consumers as
//! implementations of the `System` and `Move` traits.
//!
//! # Features
//!
//! - `parallel` (default): run replicates on a rayon thread pool.
//! - `serde`: serialize schedules, replicate counts and block records.

pub mod anneal;
pub mod error;
pub mod replicate;

pub use error::{AnnealError, ReplicaError};
