//! Core traits for the annealing engine.

use rand::Rng;

/// An optimization target: a mutable configuration plus its energy.
///
/// The engine minimizes [`energy`](System::energy). For maximization,
/// negate it.
///
/// Two capabilities are optional and are read once, when an
/// [`Annealer`](super::Annealer) is built:
///
/// - **Incremental evaluation**: return `true` from
///   [`uses_energy_delta`](System::uses_energy_delta) and implement
///   [`energy_delta`](System::energy_delta). The engine then evaluates a
///   proposed move without applying it, and applies it only on acceptance.
///   `energy_after == energy_before + delta` must hold for every applied move.
/// - **Checkpointing**: return `true` from
///   [`supports_checkpoint`](System::supports_checkpoint) and implement
///   [`save_state`](System::save_state) /
///   [`restore_saved_state`](System::restore_saved_state). The engine saves
///   the configuration every time a new lowest energy is reached.
///
/// # Examples
///
/// ```
/// use rand::Rng;
/// use u_anneal::anneal::{Move, System};
///
/// #[derive(Clone)]
/// struct Line { x: f64 }
///
/// struct Nudge { dx: f64 }
///
/// impl Move<Line> for Nudge {
///     fn weight(&self) -> f64 { 1.0 }
///     fn propose<R: Rng + ?Sized>(&mut self, _line: &Line, rng: &mut R) {
///         self.dx = rng.random_range(-0.5..0.5);
///     }
///     fn apply(&mut self, line: &mut Line) { line.x += self.dx; }
///     fn revert(&mut self, line: &mut Line) { line.x -= self.dx; }
/// }
///
/// impl System for Line {
///     type Move = Nudge;
///     fn size(&self) -> usize { 1 }
///     fn energy(&self) -> f64 { self.x * self.x }
///     fn moves(&self) -> Vec<Nudge> { vec![Nudge { dx: 0.0 }] }
/// }
/// ```
pub trait System {
    /// Move type that perturbs this system.
    ///
    /// Systems with several kinds of moves typically use an enum.
    type Move: Move<Self>;

    /// Scale of the configuration. One cycle is `size()` steps.
    fn size(&self) -> usize;

    /// Total energy of the current configuration. Lower is better.
    ///
    /// Must be finite; infeasible configurations may use a large sentinel.
    fn energy(&self) -> f64;

    /// The moves available to perturb this system, in a fixed order.
    ///
    /// Called once per engine. Move weights are read at that point.
    fn moves(&self) -> Vec<Self::Move>;

    /// Whether the engine should evaluate moves through
    /// [`energy_delta`](System::energy_delta).
    fn uses_energy_delta(&self) -> bool {
        false
    }

    /// Energy change the proposed (not yet applied) move would cause.
    fn energy_delta(&self, _mv: &Self::Move) -> Option<f64> {
        None
    }

    /// Whether [`save_state`](System::save_state) and
    /// [`restore_saved_state`](System::restore_saved_state) are implemented.
    fn supports_checkpoint(&self) -> bool {
        false
    }

    /// Snapshots the current configuration as the best one seen.
    fn save_state(&mut self) {}

    /// Overwrites the current configuration with the last snapshot.
    fn restore_saved_state(&mut self) {}
}

/// A reversible local perturbation of a [`System`].
///
/// The engine drives a move through `propose` → (`apply` → `revert`?) per
/// step. `apply` and `revert` are only called after `propose`, and `revert`
/// only after `apply`, so a move can keep whatever it needs to undo itself.
pub trait Move<S: ?Sized> {
    /// Relative selection frequency. Non-negative; need not be normalized.
    fn weight(&self) -> f64;

    /// Samples the parameters of the next perturbation.
    fn propose<R: Rng + ?Sized>(&mut self, system: &S, rng: &mut R);

    /// Realizes the proposed perturbation on the system.
    fn apply(&mut self, system: &mut S);

    /// Undoes the last [`apply`](Move::apply).
    fn revert(&mut self, system: &mut S);
}
