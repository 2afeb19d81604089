//! Optimization algorithms that operate on a [`crate::state::State`].
//!
//! A single implementation — [`simulated_annealing::SimulatedAnnealing`] —
//! ships today, but the trait seam is kept separate from the driver so a
//! second algorithm (e.g. plain hill-climbing for small projects) can be
//! added without touching [`crate::driver`].

pub mod simulated_annealing;

use crate::models::ProgressCallback;
use crate::state::State;
use crate::CancellationFlag;

/// One run of an optimization algorithm against an already-seeded state.
pub trait Algorithm {
    /// Runs to completion (or until cancelled), mutating `state` in place
    /// and leaving it positioned at the best assignment found.
    ///
    /// `restart` and `num_restarts` are only used to label progress events;
    /// the algorithm itself has no notion of restarting.
    fn run(
        &self,
        state: &mut State,
        restart: usize,
        num_restarts: usize,
        progress: Option<&mut ProgressCallback>,
        cancel: Option<&CancellationFlag>,
    ) -> RunOutcome;
}

/// What happened during one [`Algorithm::run`] call.
pub struct RunOutcome {
    pub iterations_run: u64,
    pub cancelled: bool,
}
