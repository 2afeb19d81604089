//! Temperature-based local search over student-to-group assignments.
//!
//! The cooling schedule is a plain geometric decay, `T *= cooling_rate`
//! each iteration, with an occasional reheat when the search has gone too
//! long without finding a new best — a cheap way to kick a run out of a
//! local optimum without restarting it outright. Candidate moves mutate
//! the state in place and are rolled back on rejection instead of being
//! evaluated against a cloned copy; the only snapshot this algorithm ever
//! takes is the assignment of the best state seen, and only when a new
//! best is actually found.

use rand::Rng;

use crate::algorithms::{Algorithm, RunOutcome};
use crate::models::{OptimizerConfig, ProgressCallback, ProgressUpdate};
use crate::neighborhood;
use crate::state::State;
use crate::CancellationFlag;

pub struct SimulatedAnnealing {
    initial_temp: f64,
    cooling_rate: f64,
    min_temp: f64,
    max_iterations: u64,
    reheat_after_no_improvement: u64,
    progress_stride: u64,
    seed: u64,
}

impl SimulatedAnnealing {
    pub fn new(config: &OptimizerConfig, seed: u64) -> Self {
        SimulatedAnnealing {
            initial_temp: config.initial_temp,
            cooling_rate: config.cooling_rate,
            min_temp: config.min_temp,
            max_iterations: config.max_iterations,
            reheat_after_no_improvement: config.reheat_after_no_improvement,
            progress_stride: config.progress_stride.max(1),
            seed,
        }
    }
}

impl Algorithm for SimulatedAnnealing {
    fn run(
        &self,
        state: &mut State,
        restart: usize,
        num_restarts: usize,
        mut progress: Option<&mut ProgressCallback>,
        cancel: Option<&CancellationFlag>,
    ) -> RunOutcome {
        let mut rng = crate::rng::from_seed(self.seed);

        log::info!(
            "restart {}/{}: starting from score {:.3}",
            restart + 1,
            num_restarts,
            state.total_score()
        );

        if state.movable_students().is_empty() {
            // Empty search space: one no-op iteration and one progress
            // event, matching a normal restart's shape without pretending
            // any searching happened.
            if let Some(cb) = progress.as_deref_mut() {
                cb(&ProgressUpdate {
                    iteration: 0,
                    temperature: self.initial_temp,
                    best_score: state.total_score(),
                    restart,
                    num_restarts,
                });
            }
            return RunOutcome {
                iterations_run: 0,
                cancelled: false,
            };
        }

        let mut temperature = self.initial_temp;
        let mut current_score = state.total_score();
        let mut best_score = current_score;
        let mut best_snapshot = state.snapshot_assignment();
        let mut no_improvement: u64 = 0;
        let mut iteration: u64 = 0;
        let mut cancelled = false;

        while temperature > self.min_temp && iteration < self.max_iterations {
            if no_improvement >= self.reheat_after_no_improvement {
                temperature = (temperature * 4.0).min(self.initial_temp * 0.6);
                no_improvement = 0;
                log::debug!(
                    "restart {restart}: reheating to {temperature:.3} at iteration {iteration}"
                );
            }

            match neighborhood::propose(state, &mut rng) {
                Some((proposal, origin)) => {
                    let delta = proposal.apply(state);
                    let accept = delta > 0.0 || rng.random::<f64>() < (delta / temperature).exp();
                    if accept {
                        current_score += delta;
                    } else {
                        proposal.undo(state, origin);
                    }
                }
                None => break,
            }

            if current_score > best_score {
                best_score = current_score;
                best_snapshot = state.snapshot_assignment();
                no_improvement = 0;
            } else {
                no_improvement += 1;
            }

            temperature *= self.cooling_rate;
            iteration += 1;

            if iteration % self.progress_stride == 0 {
                if let Some(cb) = progress.as_deref_mut() {
                    cb(&ProgressUpdate {
                        iteration,
                        temperature,
                        best_score,
                        restart,
                        num_restarts,
                    });
                }
                if let Some(flag) = cancel {
                    if flag.is_cancelled() {
                        cancelled = true;
                        break;
                    }
                }
            }
        }

        // Restore the best assignment seen and do one full rescore to
        // correct whatever drift the incremental deltas accumulated, so
        // the score we report matches a from-scratch evaluation exactly.
        state.restore_assignment(&best_snapshot);

        log::info!(
            "restart {}/{}: finished after {} iterations at score {:.3}{}",
            restart + 1,
            num_restarts,
            iteration,
            state.total_score(),
            if cancelled { " (cancelled)" } else { "" }
        );

        if let Some(cb) = progress.as_deref_mut() {
            cb(&ProgressUpdate {
                iteration,
                temperature,
                best_score: state.total_score(),
                restart,
                num_restarts,
            });
        }

        RunOutcome {
            iterations_run: iteration,
            cancelled,
        }
    }
}
