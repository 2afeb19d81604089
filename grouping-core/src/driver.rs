//! Multi-restart wrapper around the annealer.
//!
//! Runs [`OptimizerConfig::num_restarts`] independent searches and keeps the
//! best, diversifying the early restarts with independent greedy seeds and
//! then, from the halfway point on, rebasing each new restart onto the
//! best assignment found so far instead of reseeding from scratch — a
//! cheap way to spend the back half of the restart budget refining a known
//! good basin instead of re-exploring from zero every time.

use crate::algorithms::{Algorithm, RunOutcome};
use crate::error::OptimizerError;
use crate::initializer;
use crate::models::{OptimizeResult, OptimizerConfig, ProgressCallback, Project, RestartOutcome};
use crate::rng;
use crate::state::State;
use crate::CancellationFlag;

pub(crate) fn run(
    project: &Project,
    config: &OptimizerConfig,
    mut progress: Option<ProgressCallback>,
    cancel: Option<CancellationFlag>,
) -> Result<OptimizeResult, OptimizerError> {
    // Validate once up front so a malformed project fails before any
    // restart does redundant work.
    State::new(project)?;

    let num_restarts = config.num_restarts.max(1);
    let rebase_from = num_restarts / 2;

    let mut best_project: Option<Project> = None;
    let mut best_score = f64::NEG_INFINITY;
    let mut all_results = Vec::with_capacity(if config.return_all_results {
        num_restarts
    } else {
        0
    });
    let mut cancelled = false;

    for restart in 0..num_restarts {
        let restart_seed = rng::sub_seed(config.seed, restart);
        let mut state = if restart >= rebase_from && best_project.is_some() {
            log::info!("restart {}: rebasing onto best result so far", restart);
            State::new(best_project.as_ref().unwrap())?
        } else if restart == 0 && config.use_current_assignment {
            State::new(project)?
        } else {
            let mut s = State::new(project)?;
            s.unassign_movable();
            let mut init_rng = rng::from_seed(restart_seed);
            initializer::seed(&mut s, &mut init_rng);
            s
        };

        let annealer_seed = rng::sub_seed(restart_seed, 1);
        let annealer = crate::algorithms::simulated_annealing::SimulatedAnnealing::new(
            config,
            annealer_seed,
        );

        let RunOutcome {
            cancelled: this_cancelled,
            ..
        } = annealer.run(
            &mut state,
            restart,
            num_restarts,
            progress.as_mut(),
            cancel.as_ref(),
        );

        let score = state.total_score();
        let restart_project = state.to_project(project);

        if config.return_all_results {
            all_results.push(RestartOutcome {
                restart,
                score,
                project: restart_project.clone(),
            });
        }

        if score > best_score {
            best_score = score;
            best_project = Some(restart_project);
        }

        if this_cancelled {
            cancelled = true;
            break;
        }
    }

    let final_project = best_project.ok_or_else(|| {
        OptimizerError::InvalidProject("no restart produced a result".to_string())
    })?;
    let final_state = State::new(&final_project)?;

    if config.return_all_results {
        all_results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap());
    }

    Ok(OptimizeResult {
        project: final_project,
        score: final_state.score_report(),
        all_results,
        cancelled,
    })
}
