//! # grouping-core: simulated-annealing optimizer for student group assignment
//!
//! Places students into groups to maximize satisfied like/dislike
//! preferences while respecting per-group characteristic constraints
//! (`ALL`, `SOME`, `MAX`) and honoring pinned placements the caller has
//! already committed to. The optimizer never moves a pinned student and
//! never mutates the [`models::Project`] it was given — it returns a new,
//! optimized one.
//!
//! ## Quick example
//!
//! ```
//! use grouping_core::models::*;
//! use std::collections::HashMap;
//!
//! let project = Project {
//!     students: vec![
//!         Student { id: 1, name: "Alice".into(), characteristics: HashMap::new(), liked: vec![2], disliked: vec![] },
//!         Student { id: 2, name: "Bob".into(), characteristics: HashMap::new(), liked: vec![1], disliked: vec![] },
//!         Student { id: 3, name: "Cara".into(), characteristics: HashMap::new(), liked: vec![], disliked: vec![1] },
//!         Student { id: 4, name: "Dan".into(), characteristics: HashMap::new(), liked: vec![], disliked: vec![] },
//!     ],
//!     groups: vec![
//!         Group { name: "A".into(), max_size: 2, constraints: vec![], student_ids: vec![], pinned_student_ids: vec![] },
//!         Group { name: "B".into(), max_size: 2, constraints: vec![], student_ids: vec![], pinned_student_ids: vec![] },
//!     ],
//!     weights: Weights::default(),
//!     metadata: HashMap::new(),
//! };
//!
//! let config = OptimizerConfig { max_iterations: 2000, num_restarts: 3, seed: 7, ..Default::default() };
//! let result = grouping_core::optimize(&project, &config, None, None).unwrap();
//! assert_eq!(result.project.students.len(), 4);
//! ```
//!
//! ## Concurrency
//!
//! [`optimize`] is single-threaded and CPU-bound; it does no internal
//! parallelism. A caller that wants to run it off the main thread can do
//! so freely — the RNG is owned by the driver, not global state, so two
//! concurrent calls never interfere. The progress callback runs
//! synchronously on whatever thread called `optimize`, must not assume any
//! particular thread identity, and must not hold a lock the caller also
//! needs while `optimize` is running. [`CancellationFlag`] is the
//! supported way to stop a background run early; it is polled at the same
//! stride as the progress callback, not on every iteration.

pub mod algorithms;
pub mod error;
mod initializer;
pub mod models;
mod neighborhood;
mod rng;
pub mod state;

mod driver;
mod hard_check;

pub use error::OptimizerError;
pub use hard_check::hard_check;
pub use models::{OptimizeResult, OptimizerConfig};

use models::{ProgressCallback, Project};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative stop signal for a running [`optimize`] call.
///
/// Cloning shares the same underlying flag, so a caller can hand one clone
/// to the background thread running `optimize` and keep another to call
/// [`CancellationFlag::cancel`] from, e.g., a UI thread.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        CancellationFlag(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Runs the optimizer to completion and returns the best assignment found.
///
/// See [`models::OptimizerConfig`] for the knobs that control restart
/// count, cooling schedule, and whether every restart's result is kept.
///
/// # Errors
///
/// Returns [`OptimizerError`] if `project` is structurally invalid: a
/// duplicate or unknown student id, a student assigned to more than one
/// group, or a pinned id absent from its own group's membership. Total
/// group capacity falling short of the student count is not an error —
/// the students left over simply stay unassigned. Soft-constraint
/// violations are never an error either — they are scored.
pub fn optimize(
    project: &Project,
    config: &OptimizerConfig,
    progress: Option<ProgressCallback>,
    cancel: Option<CancellationFlag>,
) -> Result<OptimizeResult, OptimizerError> {
    driver::run(project, config, progress, cancel)
}
