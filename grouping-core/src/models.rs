//! Data model for the grouping problem: students, groups, constraints and
//! the weights that drive the scoring function.
//!
//! These types are the JSON interchange format as well as the in-memory
//! representation the public API accepts and returns. The internal solver
//! state (integer-indexed, optimized for mutation) lives in [`crate::state`]
//! and is built from a [`Project`] at the start of a run.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The value of a single characteristic on a student.
///
/// A characteristic is tri-state: present and `true`, present and `false`,
/// present as a number, or entirely absent from [`Student::characteristics`]
/// (modeled by the key simply not being in the map, not by a variant here).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CharacteristicValue {
    Bool(bool),
    Number(f64),
}

impl CharacteristicValue {
    /// Returns `true` if this value is the boolean `true` variant.
    ///
    /// `ALL`/`SOME`/`MAX` constraints only ever look at boolean-true
    /// membership; numeric characteristic values are carried through the
    /// model but are not consumed by the constraint engine.
    pub fn is_true(&self) -> bool {
        matches!(self, CharacteristicValue::Bool(true))
    }
}

/// A student to be placed into exactly one [`Group`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub characteristics: HashMap<String, CharacteristicValue>,
    /// Ids of students this student would like to be grouped with.
    #[serde(default)]
    pub liked: Vec<u64>,
    /// Ids of students this student would like to avoid.
    #[serde(default)]
    pub disliked: Vec<u64>,
}

/// The kind of constraint a [`Constraint`] expresses about a characteristic
/// within a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstraintKind {
    /// Every student with the characteristic must be in this group.
    All,
    /// At least one student with the characteristic must be in this group.
    Some,
    /// At most `value` students with the characteristic may be in this group.
    Max,
}

/// A constraint attached to a [`Group`], scoped to one characteristic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub characteristic: String,
    pub kind: ConstraintKind,
    /// The bound for a `Max` constraint. Ignored for `All` and `Some`.
    #[serde(default)]
    pub value: Option<i64>,
}

/// A destination group, its capacity, its constraints, and the students
/// currently assigned to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    pub max_size: usize,
    #[serde(default)]
    pub constraints: Vec<Constraint>,
    #[serde(default)]
    pub student_ids: Vec<u64>,
    /// Subset of `student_ids` that must not be moved by the optimizer and
    /// that are excluded from `ALL`/`MAX` constraint accounting.
    #[serde(default)]
    pub pinned_student_ids: Vec<u64>,
}

fn default_likes_weight() -> f64 {
    1.0
}

fn default_dislikes_weight() -> f64 {
    2.0
}

/// Weights controlling how preferences contribute to the total score.
///
/// `characteristic_weights` is accepted and round-tripped for forward
/// compatibility with the wider application this core is embedded in, but
/// is not consumed by the scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    #[serde(default = "default_likes_weight")]
    pub likes_weight: f64,
    #[serde(default = "default_dislikes_weight")]
    pub dislikes_weight: f64,
    #[serde(default)]
    pub characteristic_weights: HashMap<String, f64>,
}

impl Default for Weights {
    fn default() -> Self {
        Weights {
            likes_weight: default_likes_weight(),
            dislikes_weight: default_dislikes_weight(),
            characteristic_weights: HashMap::new(),
        }
    }
}

/// A complete grouping problem: the students to place, the groups to place
/// them into, and the weights that drive scoring.
///
/// `metadata` carries any extra top-level JSON fields the surrounding
/// application stores alongside a project (e.g. a project name or the
/// source spreadsheet path). The optimizer never reads or writes it; it is
/// only preserved across (de)serialization.
///
/// # Example
///
/// ```
/// use grouping_core::models::*;
///
/// let json = r#"{
///     "students": [
///         {"id": 1, "name": "Alice", "liked": [2], "disliked": []},
///         {"id": 2, "name": "Bob", "liked": [1], "disliked": []}
///     ],
///     "groups": [
///         {"name": "Team A", "max_size": 2, "student_ids": [], "pinned_student_ids": []}
///     ],
///     "weights": {"likes_weight": 1.0, "dislikes_weight": 2.0}
/// }"#;
///
/// let project: Project = serde_json::from_str(json).unwrap();
/// assert_eq!(project.students.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default)]
    pub students: Vec<Student>,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub weights: Weights,
    #[serde(flatten)]
    pub metadata: HashMap<String, serde_json::Value>,
}

/// Per-iteration progress sent to a caller-supplied callback.
///
/// Emitted every [`OptimizerConfig`]-documented stride (100 iterations by
/// default) and once more after the final full rescore, so the last event a
/// caller sees always matches the returned result's score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProgressUpdate {
    /// Iterations completed within the current restart.
    pub iteration: u64,
    /// Current annealing temperature.
    pub temperature: f64,
    /// Best score found so far within the current restart.
    pub best_score: f64,
    /// 0-based index of the restart this update belongs to.
    pub restart: usize,
    /// Total restarts configured for this run.
    pub num_restarts: usize,
}

/// Callback invoked periodically during optimization.
///
/// The callback observes progress; it cannot itself request early
/// termination. Cancellation is cooperative and goes through
/// [`crate::CancellationFlag`] instead, so that a caller does not have to
/// smuggle a stop signal through a closure captured at call time.
///
/// The callback must not assume it runs on any particular thread and must
/// not hold locks the optimizer's caller also needs — see the crate-level
/// docs for the concurrency contract.
pub type ProgressCallback = Box<dyn FnMut(&ProgressUpdate) + Send>;

/// Detailed breakdown of one constraint's contribution to the penalty total,
/// for display and debugging.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstraintPenaltyEntry {
    pub group: String,
    pub characteristic: String,
    pub kind: ConstraintKind,
    pub penalty: f64,
    pub reason: String,
}

/// A full accounting of how a project's score was computed.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct ScoreReport {
    pub likes_score: f64,
    pub dislikes_score: f64,
    pub constraint_penalty: f64,
    pub total_score: f64,
    pub constraint_details: Vec<ConstraintPenaltyEntry>,
}

/// Result of [`crate::hard_check`]: a post-hoc boolean verdict on whether a
/// project satisfies every `ALL`/`MAX` constraint exactly (pinning and
/// `SOME` constraints are not part of this check — see module docs).
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct HardCheckReport {
    pub valid: bool,
    pub violations: Vec<String>,
}

/// The outcome of a single restart, kept around when
/// [`OptimizerConfig::return_all_results`] is set.
#[derive(Debug, Clone, Serialize)]
pub struct RestartOutcome {
    pub restart: usize,
    pub score: f64,
    pub project: Project,
}

/// The result of [`crate::optimize`].
#[derive(Debug, Clone, Serialize)]
pub struct OptimizeResult {
    /// The best assignment found across all restarts.
    pub project: Project,
    pub score: ScoreReport,
    /// Every restart's result, best-first, when requested; otherwise empty.
    pub all_results: Vec<RestartOutcome>,
    /// `true` if the run stopped early because the cancellation flag was set.
    pub cancelled: bool,
}

fn default_initial_temp() -> f64 {
    150.0
}
fn default_cooling_rate() -> f64 {
    0.9997
}
fn default_min_temp() -> f64 {
    0.01
}
fn default_max_iterations() -> u64 {
    30_000
}
fn default_num_restarts() -> usize {
    10
}
fn default_progress_stride() -> u64 {
    100
}
fn default_reheat_after_no_improvement() -> u64 {
    500
}

/// Operational knobs for a single [`crate::optimize`] call.
///
/// Every field has a default matching the values documented for the
/// optimizer's reference behavior, so a caller can override only what it
/// needs with `OptimizerConfig { seed: 42, ..Default::default() }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    pub initial_temp: f64,
    pub cooling_rate: f64,
    pub min_temp: f64,
    pub max_iterations: u64,
    pub reheat_after_no_improvement: u64,
    pub num_restarts: usize,
    /// Seed restart 0 with the project's existing `student_ids` rather than
    /// a fresh greedy assignment.
    pub use_current_assignment: bool,
    /// Keep every restart's result in [`OptimizeResult::all_results`],
    /// sorted best score first.
    pub return_all_results: bool,
    /// Root seed for the driver's RNG. Each restart derives its own
    /// sub-seed deterministically from this value and its restart index.
    pub seed: u64,
    /// How often (in iterations) to invoke the progress callback and poll
    /// the cancellation flag.
    pub progress_stride: u64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        OptimizerConfig {
            initial_temp: default_initial_temp(),
            cooling_rate: default_cooling_rate(),
            min_temp: default_min_temp(),
            max_iterations: default_max_iterations(),
            reheat_after_no_improvement: default_reheat_after_no_improvement(),
            num_restarts: default_num_restarts(),
            use_current_assignment: false,
            return_all_results: false,
            seed: 0,
            progress_stride: default_progress_stride(),
        }
    }
}
