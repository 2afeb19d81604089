//! Error types returned by the optimization core.

use thiserror::Error;

/// Errors that can occur while validating a [`crate::models::Project`] or
/// running the optimizer against it.
///
/// Soft-constraint violations (likes/dislikes mismatches, `SOME`/`MAX`/`ALL`
/// penalties) are never represented here — they are scored, not rejected.
/// Only structural problems that make the project impossible to optimize
/// are errors.
#[derive(Error, Debug)]
pub enum OptimizerError {
    /// The project failed validation before optimization could start.
    #[error("invalid project: {0}")]
    InvalidProject(String),

    /// A student id referenced from a group, `liked`, or `disliked` list
    /// does not exist in `project.students`.
    #[error("unknown student id {0} referenced in {1}")]
    UnknownStudentId(u64, &'static str),

    /// The same student id appears in more than one group's `student_ids`.
    #[error("student id {0} is assigned to more than one group")]
    StudentInMultipleGroups(u64),

    /// A group's `pinned_student_ids` contains an id absent from its own
    /// `student_ids`.
    #[error("student id {0} is pinned to group '{1}' but not a member of it")]
    PinnedStudentNotInGroup(u64, String),
}
