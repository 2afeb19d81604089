//! Post-hoc validation of `ALL`/`MAX` constraints against an assignment,
//! independent of the scorer used during optimization.
//!
//! This exists for a caller who edited a [`crate::models::Project`] by hand
//! (or accepted a partial manual override of an optimizer result) and wants
//! a definite yes/no before trusting it, rather than a penalty number.
//! `SOME` is a soft constraint and has no pass/fail reading, so it is not
//! part of this report.

use crate::error::OptimizerError;
use crate::models::{HardCheckReport, Project};
use crate::state::State;

pub fn hard_check(project: &Project) -> Result<HardCheckReport, OptimizerError> {
    let state = State::new(project)?;
    Ok(state.hard_check())
}
