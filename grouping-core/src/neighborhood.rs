//! Candidate move generation for the annealer's inner loop.
//!
//! Three move types, chosen by weighted coin flip each iteration:
//! a plain swap (45%), an unconstrained random relocation (30%), and a
//! "smart" relocation that targets the group most aligned with the
//! student's own preferences (25%). All three are expressed as a single
//! in-place [`State`] mutation that returns its own score delta and that
//! undoes itself when re-applied with the same arguments — the annealer
//! rolls a rejected candidate back by calling it again rather than by
//! restoring a cloned snapshot.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::state::State;

const SWAP_PROBABILITY: f64 = 0.45;
const RANDOM_MOVE_PROBABILITY: f64 = 0.30;
// Remaining probability mass (0.25) goes to the smart move.

pub(crate) enum Proposal {
    /// Swap the groups of two movable students.
    Swap(usize, usize),
    /// Move a single movable student into a different group. The group it
    /// came from is implicit — `State::apply_move` reads it off the
    /// current assignment, so undo is just proposing the reverse move.
    Move(usize, usize),
}

impl Proposal {
    /// Applies this proposal in place and returns the resulting score delta.
    pub(crate) fn apply(&self, state: &mut State) -> f64 {
        match *self {
            Proposal::Swap(s1, s2) => state.apply_swap(s1, s2),
            Proposal::Move(student, to) => state.apply_move(student, to),
        }
    }

    /// Reverses this proposal. For a swap this is just swapping again; for
    /// a move this is moving the student back to where it came from.
    pub(crate) fn undo(&self, state: &mut State, origin: usize) {
        match *self {
            Proposal::Swap(s1, s2) => {
                state.apply_swap(s1, s2);
            }
            Proposal::Move(student, _) => {
                state.apply_move(student, origin);
            }
        }
    }
}

/// Picks a random candidate move. Returns `None` only when there is no
/// movable student at all (an all-pinned project), which the annealer
/// treats as an empty search space.
pub(crate) fn propose<R: Rng>(state: &State, rng: &mut R) -> Option<(Proposal, usize)> {
    let movable = state.movable_students();
    if movable.is_empty() {
        return None;
    }

    let roll: f64 = rng.random();
    if roll < SWAP_PROBABILITY {
        if let Some(p) = propose_swap(state, &movable, rng) {
            return Some(p);
        }
    } else if roll < SWAP_PROBABILITY + RANDOM_MOVE_PROBABILITY {
        if let Some(p) = propose_random_move(state, &movable, rng) {
            return Some(p);
        }
    } else if let Some(p) = propose_smart_move(state, &movable, rng) {
        return Some(p);
    }
    // Fall back to whichever move type can actually produce a candidate —
    // e.g. a single-group project can never swap.
    propose_random_move(state, &movable, rng).or_else(|| propose_swap(state, &movable, rng))
}

fn propose_swap<R: Rng>(
    state: &State,
    movable: &[usize],
    rng: &mut R,
) -> Option<(Proposal, usize)> {
    if state.num_groups() < 2 || movable.len() < 2 {
        return None;
    }
    for _ in 0..16 {
        let s1 = *movable.choose(rng)?;
        let s2 = *movable.choose(rng)?;
        if s1 != s2 && state.assignment_of(s1) != state.assignment_of(s2) {
            let origin = state.assignment_of(s1);
            return Some((Proposal::Swap(s1, s2), origin));
        }
    }
    None
}

fn propose_random_move<R: Rng>(
    state: &State,
    movable: &[usize],
    rng: &mut R,
) -> Option<(Proposal, usize)> {
    let student = *movable.choose(rng)?;
    let origin = state.assignment_of(student);
    let targets: Vec<usize> = (0..state.num_groups())
        .filter(|&g| g != origin && state.group_has_space(g, 1))
        .collect();
    let target = *targets.choose(rng)?;
    Some((Proposal::Move(student, target), origin))
}

/// How unhappy a student is with their current placement: disliked
/// groupmates they're stuck with, plus liked students they're missing out
/// on. Zero for a student with no preference signal or one already fully
/// satisfied.
fn unhappiness(state: &State, student: usize) -> f64 {
    let origin = state.assignment_of(student);
    let members = state.group_members(origin);
    let dislikes_in_group = state
        .disliked_of(student)
        .iter()
        .filter(|&&t| members.contains(&t))
        .count() as f64;
    let likes_outside_group = state
        .liked_of(student)
        .iter()
        .filter(|&&t| !members.contains(&t))
        .count() as f64;
    dislikes_in_group + likes_outside_group
}

/// Picks one of the unhappiest movable students — ranked by [`unhappiness`]
/// and drawn at random from the top third of those with a strictly
/// positive score — then targets the group (other than their own) that
/// currently maximizes their liked-minus-disliked contribution, with space
/// to receive them. Falls back to a uniformly random movable student, and
/// separately to a random move, when no student has any preference signal
/// pointing anywhere in particular.
fn propose_smart_move<R: Rng>(
    state: &State,
    movable: &[usize],
    rng: &mut R,
) -> Option<(Proposal, usize)> {
    let mut ranked: Vec<(usize, f64)> = movable
        .iter()
        .map(|&s| (s, unhappiness(state, s)))
        .filter(|&(_, score)| score > 0.0)
        .collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());
    let top_third = ranked.len().div_ceil(3).max(1).min(ranked.len());
    let student = if top_third > 0 {
        ranked[..top_third].choose(rng).map(|&(s, _)| s)
    } else {
        None
    }
    .unwrap_or(*movable.choose(rng)?);

    let origin = state.assignment_of(student);
    let mut best_group = None;
    let mut best_score = f64::NEG_INFINITY;
    for g in 0..state.num_groups() {
        if g == origin || !state.group_has_space(g, 1) {
            continue;
        }
        let members = state.group_members(g);
        let likes = state
            .liked_of(student)
            .iter()
            .filter(|&&t| members.contains(&t))
            .count() as f64;
        let dislikes = state
            .disliked_of(student)
            .iter()
            .filter(|&&t| members.contains(&t))
            .count() as f64;
        let score = likes - dislikes;
        if score > best_score {
            best_score = score;
            best_group = Some(g);
        }
    }
    match best_group {
        Some(g) if best_score > 0.0 => Some((Proposal::Move(student, g), origin)),
        _ => propose_random_move(state, movable, rng),
    }
}
