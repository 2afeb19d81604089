//! Pinned-preserving greedy construction of a starting assignment.
//!
//! Runs three passes over the students [`crate::state::State::unassign_movable`]
//! left unplaced: `ALL` constraints first (they are mandatory to satisfy
//! cheaply while groups are still empty), then `SOME` constraints, then a
//! preference-greedy pass for everyone else. Processing order within each
//! pass is shuffled by the driver's per-restart RNG so a fixed seed
//! reproduces a fixed seed, while the pass order itself stays deterministic.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::ConstraintKind;
use crate::state::{State, UNASSIGNED};

pub(crate) fn seed<R: Rng>(state: &mut State, rng: &mut R) {
    let mut unassigned: Vec<usize> = (0..state.num_students())
        .filter(|&s| !state.is_pinned(s) && state.assignment_of(s) == UNASSIGNED)
        .collect();
    unassigned.shuffle(rng);

    pass_all(state, &mut unassigned);
    pass_some(state, &mut unassigned, rng);
    pass_greedy(state, &mut unassigned);
}

fn pass_all(state: &mut State, unassigned: &mut Vec<usize>) {
    for g in 0..state.num_groups() {
        let chars: Vec<String> = state
            .constraints_of(g)
            .iter()
            .filter(|c| c.kind == ConstraintKind::All)
            .map(|c| c.characteristic.clone())
            .collect();
        for characteristic in chars {
            let mut i = 0;
            while i < unassigned.len() {
                let s = unassigned[i];
                if state.is_true_for(s, &characteristic) && state.group_has_space(g, 1) {
                    state.assign(s, g);
                    unassigned.remove(i);
                } else {
                    i += 1;
                }
            }
        }
    }
}

fn pass_some<R: Rng>(state: &mut State, unassigned: &mut Vec<usize>, rng: &mut R) {
    for g in 0..state.num_groups() {
        let chars: Vec<String> = state
            .constraints_of(g)
            .iter()
            .filter(|c| c.kind == ConstraintKind::Some)
            .map(|c| c.characteristic.clone())
            .collect();
        for characteristic in chars {
            if state.some_satisfied(g, &characteristic) || !state.group_has_space(g, 1) {
                continue;
            }
            let candidate_pos = unassigned
                .iter()
                .enumerate()
                .filter(|(_, &s)| state.is_true_for(s, &characteristic))
                .map(|(i, _)| i)
                .collect::<Vec<_>>()
                .choose(rng)
                .copied();
            if let Some(pos) = candidate_pos {
                let s = unassigned.remove(pos);
                state.assign(s, g);
            }
        }
    }
}

/// Preference-greedy placement: each remaining student goes to whichever
/// feasible group currently maximizes their like/dislike contribution,
/// breaking ties toward the smaller group so population spreads out
/// instead of collapsing onto the first feasible group found.
fn pass_greedy(state: &mut State, unassigned: &mut [usize]) {
    for &s in unassigned.iter() {
        let mut best_group: Option<usize> = None;
        let mut best_score = f64::NEG_INFINITY;
        for g in 0..state.num_groups() {
            if !state.group_has_space(g, 1) {
                continue;
            }
            if !feasible_for_max(state, s, g) {
                continue;
            }
            let members = state.group_members(g);
            let likes = state
                .liked_of(s)
                .iter()
                .filter(|&&t| members.contains(&t))
                .count() as f64;
            let dislikes = state
                .disliked_of(s)
                .iter()
                .filter(|&&t| members.contains(&t))
                .count() as f64;
            let candidate_score =
                likes - 2.0 * dislikes - 0.01 * state.group_size(g) as f64;
            if candidate_score > best_score {
                best_score = candidate_score;
                best_group = Some(g);
            }
        }
        match best_group {
            Some(g) => state.assign(s, g),
            None => {
                // Every feasible group is full or MAX-blocked. Fall back to
                // any group with raw space, dropping the MAX check rather
                // than leave a placeable student unassigned.
                if let Some(g) = (0..state.num_groups()).find(|&g| state.group_has_space(g, 1)) {
                    state.assign(s, g);
                }
                // If no group has raw space either, the student stays
                // unassigned — a valid outcome the scorer and hard-check
                // both account for.
            }
        }
    }
}

fn feasible_for_max(state: &State, student: usize, group: usize) -> bool {
    for c in state.constraints_of(group) {
        if c.kind == ConstraintKind::Max && state.is_true_for(student, &c.characteristic) {
            if !state.max_allows_one_more(group, &c.characteristic) {
                return false;
            }
        }
    }
    true
}
