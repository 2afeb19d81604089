//! Internal solver state: an integer-indexed mirror of a [`Project`] that
//! supports cheap in-place mutation and incremental score deltas.
//!
//! All public types in [`crate::models`] use string/`u64` ids and are the
//! interchange format. `State` translates those into dense array indices
//! once at construction, the same trade a scheduler makes to avoid hashing
//! ids on every inner-loop comparison.

use std::collections::HashMap;

use crate::error::OptimizerError;
use crate::models::{
    ConstraintPenaltyEntry, ConstraintKind, HardCheckReport, Project, ScoreReport,
};

pub(crate) const UNASSIGNED: usize = usize::MAX;

/// Running counts for one characteristic referenced by at least one
/// constraint, used to evaluate `ALL`/`MAX`/`SOME` in O(1) instead of
/// rescanning every student.
struct CharTrack {
    /// Number of students holding this characteristic who are not pinned to
    /// any group — the population `ALL`/`MAX` constraints reason about.
    total_eligible: usize,
    /// Per-group count of eligible (non-pinned) holders currently assigned there.
    in_group_eligible: Vec<usize>,
    /// Per-group count of ALL holders (pinned or not) currently assigned there,
    /// the population `SOME` constraints reason about.
    in_group_any: Vec<usize>,
}

/// Integer-indexed mirror of a [`Project`] plus the bookkeeping needed to
/// score it and apply/undo single-student moves and pairwise swaps in
/// place.
pub struct State {
    pub(crate) id_to_idx: HashMap<u64, usize>,
    pub(crate) idx_to_id: Vec<u64>,
    pub(crate) names: Vec<String>,

    liked: Vec<Vec<usize>>,
    disliked: Vec<Vec<usize>>,
    liked_by: Vec<Vec<usize>>,
    disliked_by: Vec<Vec<usize>>,

    is_true: HashMap<String, Vec<bool>>,
    pinned_anywhere: Vec<bool>,

    pub(crate) group_names: Vec<String>,
    max_size: Vec<usize>,
    constraints: Vec<Vec<crate::models::Constraint>>,

    pub(crate) assignment: Vec<usize>,
    members: Vec<Vec<usize>>,
    member_pos: Vec<usize>,

    tracks: HashMap<String, CharTrack>,

    likes_weight: f64,
    dislikes_weight: f64,

    likes_count: i64,
    dislikes_count: i64,
    constraint_penalty: f64,
}

impl State {
    /// Builds a solver state from a project, validating structural
    /// invariants and pinning every pinned student to its declared group.
    ///
    /// Non-pinned students whose group is already recorded in
    /// `group.student_ids` start out assigned there too — callers that want
    /// a fresh greedy seed instead of the caller-provided assignment should
    /// follow construction with [`State::unassign_movable`].
    pub fn new(project: &Project) -> Result<Self, OptimizerError> {
        let n = project.students.len();
        let mut id_to_idx = HashMap::with_capacity(n);
        let mut idx_to_id = Vec::with_capacity(n);
        let mut names = Vec::with_capacity(n);
        for s in &project.students {
            if id_to_idx.insert(s.id, idx_to_id.len()).is_some() {
                return Err(OptimizerError::InvalidProject(format!(
                    "duplicate student id {}",
                    s.id
                )));
            }
            idx_to_id.push(s.id);
            names.push(s.name.clone());
        }

        let resolve = |id: u64, ctx: &'static str| -> Result<usize, OptimizerError> {
            id_to_idx
                .get(&id)
                .copied()
                .ok_or(OptimizerError::UnknownStudentId(id, ctx))
        };

        let mut liked = vec![Vec::new(); n];
        let mut disliked = vec![Vec::new(); n];
        let mut liked_by = vec![Vec::new(); n];
        let mut disliked_by = vec![Vec::new(); n];
        for s in &project.students {
            let si = id_to_idx[&s.id];
            for &l in &s.liked {
                let li = resolve(l, "liked")?;
                liked[si].push(li);
                liked_by[li].push(si);
            }
            for &d in &s.disliked {
                let di = resolve(d, "disliked")?;
                disliked[si].push(di);
                disliked_by[di].push(si);
            }
        }

        let mut assigned_to = vec![UNASSIGNED; n];
        let mut pinned_anywhere = vec![false; n];
        let mut group_names = Vec::with_capacity(project.groups.len());
        let mut max_size = Vec::with_capacity(project.groups.len());
        let mut constraints = Vec::with_capacity(project.groups.len());

        for (gi, g) in project.groups.iter().enumerate() {
            group_names.push(g.name.clone());
            max_size.push(g.max_size);
            constraints.push(g.constraints.clone());

            let pinned_set: std::collections::HashSet<u64> =
                g.pinned_student_ids.iter().copied().collect();
            for &sid in &g.pinned_student_ids {
                if !g.student_ids.contains(&sid) {
                    return Err(OptimizerError::PinnedStudentNotInGroup(sid, g.name.clone()));
                }
            }
            for &sid in &g.student_ids {
                let si = resolve(sid, "group.student_ids")?;
                if assigned_to[si] != UNASSIGNED {
                    return Err(OptimizerError::StudentInMultipleGroups(sid));
                }
                assigned_to[si] = gi;
                if pinned_set.contains(&sid) {
                    pinned_anywhere[si] = true;
                }
            }
        }

        let num_groups = group_names.len();

        // Only track characteristics that at least one constraint cares about.
        let mut tracked: std::collections::HashSet<String> = std::collections::HashSet::new();
        for cs in &constraints {
            for c in cs {
                tracked.insert(c.characteristic.clone());
            }
        }
        let mut is_true: HashMap<String, Vec<bool>> = HashMap::new();
        for name in &tracked {
            let mut v = vec![false; n];
            for s in &project.students {
                if let Some(val) = s.characteristics.get(name) {
                    v[id_to_idx[&s.id]] = val.is_true();
                }
            }
            is_true.insert(name.clone(), v);
        }
        let mut tracks: HashMap<String, CharTrack> = HashMap::new();
        for name in &tracked {
            let truth = &is_true[name];
            let total_eligible = (0..n).filter(|&i| truth[i] && !pinned_anywhere[i]).count();
            tracks.insert(
                name.clone(),
                CharTrack {
                    total_eligible,
                    in_group_eligible: vec![0; num_groups],
                    in_group_any: vec![0; num_groups],
                },
            );
        }

        let mut state = State {
            id_to_idx,
            idx_to_id,
            names,
            liked,
            disliked,
            liked_by,
            disliked_by,
            is_true,
            pinned_anywhere,
            group_names,
            max_size,
            constraints,
            assignment: vec![UNASSIGNED; n],
            members: vec![Vec::new(); num_groups],
            member_pos: vec![0; n],
            tracks,
            likes_weight: project.weights.likes_weight,
            dislikes_weight: project.weights.dislikes_weight,
            likes_count: 0,
            dislikes_count: 0,
            constraint_penalty: 0.0,
        };

        for si in 0..n {
            if assigned_to[si] != UNASSIGNED {
                state.assign(si, assigned_to[si]);
            }
        }
        state.recalculate_scores();
        Ok(state)
    }

    pub fn num_students(&self) -> usize {
        self.idx_to_id.len()
    }

    pub fn num_groups(&self) -> usize {
        self.group_names.len()
    }

    pub(crate) fn is_pinned(&self, student: usize) -> bool {
        self.pinned_anywhere[student]
    }

    /// Students that the optimizer is allowed to move.
    pub(crate) fn movable_students(&self) -> Vec<usize> {
        (0..self.num_students())
            .filter(|&s| !self.pinned_anywhere[s])
            .collect()
    }

    pub(crate) fn group_has_space(&self, group: usize, extra: usize) -> bool {
        self.members[group].len() + extra <= self.max_size[group]
    }

    pub(crate) fn group_size(&self, group: usize) -> usize {
        self.members[group].len()
    }

    pub(crate) fn group_members(&self, group: usize) -> &[usize] {
        &self.members[group]
    }

    pub(crate) fn max_size_of(&self, group: usize) -> usize {
        self.max_size[group]
    }

    pub(crate) fn constraints_of(&self, group: usize) -> &[crate::models::Constraint] {
        &self.constraints[group]
    }

    pub(crate) fn is_true_for(&self, student: usize, characteristic: &str) -> bool {
        self.is_true
            .get(characteristic)
            .map(|v| v[student])
            .unwrap_or(false)
    }

    pub(crate) fn some_satisfied(&self, group: usize, characteristic: &str) -> bool {
        self.tracks
            .get(characteristic)
            .map(|t| t.in_group_any[group] > 0)
            .unwrap_or(true)
    }

    /// Whether placing an eligible (non-pinned) true-holder of `characteristic`
    /// into `group` would still respect any `MAX` constraint the group has on it.
    pub(crate) fn max_allows_one_more(&self, group: usize, characteristic: &str) -> bool {
        for c in &self.constraints[group] {
            if c.characteristic == characteristic && c.kind == ConstraintKind::Max {
                let bound = match c.value {
                    Some(v) if v > 0 => v as usize,
                    _ => continue,
                };
                let track = match self.tracks.get(characteristic) {
                    Some(t) => t,
                    None => continue,
                };
                if track.in_group_eligible[group] >= bound {
                    return false;
                }
            }
        }
        true
    }

    pub(crate) fn assignment_of(&self, student: usize) -> usize {
        self.assignment[student]
    }

    pub(crate) fn liked_of(&self, student: usize) -> &[usize] {
        &self.liked[student]
    }

    pub(crate) fn disliked_of(&self, student: usize) -> &[usize] {
        &self.disliked[student]
    }

    /// Unassigns every movable (non-pinned) student, leaving pinned students
    /// exactly where they are. Used before a restart that wants a fresh
    /// greedy seed instead of the caller-supplied assignment.
    pub(crate) fn unassign_movable(&mut self) {
        for s in self.movable_students() {
            if self.assignment[s] != UNASSIGNED {
                self.unassign(s);
            }
        }
        self.recalculate_scores();
    }

    fn unassign(&mut self, student: usize) {
        let old = self.assignment[student];
        debug_assert_ne!(old, UNASSIGNED);
        let pos = self.member_pos[student];
        self.members[old].swap_remove(pos);
        if let Some(&moved) = self.members[old].get(pos) {
            self.member_pos[moved] = pos;
        }
        for (name, track) in self.tracks.iter_mut() {
            let truth = self.is_true.get(name).map(|v| v[student]).unwrap_or(false);
            if truth {
                track.in_group_any[old] -= 1;
                if !self.pinned_anywhere[student] {
                    track.in_group_eligible[old] -= 1;
                }
            }
        }
        self.assignment[student] = UNASSIGNED;
    }

    /// Low-level mutation primitive: place `student` into `group`, removing
    /// it from its previous group (if any) first. This is its own undo: to
    /// roll a move back, call `assign` again with the prior group index.
    pub(crate) fn assign(&mut self, student: usize, group: usize) {
        if self.assignment[student] != UNASSIGNED {
            self.unassign(student);
        }
        self.members[group].push(student);
        self.member_pos[student] = self.members[group].len() - 1;
        self.assignment[student] = group;
        for (name, track) in self.tracks.iter_mut() {
            let truth = self.is_true.get(name).map(|v| v[student]).unwrap_or(false);
            if truth {
                track.in_group_any[group] += 1;
                if !self.pinned_anywhere[student] {
                    track.in_group_eligible[group] += 1;
                }
            }
        }
    }

    /// Full penalty for a single group's constraints and size bound.
    /// Used both for the periodic full rescore and, before/after a
    /// mutation, as the basis for incremental deltas.
    fn group_constraint_penalty(&self, group: usize) -> f64 {
        let mut penalty = 0.0;
        let size = self.members[group].len();
        if size > self.max_size[group] {
            penalty += (size - self.max_size[group]) as f64 * 100.0;
        }
        for c in &self.constraints[group] {
            let track = match self.tracks.get(&c.characteristic) {
                Some(t) => t,
                None => continue,
            };
            match c.kind {
                ConstraintKind::All => {
                    let missing = track.total_eligible - track.in_group_eligible[group];
                    penalty += missing as f64 * 50.0;
                }
                ConstraintKind::Max => {
                    // A MAX constraint with no bound (or a bound of zero,
                    // matching the absent-value reading) is never enforced.
                    let bound = match c.value {
                        Some(v) if v > 0 => v as usize,
                        _ => continue,
                    };
                    let count = track.in_group_eligible[group];
                    if count > bound {
                        penalty += (count - bound) as f64 * 50.0;
                    }
                }
                ConstraintKind::Some => {
                    if track.in_group_any[group] == 0 {
                        penalty += 25.0;
                    }
                }
            }
        }
        penalty
    }

    fn group_constraint_details(&self, group: usize) -> Vec<ConstraintPenaltyEntry> {
        let mut out = Vec::new();
        let size = self.members[group].len();
        if size > self.max_size[group] {
            out.push(ConstraintPenaltyEntry {
                group: self.group_names[group].clone(),
                characteristic: String::new(),
                kind: ConstraintKind::Max,
                penalty: (size - self.max_size[group]) as f64 * 100.0,
                reason: format!("size exceeded: {}/{}", size, self.max_size[group]),
            });
        }
        for c in &self.constraints[group] {
            let track = match self.tracks.get(&c.characteristic) {
                Some(t) => t,
                None => continue,
            };
            match c.kind {
                ConstraintKind::All => {
                    let missing = track.total_eligible - track.in_group_eligible[group];
                    if missing > 0 {
                        out.push(ConstraintPenaltyEntry {
                            group: self.group_names[group].clone(),
                            characteristic: c.characteristic.clone(),
                            kind: c.kind,
                            penalty: missing as f64 * 50.0,
                            reason: format!("ALL {}: {} missing", c.characteristic, missing),
                        });
                    }
                }
                ConstraintKind::Max => {
                    let bound = match c.value {
                        Some(v) if v > 0 => v as usize,
                        _ => continue,
                    };
                    let count = track.in_group_eligible[group];
                    if count > bound {
                        out.push(ConstraintPenaltyEntry {
                            group: self.group_names[group].clone(),
                            characteristic: c.characteristic.clone(),
                            kind: c.kind,
                            penalty: (count - bound) as f64 * 50.0,
                            reason: format!("MAX {}: {} > {}", c.characteristic, count, bound),
                        });
                    }
                }
                ConstraintKind::Some => {
                    if track.in_group_any[group] == 0 {
                        out.push(ConstraintPenaltyEntry {
                            group: self.group_names[group].clone(),
                            characteristic: c.characteristic.clone(),
                            kind: c.kind,
                            penalty: 25.0,
                            reason: format!("SOME {}: none in group", c.characteristic),
                        });
                    }
                }
            }
        }
        out
    }

    /// Rebuilds every cached score component from scratch. Called once
    /// after construction/seeding and periodically thereafter to correct
    /// the float drift that accumulates from many incremental deltas.
    pub fn recalculate_scores(&mut self) {
        let mut likes = 0i64;
        let mut dislikes = 0i64;
        for s in 0..self.num_students() {
            let g = self.assignment[s];
            if g == UNASSIGNED {
                continue;
            }
            for &t in &self.liked[s] {
                if self.assignment[t] == g {
                    likes += 1;
                }
            }
            for &t in &self.disliked[s] {
                if self.assignment[t] == g {
                    dislikes += 1;
                }
            }
        }
        self.likes_count = likes;
        self.dislikes_count = dislikes;
        self.constraint_penalty = (0..self.num_groups())
            .map(|g| self.group_constraint_penalty(g))
            .sum();
    }

    pub fn total_score(&self) -> f64 {
        self.likes_weight * self.likes_count as f64
            - self.dislikes_weight * self.dislikes_count as f64
            - self.constraint_penalty
    }

    pub fn score_report(&self) -> ScoreReport {
        let mut details = Vec::new();
        for g in 0..self.num_groups() {
            details.extend(self.group_constraint_details(g));
        }
        ScoreReport {
            likes_score: self.likes_count as f64 * self.likes_weight,
            dislikes_score: self.dislikes_count as f64 * self.dislikes_weight,
            constraint_penalty: self.constraint_penalty,
            total_score: self.total_score(),
            constraint_details: details,
        }
    }

    fn like_dislike_delta_for_single(&self, student: usize, from: usize, to: usize) -> (i64, i64) {
        let mut likes_d = 0i64;
        let mut dislikes_d = 0i64;
        for &t in &self.liked[student] {
            let old = self.assignment[t] == from;
            let new = self.assignment[t] == to;
            if old != new {
                likes_d += if new { 1 } else { -1 };
            }
        }
        for &u in &self.liked_by[student] {
            let old = self.assignment[u] == from;
            let new = self.assignment[u] == to;
            if old != new {
                likes_d += if new { 1 } else { -1 };
            }
        }
        for &t in &self.disliked[student] {
            let old = self.assignment[t] == from;
            let new = self.assignment[t] == to;
            if old != new {
                dislikes_d += if new { 1 } else { -1 };
            }
        }
        for &u in &self.disliked_by[student] {
            let old = self.assignment[u] == from;
            let new = self.assignment[u] == to;
            if old != new {
                dislikes_d += if new { 1 } else { -1 };
            }
        }
        (likes_d, dislikes_d)
    }

    /// Moves `student` into `to`, updating every cached score component and
    /// returning the signed change in total score. To undo, call
    /// `apply_move(student, from)` with the group this returned from.
    pub(crate) fn apply_move(&mut self, student: usize, to: usize) -> f64 {
        let from = self.assignment[student];
        if from == to {
            return 0.0;
        }
        let (likes_d, dislikes_d) = self.like_dislike_delta_for_single(student, from, to);
        let penalty_before = self.group_constraint_penalty(from) + self.group_constraint_penalty(to);
        self.assign(student, to);
        let penalty_after = self.group_constraint_penalty(from) + self.group_constraint_penalty(to);
        let penalty_delta = penalty_after - penalty_before;

        self.likes_count += likes_d;
        self.dislikes_count += dislikes_d;
        self.constraint_penalty += penalty_delta;

        self.likes_weight * likes_d as f64 - self.dislikes_weight * dislikes_d as f64 - penalty_delta
    }

    fn like_dislike_delta_for_swap(&self, s1: usize, s2: usize, a: usize, b: usize) -> (i64, i64) {
        let group_after = |x: usize| -> usize {
            if x == s1 {
                b
            } else if x == s2 {
                a
            } else {
                self.assignment[x]
            }
        };
        let mut likes_d = 0i64;
        let mut dislikes_d = 0i64;
        for &t in &self.liked[s1] {
            let old = self.assignment[t] == a;
            let new = group_after(t) == b;
            if old != new {
                likes_d += if new { 1 } else { -1 };
            }
        }
        for &t in &self.liked[s2] {
            let old = self.assignment[t] == b;
            let new = group_after(t) == a;
            if old != new {
                likes_d += if new { 1 } else { -1 };
            }
        }
        for &u in &self.liked_by[s1] {
            if u == s2 {
                continue;
            }
            let old = self.assignment[u] == a;
            let new = group_after(u) == b;
            if old != new {
                likes_d += if new { 1 } else { -1 };
            }
        }
        for &u in &self.liked_by[s2] {
            if u == s1 {
                continue;
            }
            let old = self.assignment[u] == b;
            let new = group_after(u) == a;
            if old != new {
                likes_d += if new { 1 } else { -1 };
            }
        }
        for &t in &self.disliked[s1] {
            let old = self.assignment[t] == a;
            let new = group_after(t) == b;
            if old != new {
                dislikes_d += if new { 1 } else { -1 };
            }
        }
        for &t in &self.disliked[s2] {
            let old = self.assignment[t] == b;
            let new = group_after(t) == a;
            if old != new {
                dislikes_d += if new { 1 } else { -1 };
            }
        }
        for &u in &self.disliked_by[s1] {
            if u == s2 {
                continue;
            }
            let old = self.assignment[u] == a;
            let new = group_after(u) == b;
            if old != new {
                dislikes_d += if new { 1 } else { -1 };
            }
        }
        for &u in &self.disliked_by[s2] {
            if u == s1 {
                continue;
            }
            let old = self.assignment[u] == b;
            let new = group_after(u) == a;
            if old != new {
                dislikes_d += if new { 1 } else { -1 };
            }
        }
        (likes_d, dislikes_d)
    }

    /// Swaps the groups of `s1` and `s2`, returning the signed change in
    /// total score. To undo, call `apply_swap(s1, s2)` again.
    ///
    /// The preference (likes/dislikes) component is exact. The constraint
    /// penalty component is measured by comparing `a`/`b`'s combined penalty
    /// before the swap against after, with the two reassignments applied
    /// sequentially (`s1` into `b`, then `s2` into `a`, so `s2` has already
    /// left `b` by the time its final penalty is read) rather than as two
    /// independent single-student deltas measured in isolation — measuring
    /// each student's move independently against the same pre-swap snapshot
    /// double-counts the transient moment where both students would appear
    /// in `b` at once and can misjudge a `MAX` constraint sitting exactly at
    /// its bound. This sequential form is exact for `ALL`/`MAX`. It can
    /// still misjudge a `SOME` constraint that only the combined effect of
    /// both students leaving/entering a group would flip from unsatisfied to
    /// satisfied — the one approximation this delta intentionally keeps,
    /// corrected by the periodic full rescore.
    pub(crate) fn apply_swap(&mut self, s1: usize, s2: usize) -> f64 {
        let a = self.assignment[s1];
        let b = self.assignment[s2];
        if a == b {
            return 0.0;
        }
        let (likes_d, dislikes_d) = self.like_dislike_delta_for_swap(s1, s2, a, b);

        let before = self.group_constraint_penalty(a) + self.group_constraint_penalty(b);
        self.assign(s1, b);
        self.assign(s2, a);
        let after = self.group_constraint_penalty(a) + self.group_constraint_penalty(b);
        let penalty_delta = after - before;

        self.likes_count += likes_d;
        self.dislikes_count += dislikes_d;
        self.constraint_penalty += penalty_delta;

        self.likes_weight * likes_d as f64 - self.dislikes_weight * dislikes_d as f64 - penalty_delta
    }

    /// Post-hoc check of `ALL`/`MAX` constraints only. Pinning is already
    /// baked into eligibility; `SOME` is a soft constraint and is not part
    /// of this report.
    pub fn hard_check(&self) -> HardCheckReport {
        let mut violations = Vec::new();
        for g in 0..self.num_groups() {
            let size = self.members[g].len();
            if size > self.max_size[g] {
                violations.push(format!(
                    "{}: exceeds max size ({} > {})",
                    self.group_names[g], size, self.max_size[g]
                ));
            }
            for c in &self.constraints[g] {
                let track = match self.tracks.get(&c.characteristic) {
                    Some(t) => t,
                    None => continue,
                };
                match c.kind {
                    ConstraintKind::All => {
                        let missing = track.total_eligible - track.in_group_eligible[g];
                        if missing > 0 {
                            violations.push(format!(
                                "{}: ALL constraint violated for {}, missing {} students",
                                self.group_names[g], c.characteristic, missing
                            ));
                        }
                    }
                    ConstraintKind::Max => {
                        let bound = match c.value {
                            Some(v) if v > 0 => v as usize,
                            _ => continue,
                        };
                        let count = track.in_group_eligible[g];
                        if count > bound {
                            violations.push(format!(
                                "{}: MAX constraint violated for {} ({} > {})",
                                self.group_names[g], c.characteristic, count, bound
                            ));
                        }
                    }
                    ConstraintKind::Some => {}
                }
            }
        }
        HardCheckReport {
            valid: violations.is_empty(),
            violations,
        }
    }

    /// A lightweight snapshot of the current assignment, cheap enough to
    /// take on every improving iteration without the cost of cloning the
    /// whole `State` (trackers, reverse indices, and all).
    pub(crate) fn snapshot_assignment(&self) -> Vec<usize> {
        self.assignment.clone()
    }

    /// Restores a previously taken assignment snapshot and rebuilds every
    /// cached score component from it, correcting any drift accumulated by
    /// the incremental deltas applied since the snapshot was taken.
    pub(crate) fn restore_assignment(&mut self, snapshot: &[usize]) {
        for s in self.movable_students() {
            if self.assignment[s] != snapshot[s] {
                self.assign(s, snapshot[s]);
            }
        }
        self.recalculate_scores();
    }

    /// Materializes the current assignment back into a [`Project`],
    /// starting from `template` so group ordering, constraints, and opaque
    /// metadata are preserved.
    pub fn to_project(&self, template: &Project) -> Project {
        let mut project = template.clone();
        for (gi, group) in project.groups.iter_mut().enumerate() {
            let mut ids: Vec<u64> = self.members[gi].iter().map(|&s| self.idx_to_id[s]).collect();
            ids.sort_unstable();
            group.student_ids = ids;
        }
        project
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::*;

    fn student(id: u64, liked: Vec<u64>, disliked: Vec<u64>) -> Student {
        Student {
            id,
            name: format!("S{}", id),
            characteristics: HashMap::new(),
            liked,
            disliked,
        }
    }

    fn basic_project() -> Project {
        Project {
            students: vec![
                student(1, vec![2], vec![]),
                student(2, vec![1], vec![]),
                student(3, vec![], vec![1]),
                student(4, vec![], vec![]),
            ],
            groups: vec![
                Group {
                    name: "A".into(),
                    max_size: 2,
                    constraints: vec![],
                    student_ids: vec![1, 3],
                    pinned_student_ids: vec![],
                },
                Group {
                    name: "B".into(),
                    max_size: 2,
                    constraints: vec![],
                    student_ids: vec![2, 4],
                    pinned_student_ids: vec![],
                },
            ],
            weights: Weights::default(),
            metadata: HashMap::new(),
        }
    }

    #[test]
    fn swap_delta_matches_recalculation() {
        let mut state = State::new(&basic_project()).unwrap();
        let before = state.total_score();
        let s1 = state.id_to_idx[&1];
        let s2 = state.id_to_idx[&2];
        let delta = state.apply_swap(s1, s2);
        assert!((state.total_score() - (before + delta)).abs() < 1e-9);
        state.recalculate_scores();
        assert!((state.total_score() - (before + delta)).abs() < 1e-9);
    }

    #[test]
    fn move_delta_matches_recalculation() {
        let mut state = State::new(&basic_project()).unwrap();
        let before = state.total_score();
        let s3 = state.id_to_idx[&3];
        let delta = state.apply_move(s3, 1);
        assert!((state.total_score() - (before + delta)).abs() < 1e-9);
        state.recalculate_scores();
        assert!((state.total_score() - (before + delta)).abs() < 1e-9);
    }

    #[test]
    fn pinned_student_is_never_movable() {
        let mut project = basic_project();
        project.groups[0].pinned_student_ids = vec![1];
        let state = State::new(&project).unwrap();
        let s1 = state.id_to_idx[&1];
        assert!(!state.movable_students().contains(&s1));
    }

    #[test]
    fn rejects_student_in_two_groups() {
        let mut project = basic_project();
        project.groups[1].student_ids.push(1);
        assert!(matches!(
            State::new(&project),
            Err(OptimizerError::StudentInMultipleGroups(1))
        ));
    }

    /// Swapping a `MAX`-bound holder for another holder of the same
    /// characteristic must score a zero constraint-penalty delta: the
    /// group's holder count is unchanged start to finish, even though an
    /// isolated per-student computation would transiently see both holders
    /// present at once and misjudge the bound.
    #[test]
    fn swap_between_two_holders_at_max_bound_has_zero_penalty_delta() {
        let mut project = basic_project();
        project.groups[0].constraints.push(Constraint {
            characteristic: "X".into(),
            kind: ConstraintKind::Max,
            value: Some(1),
        });
        project.students[0]
            .characteristics
            .insert("X".into(), CharacteristicValue::Bool(true));
        project.students[1]
            .characteristics
            .insert("X".into(), CharacteristicValue::Bool(true));
        // group A = {1, 3}, group B = {2, 4}; swap holder 1 (A) with holder 2 (B).
        let mut state = State::new(&project).unwrap();
        assert_eq!(state.group_constraint_penalty(0), 0.0);
        let s1 = state.id_to_idx[&1];
        let s2 = state.id_to_idx[&2];
        let penalty_before = state.constraint_penalty;
        state.apply_swap(s1, s2);
        assert_eq!(state.constraint_penalty, penalty_before);
        state.recalculate_scores();
        assert_eq!(state.constraint_penalty, penalty_before);
    }
}
