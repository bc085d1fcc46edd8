// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Assumption-ordering hints.
//!
//! Before a reachability query the engine may prepend groups of literals to
//! the raw state assumption: literals the state shares with recent blocking
//! cubes of the adjacent frame, and literals it shares with a per-level
//! rotating reference cube. Every hint literal is drawn from the state
//! itself, so hints reorder the assumption without changing the verdict;
//! they only steer the solver toward smaller cores.

use aig::cube::{intersect, split_by_reference, Cube, Lit};
use crate::sequence::Frame;

/// Configuration of the hint groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HintOptions {
    /// How many of the adjacent frame's most recent cubes to intersect
    /// with; zero disables intersection hints.
    pub intersections: usize,
    /// Whether to keep a rotating reference cube per level.
    pub rotation: bool,
}

impl Default for HintOptions {
    fn default() -> Self {
        HintOptions {
            intersections: 1,
            rotation: true,
        }
    }
}

/// Intersections of the state with the most recently added cubes of the
/// frame the answer would strengthen.
pub fn intersection_hints(latches: &[Lit], frame: &Frame, count: usize) -> Vec<Cube> {
    frame
        .iter()
        .rev()
        .take(count)
        .map(|cube| intersect(latches, cube))
        .filter(|hint| !hint.is_empty())
        .collect()
}

/// The rotating reference cubes, one slot per frame level, shared by all
/// sequences of a run. A slot starts out as the first state queried at its
/// level and is refreshed to the queried state's literals (matches first)
/// after every unsatisfiable answer.
#[derive(Debug, Default)]
pub struct RotationState {
    slots: Vec<Cube>,
}

impl RotationState {
    /// Seed slot zero (the original primes it with the initial cube).
    pub fn seed(&mut self, cube: Cube) {
        self.slots = vec![cube];
    }

    fn slot_mut(&mut self, level: usize) -> &mut Cube {
        while self.slots.len() <= level {
            self.slots.push(Cube::new());
        }
        &mut self.slots[level]
    }

    /// Hint groups for a query at `level`: the state's literals that agree
    /// with the reference cube (in reference order), then the rest.
    pub fn hints(&mut self, latches: &[Lit], level: usize) -> Vec<Cube> {
        let slot = self.slot_mut(level);
        if slot.is_empty() {
            *slot = latches.to_vec();
            return vec![];
        }
        let (hit, rest) = split_by_reference(latches, slot);
        [hit, rest].into_iter().filter(|g| !g.is_empty()).collect()
    }

    /// After an unsatisfiable answer, rotate the reference toward the
    /// refuted state: its agreeing literals move to the front.
    pub fn refresh(&mut self, latches: &[Lit], level: usize) {
        let slot = self.slot_mut(level);
        if slot.is_empty() {
            *slot = latches.to_vec();
            return;
        }
        let (mut hit, rest) = split_by_reference(latches, slot);
        hit.extend(rest);
        *slot = hit;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intersection_hints_take_recent_cubes_first() {
        let frame = vec![vec![-2, 3], vec![2, -4], vec![-2, -4]];
        let hints = intersection_hints(&[-2, 3, -4], &frame, 2);
        assert_eq!(hints, vec![vec![-2, -4], vec![-4]]);
        // disjoint intersections are dropped
        let hints = intersection_hints(&[2, -3], &frame, 1);
        assert!(hints.is_empty());
    }

    #[test]
    fn hint_literals_come_from_the_state() {
        let frame = vec![vec![-2, 3, 5]];
        let state = vec![-2, 3, -4];
        for hint in intersection_hints(&state, &frame, 1) {
            for l in hint {
                assert!(state.contains(&l));
            }
        }
    }

    #[test]
    fn rotation_splits_and_refreshes() {
        let mut rot = RotationState::default();
        // first visitor claims the slot, no hints yet
        assert!(rot.hints(&[-2, 3], 1).is_empty());
        let hints = rot.hints(&[-2, -3], 1);
        assert_eq!(hints, vec![vec![-2], vec![-3]]);
        rot.refresh(&[-2, -3], 1);
        // the refreshed reference now leads with the shared literal
        assert_eq!(rot.hints(&[-2, 3], 1), vec![vec![-2], vec![3]]);
    }

    #[test]
    fn seeding_fills_slot_zero() {
        let mut rot = RotationState::default();
        rot.seed(vec![-2, -3]);
        assert_eq!(rot.hints(&[-2, 3], 0), vec![vec![-2], vec![3]]);
    }
}
