// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! States and the arena that owns them.
//!
//! Every state discovered by the search lives in one arena for the whole
//! run; sequences, trail maps and obligation stacks refer to states by
//! [`StateId`]. Ids are handed out monotonically and never reused, and they
//! say nothing about a state's position in the search graph. Two states may
//! carry the same latch valuation under different ids; deduplication is an
//! optimization the engine does not rely on.

use aig::cube::{implies, Cube};
use std::fmt;

/// Index of a state in the [`StateArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub struct StateId(u32);

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// One latch valuation (possibly partial) and the input valuation recorded
/// with it. For states discovered going backward the inputs are the ones
/// consumed at the predecessor to reach this state; going forward they are
/// the ones this state consumes to reach its successor (or, for start
/// states, to trigger the bad output).
#[derive(Debug, Clone)]
pub struct State {
    /// Latch cube, sorted by variable; full for backward discoveries,
    /// possibly generalized for forward ones.
    pub latches: Cube,
    /// Input cube; kept full even when the latch cube is generalized, so
    /// trace replay stays deterministic.
    pub inputs: Cube,
    /// The abstract stand-in for "all property-violating states", seeding
    /// the forward search without materializing its level 0.
    pub negated_property: bool,
}

impl State {
    /// Is this state inside the set of states described by `cube`?
    pub fn is_blocked_by(&self, cube: &[aig::cube::Lit]) -> bool {
        implies(&self.latches, cube)
    }
}

/// Owns every state of a run. Dropping the arena is the single release
/// point for all of them.
#[derive(Debug, Default)]
pub struct StateArena {
    states: Vec<State>,
}

impl StateArena {
    /// Allocate a state, returning its fresh id.
    pub fn alloc(&mut self, latches: Cube, inputs: Cube) -> StateId {
        self.states.push(State {
            latches,
            inputs,
            negated_property: false,
        });
        StateId(self.states.len() as u32 - 1)
    }

    /// Allocate the negated-property pseudo-state.
    pub fn alloc_negated_property(&mut self) -> StateId {
        let id = self.alloc(Cube::new(), Cube::new());
        self.states[id.0 as usize].negated_property = true;
        id
    }

    /// Number of states allocated so far.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// True when no state has been allocated.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

impl std::ops::Index<StateId> for StateArena {
    type Output = State;
    fn index(&self, id: StateId) -> &State {
        &self.states[id.0 as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_monotonic_and_stable() {
        let mut arena = StateArena::default();
        let a = arena.alloc(vec![-2, 3], vec![1]);
        let b = arena.alloc(vec![-2, 3], vec![-1]);
        assert_ne!(a, b, "same valuation, distinct identity");
        assert_eq!(arena[a].latches, arena[b].latches);
        let negp = arena.alloc_negated_property();
        assert!(arena[negp].negated_property);
        assert_eq!(arena.len(), 3);
    }

    #[test]
    fn blocking_is_cube_implication() {
        let mut arena = StateArena::default();
        let s = arena.alloc(vec![-2, 3, -4], vec![]);
        assert!(arena[s].is_blocked_by(&[-2, -4]));
        assert!(!arena[s].is_blocked_by(&[2]));
        // a partial state is only blocked by cubes it fully contains
        let p = arena.alloc(vec![3], vec![]);
        assert!(arena[p].is_blocked_by(&[3]));
        assert!(!arena[p].is_blocked_by(&[3, -4]));
    }
}
