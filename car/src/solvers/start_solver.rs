// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! The start solver: enumerates states satisfying the bad predicate, one
//! per query, without repetition within a round.
//!
//! Enumerated states (and frame cubes that prove a start state pointless)
//! are excluded by blocking clauses guarded by a round literal; `reset`
//! allocates a fresh round literal, retiring every exclusion at once so the
//! next round enumerates from scratch.

use aig::cube::{Cube, Lit, Var};
use aig::TransitionSystem;
use solver::IncrementalSolver;

/// The start-state enumeration role.
pub struct StartSolver<S: IncrementalSolver> {
    sat: S,
    round_flag: Var,
    next_flag: Var,
}

impl<S: IncrementalSolver> StartSolver<S> {
    /// Load the constraint and output partitions and pin the bad output
    /// true; the latch-next partition is not needed to describe start
    /// states.
    pub fn new(sys: &TransitionSystem) -> Self {
        let mut sat = S::default();
        for clause in sys.constraint_clauses().iter().chain(sys.output_clauses()) {
            sat.add_clause(clause);
        }
        // reserved constants live in the latch partition; assert them here
        sat.add_clause(&[sys.true_var()]);
        sat.add_clause(&[-sys.false_var()]);
        sat.add_clause(&[sys.bad_lit()]);
        StartSolver {
            sat,
            round_flag: sys.max_var() + 1,
            next_flag: sys.max_var() + 2,
        }
    }

    /// The next not-yet-excluded bad-satisfying assignment (inputs then
    /// latches), or `None` when the round is exhausted. The returned latch
    /// valuation is immediately excluded for the rest of the round.
    pub fn enumerate(&mut self, sys: &TransitionSystem) -> Option<Vec<Lit>> {
        if !self.sat.solve(&[self.round_flag]) {
            return None;
        }
        let full = self
            .sat
            .assignment((sys.num_inputs() + sys.num_latches()) as Var);
        let latches = &full[sys.num_inputs()..];
        let mut clause: Vec<Lit> = vec![-self.round_flag];
        clause.extend(latches.iter().map(|&l| -l));
        self.sat.add_clause(&clause);
        Some(full)
    }

    /// Exclude, for this round, start states covered by a frame cube.
    pub fn block_cube(&mut self, cube: &Cube) {
        let mut clause: Vec<Lit> = vec![-self.round_flag];
        clause.extend(cube.iter().map(|&l| -l));
        self.sat.add_clause(&clause);
    }

    /// Begin a fresh enumeration round.
    pub fn reset(&mut self) {
        self.round_flag = self.next_flag;
        self.next_flag += 1;
    }
}
