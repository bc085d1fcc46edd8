// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! The main solver: one incremental instance shared by every reachability
//! query of the run.
//!
//! It holds the whole transition relation plus, for each (Osequence, level)
//! pair, the frame's blocking clauses guarded by a lazily allocated
//! activation literal, so a query against one level of one sequence simply
//! assumes that level's literal. Frame clauses are primed for backward
//! sequences (the assumption carries the unprimed state) and unprimed for
//! forward ones (the assumption carries the primed state).

use crate::hashmap::HashMap;
use crate::sequence::{Direction, Frame, OseqId};
use aig::cube::{negate, var, var_cmp, Cube, Lit, Var};
use aig::TransitionSystem;
use solver::IncrementalSolver;

/// The shared main solver role.
pub struct MainSolver<S: IncrementalSolver> {
    sat: S,
    flags: HashMap<OseqId, Vec<Lit>>,
    next_flag: Var,
    last_assumptions: Vec<Lit>,
}

impl<S: IncrementalSolver> MainSolver<S> {
    /// Load the three transition-relation partitions into a fresh instance.
    pub fn new(sys: &TransitionSystem) -> Self {
        let mut sat = S::default();
        for clause in sys
            .constraint_clauses()
            .iter()
            .chain(sys.output_clauses())
            .chain(sys.latch_clauses())
        {
            sat.add_clause(clause);
        }
        MainSolver {
            sat,
            flags: HashMap::default(),
            next_flag: sys.max_var() + 1,
            last_assumptions: vec![],
        }
    }

    /// The activation literal of `(o, level)`, allocating lazily. The table
    /// is append-only.
    fn flag_of(&mut self, o: OseqId, level: usize) -> Lit {
        let flags = self.flags.entry(o).or_default();
        while flags.len() <= level {
            flags.push(self.next_flag);
            self.next_flag += 1;
        }
        flags[level]
    }

    /// Add one blocking cube at `(o, level)`: the negation of the cube,
    /// primed according to the sequence's direction, guarded by the level's
    /// activation literal.
    pub fn add_blocking_cube(
        &mut self,
        sys: &TransitionSystem,
        o: OseqId,
        level: usize,
        cube: &[Lit],
        dir: Direction,
    ) {
        let flag = self.flag_of(o, level);
        let mut clause = Vec::with_capacity(cube.len() + 1);
        clause.push(-flag);
        for &l in cube {
            clause.push(if dir.is_forward() { -l } else { -sys.prime(l) });
        }
        self.sat.add_clause(&clause);
    }

    /// Register a whole frame at `(o, level)`.
    pub fn register_frame(
        &mut self,
        sys: &TransitionSystem,
        o: OseqId,
        level: usize,
        frame: &Frame,
        dir: Direction,
    ) {
        for cube in frame {
            self.add_blocking_cube(sys, o, level, cube, dir);
        }
    }

    /// Is `state` (under direction-appropriate priming) consistent with the
    /// transition relation and frame `level` of `o`? The assumption is the
    /// activation literal, then the heuristic hint groups, then the full
    /// state cube.
    pub fn solve_frame_query(
        &mut self,
        sys: &TransitionSystem,
        o: OseqId,
        level: usize,
        state: &[Lit],
        dir: Direction,
        hints: &[Cube],
    ) -> bool {
        let mut assumptions = vec![self.flag_of(o, level)];
        let lit = |l: Lit| if dir.is_forward() { sys.prime(l) } else { l };
        for group in hints {
            assumptions.extend(group.iter().map(|&l| lit(l)));
        }
        assumptions.extend(state.iter().map(|&l| lit(l)));
        self.last_assumptions = assumptions;
        self.sat.solve(&self.last_assumptions)
    }

    /// Can `latches` trigger the bad output combinationally (with some
    /// input)? Used by the initial check and the backward boundary check.
    pub fn solve_with_bad(&mut self, latches: &[Lit], bad: Lit) -> bool {
        let mut assumptions = latches.to_vec();
        assumptions.push(bad);
        self.last_assumptions = assumptions;
        self.sat.solve(&self.last_assumptions)
    }

    /// Permanently exclude a latch valuation from every future model.
    pub fn block_state(&mut self, latches: &[Lit]) {
        self.sat.add_clause(&negate(latches));
    }

    /// After SAT: the discovered state as (latches, inputs). Going backward
    /// the latch cube is the *next* state, reconstructed through the prime
    /// map; going forward it is the unprimed (predecessor) valuation.
    pub fn take_state(&mut self, sys: &TransitionSystem, dir: Direction) -> (Cube, Cube) {
        let model = self.sat.assignment(sys.max_var());
        let ni = sys.num_inputs();
        let nl = sys.num_latches();
        let inputs: Cube = model[..ni].to_vec();
        let latches: Cube = if dir.is_forward() {
            model[ni..ni + nl].to_vec()
        } else {
            (ni as Var + 1..=(ni + nl) as Var)
                .map(|v| {
                    let p = sys.prime(v);
                    let val = model[var(p) as usize - 1];
                    if p == val {
                        v
                    } else {
                        -v
                    }
                })
                .collect()
        };
        (latches, inputs)
    }

    /// After SAT: the raw input+latch assignment of the current step.
    pub fn full_assignment(&self, sys: &TransitionSystem) -> Vec<Lit> {
        self.sat
            .assignment((sys.num_inputs() + sys.num_latches()) as Var)
    }

    /// After SAT: just the input assignment of the current step.
    pub fn model_inputs(&self, sys: &TransitionSystem) -> Cube {
        self.sat.assignment(sys.num_inputs() as Var)
    }

    /// After UNSAT: the failed assumptions shrunk to a cube over the
    /// queried state's literals. Going backward the assumptions already are
    /// state literals and only need the latch filter; going forward they
    /// are primed, and each is mapped back to the source literal that
    /// produced it (the raw inverse next-state map alone can yield
    /// contradictory cubes when latches share a next-state variable). The
    /// flag reports whether every core literal was accounted for, i.e.
    /// whether the cube is still a valid global reason.
    pub fn conflict(
        &mut self,
        sys: &TransitionSystem,
        dir: Direction,
        source: &[Lit],
    ) -> (Cube, bool) {
        let core: Vec<Lit> = {
            let assumptions = std::mem::take(&mut self.last_assumptions);
            let raw = self.sat.failed_assumptions(&assumptions);
            self.last_assumptions = assumptions;
            // activation literals are bookkeeping, not state
            raw.into_iter().filter(|&l| var(l) <= sys.max_var()).collect()
        };
        if dir.is_forward() {
            let cube: Cube = source
                .iter()
                .copied()
                .filter(|&l| core.contains(&sys.prime(l)))
                .collect();
            let exact = core
                .iter()
                .all(|&c| cube.iter().any(|&l| sys.prime(l) == c));
            (cube, exact)
        } else {
            sys.shrink_to_latch_vars(&core)
        }
    }

    /// After UNSAT of a bad-output query: the failed assumptions minus the
    /// bad literal itself, sorted. The assumption was a pure latch cube, so
    /// no shrinking is needed.
    pub fn conflict_without_bad(&mut self, bad: Lit) -> Cube {
        let assumptions = std::mem::take(&mut self.last_assumptions);
        let mut core: Cube = self
            .sat
            .failed_assumptions(&assumptions)
            .into_iter()
            .filter(|&l| l != bad)
            .collect();
        self.last_assumptions = assumptions;
        core.sort_unstable_by(var_cmp);
        core.dedup();
        core
    }
}
