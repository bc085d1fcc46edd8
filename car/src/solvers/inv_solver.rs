// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! The invariant solver: decides whether a frame is subsumed by the union
//! of the frames below it, which is exactly the fixpoint condition.
//!
//! Per level the sweep asserts one of two gated constraint shapes: *or*
//! ("the state is blocked somewhere in this frame") for levels already
//! swept, and *and* ("the state is blocked nowhere in this frame") for the
//! level under test. Unsatisfiability of `or(0) ∧ … ∧ or(L−1) ∧ and(L)`
//! means frame `L` contributes no state the earlier frames do not already
//! cover. The and-constraint is released by retiring its gate, so a level
//! can be re-tested as an or-level in the same sweep. A sweep always runs
//! on a fresh instance, so an abandoned sweep cannot leave a half-toggled
//! constraint behind.

use crate::sequence::Frame;
use aig::cube::{Lit, Var};
use aig::TransitionSystem;
use solver::IncrementalSolver;

/// The fixpoint-test role.
pub struct InvSolver<S: IncrementalSolver> {
    sat: S,
    next_flag: Var,
    assumptions: Vec<Lit>,
    and_flags: Vec<Lit>,
}

impl<S: IncrementalSolver> InvSolver<S> {
    /// Load only the constraint partition: the fixpoint test talks about
    /// state sets, not transitions.
    pub fn new(sys: &TransitionSystem) -> Self {
        let mut sat = S::default();
        for clause in sys.constraint_clauses() {
            sat.add_clause(clause);
        }
        // the reserved constants may occur in frame cubes
        sat.add_clause(&[sys.true_var()]);
        sat.add_clause(&[-sys.false_var()]);
        InvSolver {
            sat,
            next_flag: sys.max_var() + 1,
            assumptions: vec![],
            and_flags: vec![],
        }
    }

    fn fresh_flag(&mut self) -> Lit {
        let flag = self.next_flag;
        self.next_flag += 1;
        flag
    }

    /// Assert (gated, from now on) that the state is blocked by some cube
    /// of `frame`. An empty frame blocks nothing, making the sweep
    /// unsatisfiable from this level on.
    pub fn add_or_frame(&mut self, frame: &Frame) {
        let mut clause = Vec::with_capacity(frame.len() + 1);
        for cube in frame {
            let cube_flag = self.fresh_flag();
            for &l in cube {
                self.sat.add_clause(&[-cube_flag, l]);
            }
            clause.push(cube_flag);
        }
        let frame_flag = self.fresh_flag();
        clause.push(-frame_flag);
        self.sat.add_clause(&clause);
        self.assumptions.push(frame_flag);
    }

    /// Assert (gated, until released) that the state is blocked by no cube
    /// of `frame`.
    pub fn add_and_frame(&mut self, frame: &Frame) {
        let frame_flag = self.fresh_flag();
        for cube in frame {
            let mut clause: Vec<Lit> = cube.iter().map(|&l| -l).collect();
            clause.push(-frame_flag);
            self.sat.add_clause(&clause);
        }
        self.assumptions.push(frame_flag);
        self.and_flags.push(frame_flag);
    }

    /// Retire the most recent and-constraint. Pops must pair with
    /// [`InvSolver::add_and_frame`] calls; anything else is a broken sweep.
    pub fn release_and(&mut self) {
        let flag = self.and_flags.pop().expect("no and-constraint to release");
        let popped = self.assumptions.pop();
        assert_eq!(popped, Some(flag), "and-constraint released out of order");
        self.sat.add_clause(&[-flag]);
    }

    /// Solve under the current constraint stack.
    pub fn solve(&mut self) -> bool {
        self.sat.solve(&self.assumptions.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aig::Aig;
    use solver::CadicalSolver;

    fn sys() -> TransitionSystem {
        let mut aig = Aig::new(0);
        let l1 = aig.add_latch(false);
        let l2 = aig.add_latch(false);
        aig.set_next(l1, Aig::lit(l1));
        aig.set_next(l2, Aig::lit(l2));
        aig.outputs.push(Aig::lit(l1));
        TransitionSystem::new(&aig, 0).unwrap()
    }

    #[test]
    fn subsumed_frame_is_a_fixpoint() {
        let sys = sys();
        let mut inv: InvSolver<CadicalSolver> = InvSolver::new(&sys);
        // frame 0 blocks only (1,1); frame 1 blocks all of L1=1
        inv.add_or_frame(&vec![vec![1, 2]]);
        inv.add_and_frame(&vec![vec![1]]);
        // every state frame 1 leaves unblocked (L1=0) is also left
        // unblocked by frame 0, so level 1 contributes nothing new
        assert!(!inv.solve());
    }

    #[test]
    fn growing_frame_is_not_a_fixpoint() {
        let sys = sys();
        let mut inv: InvSolver<CadicalSolver> = InvSolver::new(&sys);
        inv.add_or_frame(&vec![vec![1]]);
        // frame 1 blocks L2=1, which covers (0,1), not covered by frame 0
        inv.add_and_frame(&vec![vec![2]]);
        assert!(inv.solve(), "(1, 0) is new at level 1");
    }

    #[test]
    fn release_allows_retesting_levels() {
        let sys = sys();
        let mut inv: InvSolver<CadicalSolver> = InvSolver::new(&sys);
        inv.add_or_frame(&vec![vec![1]]);
        inv.add_and_frame(&vec![vec![2]]);
        assert!(inv.solve());
        inv.release_and();
        inv.add_or_frame(&vec![vec![2]]);
        inv.add_and_frame(&vec![vec![1], vec![2]]);
        // every state blocked at level 2 is blocked at 0 or 1
        assert!(!inv.solve());
    }

    #[test]
    #[should_panic(expected = "no and-constraint to release")]
    fn unbalanced_release_is_a_protocol_error() {
        let sys = sys();
        let mut inv: InvSolver<CadicalSolver> = InvSolver::new(&sys);
        inv.release_and();
    }
}
