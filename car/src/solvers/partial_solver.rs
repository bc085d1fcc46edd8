// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! The partial solver: shrinks a full assignment to a partial state that
//! still preserves the reachability it was extracted for.
//!
//! A forward discovery `t` was produced as a predecessor of a known state
//! `s`: since the circuit is deterministic, `t ∧ T ∧ ¬s′` is unsatisfiable,
//! and the failed assumptions restricted to input/latch variables are a
//! partial `t` every completion of which still steps into `s` under the
//! recorded inputs. Start states generalize against the bad predicate
//! instead. Each query's helper clause is guarded by a fresh flag and
//! retired afterwards.

use aig::cube::{var_cmp, Cube, Lit, Var};
use aig::TransitionSystem;
use solver::IncrementalSolver;

/// The generalization role.
pub struct PartialSolver<S: IncrementalSolver> {
    sat: S,
    next_flag: Var,
}

impl<S: IncrementalSolver> PartialSolver<S> {
    /// Load all three transition-relation partitions.
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
        PartialSolver {
            sat,
            next_flag: sys.max_var() + 1,
        }
    }

    fn fresh_flag(&mut self) -> Lit {
        let flag = self.next_flag;
        self.next_flag += 1;
        flag
    }

    /// Generalize the full assignment of a state known to step into
    /// `prior`. `None` means generalization failed (the query was
    /// unexpectedly satisfiable or the core kept no latch literal); the
    /// caller falls back to the full state, which is always sound.
    pub fn generalize_from_prior(
        &mut self,
        sys: &TransitionSystem,
        full: &[Lit],
        prior: &[Lit],
    ) -> Option<(Cube, Cube)> {
        let flag = self.fresh_flag();
        let mut clause: Vec<Lit> = vec![-flag];
        clause.extend(prior.iter().map(|&l| -sys.prime(l)));
        self.sat.add_clause(&clause);

        let mut assumptions = full.to_vec();
        assumptions.push(flag);
        let res = if self.sat.solve(&assumptions) {
            log::debug!("generalization query was satisfiable, keeping the full state");
            None
        } else {
            let core = self.sat.failed_assumptions(&assumptions);
            self.split(sys, &core)
        };
        // retire this query's helper clause
        self.sat.add_clause(&[-flag]);
        res
    }

    /// Generalize a start state's full assignment relative to the bad
    /// predicate: the core of `t ∧ ¬bad` keeps exactly the literals that
    /// force the violation.
    pub fn generalize_start(
        &mut self,
        sys: &TransitionSystem,
        full: &[Lit],
    ) -> Option<(Cube, Cube)> {
        let mut assumptions = full.to_vec();
        assumptions.push(-sys.bad_lit());
        if self.sat.solve(&assumptions) {
            log::debug!("start-state generalization was satisfiable, keeping the full state");
            return None;
        }
        let core = self.sat.failed_assumptions(&assumptions);
        self.split(sys, &core)
    }

    /// Split a core into sorted (latch, input) cubes, dropping everything
    /// else (the helper flag, the bad literal).
    fn split(&self, sys: &TransitionSystem, core: &[Lit]) -> Option<(Cube, Cube)> {
        let mut latches = Cube::new();
        let mut inputs = Cube::new();
        for &l in core {
            if sys.is_latch_var(aig::cube::var(l)) {
                latches.push(l);
            } else if sys.is_input_var(aig::cube::var(l)) {
                inputs.push(l);
            }
        }
        if latches.is_empty() {
            return None;
        }
        latches.sort_unstable_by(var_cmp);
        inputs.sort_unstable_by(var_cmp);
        Some((latches, inputs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aig::Aig;
    use solver::CadicalSolver;

    /// `L1' = L2, L2' = L1 | in`, bad = `L1 & L2`.
    fn sys() -> TransitionSystem {
        let mut aig = Aig::new(1);
        let l1 = aig.add_latch(false);
        let l2 = aig.add_latch(false);
        aig.set_next(l1, Aig::lit(l2));
        let or = aig.add_or(Aig::lit(l1), Aig::lit(1));
        aig.set_next(l2, or);
        let bad = aig.add_and(Aig::lit(l1), Aig::lit(l2));
        aig.bads.push(bad);
        TransitionSystem::new(&aig, 0).unwrap()
    }

    #[test]
    fn predecessor_generalization_round_trips() {
        let sys = sys();
        let mut partial: PartialSolver<CadicalSolver> = PartialSolver::new(&sys);
        // (0,1) with input 1 steps into (1,1)
        let full = vec![1, -2, 3];
        let (latches, _inputs) = partial
            .generalize_from_prior(&sys, &full, &[2, 3])
            .expect("a deterministic step must generalize");
        // L2=1 is indispensable: it alone forces L1' = 1
        assert!(latches.contains(&3));
        // round-trip: the partial state plus the recorded inputs must
        // still force the transition into (1,1)
        let mut check: CadicalSolver = Default::default();
        for clause in sys
            .constraint_clauses()
            .iter()
            .chain(sys.output_clauses())
            .chain(sys.latch_clauses())
        {
            check.add_clause(clause);
        }
        check.add_clause(&[-sys.prime(2), -sys.prime(3), 9]);
        let mut assumptions = latches.clone();
        assumptions.push(1);
        assumptions.push(-9);
        assert!(!check.solve(&assumptions));
    }

    #[test]
    fn start_state_generalization_forces_bad() {
        let sys = sys();
        let mut partial: PartialSolver<CadicalSolver> = PartialSolver::new(&sys);
        let full = vec![-1, 2, 3];
        let (latches, _) = partial
            .generalize_start(&sys, &full)
            .expect("the bad cone pins both latches");
        assert_eq!(latches, vec![2, 3]);
    }

    #[test]
    fn helper_clauses_are_retired() {
        let sys = sys();
        let mut partial: PartialSolver<CadicalSolver> = PartialSolver::new(&sys);
        let full = vec![1, -2, 3];
        partial.generalize_from_prior(&sys, &full, &[2, 3]);
        // a second, unrelated query must not see the first one's clause
        let (latches, _) = partial
            .generalize_from_prior(&sys, &[1, 2, 3], &[2, 3])
            .expect("still unsatisfiable");
        assert!(!latches.is_empty());
    }
}
