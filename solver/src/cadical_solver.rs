// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Backend implementing the capability on the [CaDiCaL][cadical] SAT solver.
//!
//! [cadical]: https://fmv.jku.at/cadical/

use crate::basics::IncrementalSolver;
use aig::cube::Lit;
use cadical::Solver;

/// An in-process CaDiCaL instance.
#[derive(Default)]
pub struct CadicalSolver {
    solver: Solver,
    queries: usize,
}

impl CadicalSolver {
    /// How many queries this instance has answered.
    pub fn num_queries(&self) -> usize {
        self.queries
    }
}

impl IncrementalSolver for CadicalSolver {
    fn add_clause(&mut self, clause: &[Lit]) {
        self.solver.add_clause(clause.iter().copied());
    }

    fn solve(&mut self, assumptions: &[Lit]) -> bool {
        self.queries += 1;
        let res = self
            .solver
            .solve_with(assumptions.iter().copied())
            // no limits are ever configured, so an indeterminate answer
            // cannot happen
            .expect("cadical returned no verdict");
        log::trace!(
            "query {} ({} assumptions): {}",
            self.queries,
            assumptions.len(),
            if res { "SAT" } else { "UNSAT" }
        );
        res
    }

    fn value(&self, lit: Lit) -> Option<bool> {
        self.solver.value(lit)
    }

    fn failed(&mut self, lit: Lit) -> bool {
        self.solver.failed(lit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sat_and_model() {
        let mut s = CadicalSolver::default();
        s.add_clause(&[1, 2]);
        s.add_clause(&[-1]);
        assert!(s.solve(&[]));
        assert_eq!(s.value(2), Some(true));
        assert_eq!(s.assignment(2), vec![-1, 2]);
    }

    #[test]
    fn unsat_core_from_assumptions() {
        let mut s = CadicalSolver::default();
        s.add_clause(&[-1, 2]);
        s.add_clause(&[-2, 3]);
        assert!(!s.solve(&[1, -3, 4]));
        let core = s.failed_assumptions(&[1, -3, 4]);
        assert!(core.contains(&1));
        assert!(core.contains(&-3));
        assert!(!core.contains(&4));
    }

    #[test]
    fn incremental_reuse_across_verdicts() {
        let mut s = CadicalSolver::default();
        s.add_clause(&[1, 2]);
        assert!(s.solve(&[-1]));
        assert_eq!(s.value(2), Some(true));
        s.add_clause(&[-2]);
        assert!(!s.solve(&[-1]));
        assert!(s.solve(&[1]));
        assert_eq!(s.num_queries(), 3);
    }
}
