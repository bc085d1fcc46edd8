// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! The trait defining a very basic interface to incremental SAT solvers.

use aig::cube::{Lit, Var};

/// An incremental SAT solver with assumptions and failed-assumption
/// extraction. Fresh variables come into existence simply by being used, so
/// callers allocating activation literals only need to hand out unused
/// variable numbers.
///
/// Query protocol: `solve` is a blocking call; after it returns `true`,
/// `value` reads the model, and after it returns `false`, `failed` reports
/// which assumptions the unsatisfiability depends on. Calling either in the
/// wrong state is a programming error.
pub trait IncrementalSolver: Default {
    /// Add a clause (a disjunction of literals) permanently.
    fn add_clause(&mut self, clause: &[Lit]);

    /// Solve under the given assumptions. `true` means satisfiable.
    fn solve(&mut self, assumptions: &[Lit]) -> bool;

    /// The model value of a literal after a satisfiable query; `None` when
    /// the variable was never mentioned.
    fn value(&self, lit: Lit) -> Option<bool>;

    /// After an unsatisfiable query, was this assumption used in the proof?
    fn failed(&mut self, lit: Lit) -> bool;

    /// The full assignment over variables `1..=max_var` as signed literals,
    /// unmentioned variables defaulting to false.
    fn assignment(&self, max_var: Var) -> Vec<Lit> {
        (1..=max_var)
            .map(|v| if self.value(v).unwrap_or(false) { v } else { -v })
            .collect()
    }

    /// The subset of `assumptions` the last unsatisfiability depends on, in
    /// assumption order.
    fn failed_assumptions(&mut self, assumptions: &[Lit]) -> Vec<Lit> {
        assumptions
            .iter()
            .copied()
            .filter(|&l| self.failed(l))
            .collect()
    }
}
