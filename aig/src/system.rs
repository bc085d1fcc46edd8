// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! The clausal transition system handed to the reachability engine.
//!
//! Translation from the and-inverter graph follows the usual Tseitin-style
//! scheme, with two reserved variables past the circuit maximum encoding the
//! constants (TRUE, then FALSE). Clauses are kept in three contiguous
//! partitions (constraint-derived, output-derived, latch-next-derived) so
//! solver roles can assert exactly the ranges they need. Constant values are
//! propagated through the gates first, so constant gates never produce
//! clauses and references to them collapse to the reserved variables.

use crate::circuit::{eval_lit, raw_not, raw_sign, raw_var, Aig, RawLit, FALSE_LIT, TRUE_LIT};
use crate::cube::{var, var_cmp, Cube, Lit, Var};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// A disjunction of literals.
pub type Clause = Vec<Lit>;

/// Ways a circuit can fail to describe a checkable system.
#[derive(Error, Debug)]
pub enum SystemError {
    /// The requested bad index names no output or bad literal.
    #[error("no bad literal at index {0}")]
    UndefinedBad(usize),
    /// A literal references a variable that is neither input, latch, nor
    /// defined gate.
    #[error("literal references undefined variable {0}")]
    UndefinedSignal(Var),
}

/// A synchronous circuit in clausal form: the Model collaborator consumed by
/// the search engine.
#[derive(Debug, Clone)]
pub struct TransitionSystem {
    num_inputs: usize,
    num_latches: usize,
    max_var: Var,
    true_var: Var,
    false_var: Var,
    init: Cube,
    bad: Lit,
    constraints: Vec<Lit>,
    cls: Vec<Clause>,
    outputs_start: usize,
    latches_start: usize,
    next_map: HashMap<Var, Lit>,
    prev_map: HashMap<Var, Vec<Lit>>,
}

impl TransitionSystem {
    /// Translate a circuit, checking the property at `bad_index` (a `B`
    /// entry when present, otherwise an output).
    pub fn new(aig: &Aig, bad_index: usize) -> Result<TransitionSystem, SystemError> {
        Builder::new(aig).build(bad_index)
    }

    /// Number of circuit inputs.
    pub fn num_inputs(&self) -> usize {
        self.num_inputs
    }

    /// Number of latches.
    pub fn num_latches(&self) -> usize {
        self.num_latches
    }

    /// Largest variable used by the translation; roles allocate their
    /// activation literals above this.
    pub fn max_var(&self) -> Var {
        self.max_var
    }

    /// The reserved always-true variable.
    pub fn true_var(&self) -> Var {
        self.true_var
    }

    /// The reserved always-false variable.
    pub fn false_var(&self) -> Var {
        self.false_var
    }

    /// The literal whose satisfaction violates the property.
    pub fn bad_lit(&self) -> Lit {
        self.bad
    }

    /// Invariant-constraint literals (asserted in the constraint partition).
    pub fn constraint_lits(&self) -> &[Lit] {
        &self.constraints
    }

    /// The initial latch valuation as a full sorted cube.
    pub fn initial_cube(&self) -> &Cube {
        &self.init
    }

    /// Clauses derived from the constraint cones (plus latch-equivalence
    /// bookkeeping).
    pub fn constraint_clauses(&self) -> &[Clause] {
        &self.cls[..self.outputs_start]
    }

    /// Clauses derived from the output/bad cones.
    pub fn output_clauses(&self) -> &[Clause] {
        &self.cls[self.outputs_start..self.latches_start]
    }

    /// Clauses derived from the latch next-state cones, including the
    /// reserved-constant units.
    pub fn latch_clauses(&self) -> &[Clause] {
        &self.cls[self.latches_start..]
    }

    /// Is `v` a latch variable?
    pub fn is_latch_var(&self, v: Var) -> bool {
        v > self.num_inputs as Var && v <= (self.num_inputs + self.num_latches) as Var
    }

    /// Is `v` an input variable?
    pub fn is_input_var(&self, v: Var) -> bool {
        v >= 1 && v <= self.num_inputs as Var
    }

    /// The next-state literal of a latch literal. Every latch variable has
    /// one; asking for anything else is a broken engine invariant.
    pub fn prime(&self, lit: Lit) -> Lit {
        let next = self
            .next_map
            .get(&var(lit))
            .unwrap_or_else(|| panic!("variable {} has no next-state mapping", var(lit)));
        if lit > 0 {
            *next
        } else {
            -*next
        }
    }

    /// The latch literals whose next-state function is (the variable of)
    /// `lit`; empty when none map to it.
    pub fn previous(&self, lit: Lit) -> Vec<Lit> {
        match self.prev_map.get(&var(lit)) {
            None => vec![],
            Some(vars) if lit > 0 => vars.clone(),
            Some(vars) => vars.iter().map(|l| -l).collect(),
        }
    }

    /// Restrict an unsat core to latch variables, dropping the bad literal.
    /// The flag reports whether nothing else was lost, i.e. whether the
    /// result is still a valid global reason.
    pub fn shrink_to_latch_vars(&self, core: &[Lit]) -> (Cube, bool) {
        let mut res = Cube::new();
        let mut exact = true;
        for &l in core {
            if self.is_latch_var(var(l)) {
                res.push(l);
            } else if var(l) == var(self.bad) {
                continue;
            } else if var(l) <= self.max_var {
                exact = false;
            }
        }
        res.sort_unstable_by(var_cmp);
        res.dedup();
        (res, exact)
    }

    /// Map an unsat core over primed variables back to the latches feeding
    /// them. A literal with no previous variables is dropped and reported
    /// through the flag.
    pub fn shrink_to_previous_vars(&self, core: &[Lit]) -> (Cube, bool) {
        let mut res = Cube::new();
        let mut exact = true;
        for &l in core {
            let prev = self.previous(l);
            if prev.is_empty() {
                exact = false;
            } else {
                res.extend(prev);
            }
        }
        res.sort_unstable_by(var_cmp);
        res.dedup();
        (res, exact)
    }
}

struct Builder<'a> {
    aig: &'a Aig,
    trues: HashSet<RawLit>,
    cls: Vec<Clause>,
    emitted: HashSet<Var>,
    true_var: Var,
    false_var: Var,
    max_var: Var,
}

impl<'a> Builder<'a> {
    fn new(aig: &'a Aig) -> Self {
        let true_var = aig.max_var + 1;
        let false_var = aig.max_var + 2;
        let mut b = Builder {
            aig,
            trues: HashSet::new(),
            cls: vec![],
            emitted: HashSet::new(),
            true_var,
            false_var,
            max_var: false_var,
        };
        b.collect_trues();
        b
    }

    /// Propagate constants through the gates (they are in topological
    /// order). A constant gate never becomes a clause.
    fn collect_trues(&mut self) {
        for gate in &self.aig.ands {
            if self.is_true(gate.rhs0) && self.is_true(gate.rhs1) {
                self.trues.insert(Aig::lit(gate.lhs));
            } else if self.is_false(gate.rhs0) || self.is_false(gate.rhs1) {
                self.trues.insert(raw_not(Aig::lit(gate.lhs)));
            }
        }
    }

    fn is_true(&self, lit: RawLit) -> bool {
        lit == TRUE_LIT || self.trues.contains(&lit)
    }

    fn is_false(&self, lit: RawLit) -> bool {
        lit == FALSE_LIT || self.trues.contains(&raw_not(lit))
    }

    /// The solver literal of a raw literal; constants collapse to the
    /// reserved variables.
    fn solver_lit(&self, lit: RawLit) -> Lit {
        if self.is_true(lit) {
            self.true_var
        } else if self.is_false(lit) {
            self.false_var
        } else if raw_sign(lit) {
            -(raw_var(lit))
        } else {
            raw_var(lit)
        }
    }

    fn gate_of(&self, v: Var) -> Option<usize> {
        let first_gate = (self.aig.num_inputs + self.aig.num_latches()) as Var + 1;
        if v < first_gate || v > self.aig.max_var {
            return None;
        }
        self.aig.ands.iter().position(|g| g.lhs == v)
    }

    fn check_defined(&self, lit: RawLit) -> Result<(), SystemError> {
        if self.is_true(lit) || self.is_false(lit) {
            return Ok(());
        }
        let v = raw_var(lit);
        let nil = (self.aig.num_inputs + self.aig.num_latches()) as Var;
        if v >= 1 && v <= nil {
            return Ok(());
        }
        if self.gate_of(v).is_some() {
            return Ok(());
        }
        Err(SystemError::UndefinedSignal(v))
    }

    /// Emit the clauses of every not-yet-emitted, non-constant gate in the
    /// cone of `root`, inputs first.
    fn emit_cone(&mut self, root: RawLit) -> Result<(), SystemError> {
        self.check_defined(root)?;
        if self.is_true(root) || self.is_false(root) {
            return Ok(());
        }
        let Some(idx) = self.gate_of(raw_var(root)) else {
            return Ok(());
        };
        let gate = self.aig.ands[idx];
        if self.emitted.contains(&gate.lhs) {
            return Ok(());
        }
        self.emitted.insert(gate.lhs);
        self.emit_cone(gate.rhs0)?;
        self.emit_cone(gate.rhs1)?;

        let g = gate.lhs;
        if self.is_true(gate.rhs0) {
            let b = self.solver_lit(gate.rhs1);
            self.cls.push(vec![g, -b]);
            self.cls.push(vec![-g, b]);
        } else if self.is_true(gate.rhs1) {
            let a = self.solver_lit(gate.rhs0);
            self.cls.push(vec![g, -a]);
            self.cls.push(vec![-g, a]);
        } else {
            let a = self.solver_lit(gate.rhs0);
            let b = self.solver_lit(gate.rhs1);
            self.cls.push(vec![g, -a, -b]);
            self.cls.push(vec![-g, a]);
            self.cls.push(vec![-g, b]);
        }
        Ok(())
    }

    /// Latches that share a next-state variable must agree, except in the
    /// initial state, which the circuit is allowed to leave inconsistent.
    fn latch_equivalences(&mut self, prev_map: &HashMap<Var, Vec<Lit>>, init: &Cube) {
        let mut groups: Vec<&Vec<Lit>> = prev_map.values().filter(|v| v.len() > 1).collect();
        if groups.is_empty() {
            return;
        }
        groups.sort_by_key(|v| var(v[0]));
        self.max_var += 1;
        let same = self.max_var;
        for group in groups {
            for w in group.windows(2) {
                let (a, b) = (w[0], w[1]);
                self.cls.push(vec![a, -b, -same]);
                self.cls.push(vec![-a, b, -same]);
            }
        }
        self.max_var += 1;
        let at_init = self.max_var;
        for &l in init {
            self.cls.push(vec![l, -at_init]);
        }
        self.cls.push(vec![same, at_init]);
    }

    fn build(mut self, bad_index: usize) -> Result<TransitionSystem, SystemError> {
        let aig = self.aig;
        let num_inputs = aig.num_inputs;
        let num_latches = aig.num_latches();

        let init: Cube = aig
            .latches
            .iter()
            .map(|l| if l.reset { l.var } else { -l.var })
            .collect();

        let mut next_map = HashMap::new();
        let mut prev_map: HashMap<Var, Vec<Lit>> = HashMap::new();
        for latch in &aig.latches {
            self.check_defined(latch.next)?;
            let next = self.solver_lit(latch.next);
            next_map.insert(latch.var, next);
            let entry = prev_map.entry(var(next)).or_default();
            entry.push(if next > 0 { latch.var } else { -latch.var });
        }

        // constraint partition
        let mut constraints = Vec::new();
        for &c in &aig.constraints {
            self.emit_cone(c)?;
            let lit = self.solver_lit(c);
            constraints.push(lit);
            self.cls.push(vec![lit]);
        }
        self.latch_equivalences(&prev_map, &init);
        let outputs_start = self.cls.len();

        // output partition
        let bad_raw = aig.bad_lit(bad_index).ok_or(SystemError::UndefinedBad(bad_index))?;
        for &o in aig.bads.iter().chain(&aig.outputs) {
            self.emit_cone(o)?;
        }
        let bad = self.solver_lit(bad_raw);
        let latches_start = self.cls.len();

        // latch partition
        for latch in &aig.latches {
            self.emit_cone(latch.next)?;
        }
        self.cls.push(vec![self.true_var]);
        self.cls.push(vec![-self.false_var]);

        Ok(TransitionSystem {
            num_inputs,
            num_latches,
            max_var: self.max_var,
            true_var: self.true_var,
            false_var: self.false_var,
            init,
            bad,
            constraints,
            cls: self.cls,
            outputs_start,
            latches_start,
            next_map,
            prev_map,
        })
    }
}

/// Brute-force reachability over the explicit state space, honoring the
/// invariant constraints (a step or a violation only counts while every
/// constraint holds). Only usable for small circuits; the tests use it as
/// an oracle against the symbolic engine.
pub fn reachable_states(aig: &Aig, bad_index: usize) -> (Vec<Vec<bool>>, bool) {
    let num_inputs = aig.num_inputs;
    let bad = aig.bad_lit(bad_index).expect("bad index in range");
    let mut seen: HashSet<Vec<bool>> = HashSet::new();
    let mut frontier = vec![aig.reset_state()];
    let mut order = vec![];
    let mut bad_reachable = false;
    while let Some(state) = frontier.pop() {
        if !seen.insert(state.clone()) {
            continue;
        }
        order.push(state.clone());
        for input_bits in 0..(1u32 << num_inputs) {
            let inputs: Vec<bool> = (0..num_inputs).map(|i| input_bits & (1 << i) != 0).collect();
            let values = aig.eval(&state, &inputs);
            if aig.constraints.iter().any(|&c| !eval_lit(&values, c)) {
                continue;
            }
            if eval_lit(&values, bad) {
                bad_reachable = true;
            }
            frontier.push(aig.step(&state, &inputs));
        }
    }
    (order, bad_reachable)
}
