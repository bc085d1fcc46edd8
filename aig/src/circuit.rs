// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! The and-inverter graph itself, plus a concrete-state simulator.
//!
//! Variables are numbered the AIGER way: `1..=num_inputs` are inputs, the
//! next `num_latches` variables are latches, and-gate variables follow. A
//! raw AIGER literal is `2 * var`, plus one when negated; `0` and `1` are
//! the constants false and true.

use crate::cube::Var;

/// A raw AIGER literal (`2 * var + sign`).
pub type RawLit = u32;

/// The constant-false raw literal.
pub const FALSE_LIT: RawLit = 0;
/// The constant-true raw literal.
pub const TRUE_LIT: RawLit = 1;

/// The variable of a raw literal.
#[inline]
pub fn raw_var(lit: RawLit) -> Var {
    (lit >> 1) as Var
}

/// Negate a raw literal.
#[inline]
pub fn raw_not(lit: RawLit) -> RawLit {
    lit ^ 1
}

/// Is this raw literal negated?
#[inline]
pub fn raw_sign(lit: RawLit) -> bool {
    lit & 1 == 1
}

/// A latch: its variable, its next-state function, and its reset value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Latch {
    /// The latch variable.
    pub var: Var,
    /// Raw literal giving the next-state function.
    pub next: RawLit,
    /// Reset value (the original model only supports constant resets).
    pub reset: bool,
}

/// An and-gate `lhs = rhs0 & rhs1` with `lhs` strictly above both inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AndGate {
    /// The gate's output variable.
    pub lhs: Var,
    /// First input, as a raw literal.
    pub rhs0: RawLit,
    /// Second input, as a raw literal.
    pub rhs1: RawLit,
}

/// An and-inverter graph as read from an `.aag` file or built by hand.
#[derive(Debug, Clone, Default)]
pub struct Aig {
    /// Largest variable in use.
    pub max_var: Var,
    /// Number of input variables.
    pub num_inputs: usize,
    /// Latches in declaration order; their variables are contiguous.
    pub latches: Vec<Latch>,
    /// Output raw literals.
    pub outputs: Vec<RawLit>,
    /// Bad-state raw literals (AIGER 1.9 `B` section).
    pub bads: Vec<RawLit>,
    /// Invariant-constraint raw literals (AIGER 1.9 `C` section).
    pub constraints: Vec<RawLit>,
    /// And-gates in topological order (AIGER guarantees this on disk).
    pub ands: Vec<AndGate>,
}

impl Aig {
    /// An empty circuit with `num_inputs` inputs.
    pub fn new(num_inputs: usize) -> Self {
        Aig {
            max_var: num_inputs as Var,
            num_inputs,
            ..Default::default()
        }
    }

    /// Number of latches.
    pub fn num_latches(&self) -> usize {
        self.latches.len()
    }

    /// The positive raw literal of a variable.
    pub fn lit(var: Var) -> RawLit {
        (var as RawLit) << 1
    }

    /// Append a latch and return its variable. Latches must be added before
    /// any gates so that variable ranges stay contiguous.
    pub fn add_latch(&mut self, reset: bool) -> Var {
        assert!(self.ands.is_empty(), "latches must precede and-gates");
        self.max_var += 1;
        self.latches.push(Latch {
            var: self.max_var,
            next: FALSE_LIT,
            reset,
        });
        self.max_var
    }

    /// Set the next-state function of a latch.
    pub fn set_next(&mut self, latch: Var, next: RawLit) {
        let idx = latch as usize - self.num_inputs - 1;
        self.latches[idx].next = next;
    }

    /// Append the gate `rhs0 & rhs1` and return its positive raw literal.
    pub fn add_and(&mut self, rhs0: RawLit, rhs1: RawLit) -> RawLit {
        self.max_var += 1;
        self.ands.push(AndGate {
            lhs: self.max_var,
            rhs0,
            rhs1,
        });
        Self::lit(self.max_var)
    }

    /// Append gates computing `a | b` and return the raw literal.
    pub fn add_or(&mut self, a: RawLit, b: RawLit) -> RawLit {
        raw_not(self.add_and(raw_not(a), raw_not(b)))
    }

    /// The reset valuation of the latches, in declaration order.
    pub fn reset_state(&self) -> Vec<bool> {
        self.latches.iter().map(|l| l.reset).collect()
    }

    /// Evaluate every variable under the given latch and input valuations.
    /// The result is indexed by variable (slot 0 is unused).
    pub fn eval(&self, latches: &[bool], inputs: &[bool]) -> Vec<bool> {
        assert_eq!(latches.len(), self.num_latches());
        assert_eq!(inputs.len(), self.num_inputs);
        let mut values = vec![false; self.max_var as usize + 1];
        values[1..=self.num_inputs].copy_from_slice(inputs);
        let base = self.num_inputs + 1;
        values[base..base + latches.len()].copy_from_slice(latches);
        for gate in &self.ands {
            values[gate.lhs as usize] =
                eval_lit(&values, gate.rhs0) && eval_lit(&values, gate.rhs1);
        }
        values
    }

    /// One synchronous step: the latch valuation after applying `inputs`.
    pub fn step(&self, latches: &[bool], inputs: &[bool]) -> Vec<bool> {
        let values = self.eval(latches, inputs);
        self.latches
            .iter()
            .map(|l| eval_lit(&values, l.next))
            .collect()
    }

    /// The value of the bad literal at index `idx` (falling back to the
    /// plain outputs when no `B` section is present, as the original does).
    pub fn bad_lit(&self, idx: usize) -> Option<RawLit> {
        if !self.bads.is_empty() {
            self.bads.get(idx).copied()
        } else {
            self.outputs.get(idx).copied()
        }
    }
}

/// Evaluate a raw literal against a value table indexed by variable.
pub fn eval_lit(values: &[bool], lit: RawLit) -> bool {
    match lit {
        FALSE_LIT => false,
        TRUE_LIT => true,
        _ => values[raw_var(lit) as usize] ^ raw_sign(lit),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `L1' = L2, L2' = L1 | in`, bad = `L1 & L2`.
    fn shift_or() -> (Aig, RawLit) {
        let mut aig = Aig::new(1);
        let l1 = aig.add_latch(false);
        let l2 = aig.add_latch(false);
        aig.set_next(l1, Aig::lit(l2));
        let or = aig.add_or(Aig::lit(l1), Aig::lit(1));
        aig.set_next(l2, or);
        let bad = aig.add_and(Aig::lit(l1), Aig::lit(l2));
        aig.bads.push(bad);
        (aig, bad)
    }

    #[test]
    fn simulator_follows_the_gates() {
        let (aig, bad) = shift_or();
        let s0 = aig.reset_state();
        assert_eq!(s0, vec![false, false]);
        let s1 = aig.step(&s0, &[true]);
        assert_eq!(s1, vec![false, true]);
        let s2 = aig.step(&s1, &[true]);
        assert_eq!(s2, vec![true, true]);
        let values = aig.eval(&s2, &[false]);
        assert!(eval_lit(&values, bad));
    }

    #[test]
    fn constants_evaluate() {
        let values = vec![false; 4];
        assert!(!eval_lit(&values, FALSE_LIT));
        assert!(eval_lit(&values, TRUE_LIT));
    }
}
