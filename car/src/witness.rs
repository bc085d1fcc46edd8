// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! The result surface: the three-valued outcome, execution traces, and
//! safety certificates.

use crate::sequence::Direction;
use aig::circuit::{eval_lit, Aig};
use aig::cube::Cube;
use serde::Serialize;

/// The verdict of a run.
#[derive(Debug, Clone, Serialize)]
pub enum Outcome {
    /// No reachable state violates the property.
    Safe {
        /// The fixpoint frames, when the proof produced one.
        certificate: Option<Certificate>,
    },
    /// A reachable state violates the property.
    Unsafe {
        /// A concrete execution reaching the violation.
        trace: Trace,
    },
    /// A resource ceiling was reached first.
    Unknown,
}

/// An execution trace: the initial latch valuation and the input valuation
/// consumed at each step. The final input vector is the one that triggers
/// the bad output in the last state.
#[derive(Debug, Clone, Serialize)]
pub struct Trace {
    /// Latch values of the initial state, in latch order.
    pub initial: Vec<bool>,
    /// One input vector per step, in input order.
    pub inputs: Vec<Vec<bool>>,
}

impl Trace {
    /// The per-step (latch valuation, input valuation) pairs, recomputed by
    /// simulating the circuit. The transition steps are valid by
    /// construction; whether the last pair triggers the bad output is what
    /// trace validation checks.
    pub fn steps(&self, aig: &Aig) -> Vec<(Vec<bool>, Vec<bool>)> {
        let mut steps = Vec::with_capacity(self.inputs.len());
        let mut latches = self.initial.clone();
        for (i, inputs) in self.inputs.iter().enumerate() {
            steps.push((latches.clone(), inputs.clone()));
            if i + 1 < self.inputs.len() {
                latches = aig.step(&latches, inputs);
            }
        }
        steps
    }

    /// Does the final step trigger the given bad literal?
    pub fn triggers_bad(&self, aig: &Aig, bad_index: usize) -> bool {
        let bad = match aig.bad_lit(bad_index) {
            Some(b) => b,
            None => return false,
        };
        match self.steps(aig).last() {
            Some((latches, inputs)) => eval_lit(&aig.eval(latches, inputs), bad),
            None => false,
        }
    }
}

/// A proof of safety: the committed frames up to (excluding) the fixpoint
/// level of the direction that converged. A state is covered by the
/// certificate when every frame blocks it; for the backward direction the
/// covered set contains all initial states, is closed under successors, and
/// excludes every bad state; the mirrored reading holds forward.
#[derive(Debug, Clone, Serialize)]
pub struct Certificate {
    /// The direction whose primary sequence reached the fixpoint.
    pub direction: Direction,
    /// The frames below the fixpoint level.
    pub frames: Vec<Vec<Cube>>,
}

impl Certificate {
    /// Is a full latch valuation covered (blocked in every frame)?
    pub fn covers(&self, latches: &Cube) -> bool {
        self.frames
            .iter()
            .all(|frame| frame.iter().any(|cube| aig::cube::implies(latches, cube)))
    }
}
