// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Run configuration for the checker. Everything that used to be a compile
//! time switch in this family of checkers is an explicit option with a
//! small closed set of values.

use crate::heuristics::HintOptions;
use crate::sequence::Direction;

/// How the inner loop walks a Usequence when picking proof obligations.
/// Any fair policy works; these are the two shipped ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickStrategy {
    /// Deepest level first, most recent discovery first (the reference
    /// policy).
    RecentFirst,
    /// Level 0 first, oldest discovery first.
    OldestFirst,
}

/// Checker configuration.
#[derive(Debug, Clone)]
pub struct Options {
    /// The direction the first round searches in.
    pub direction: Direction,
    /// Run the bidirectional exchange: alternate directions and try to
    /// block the opposite direction's discoveries.
    pub bidirectional: bool,
    /// Generalize forward discoveries and enumerated start states to
    /// partial states.
    pub partial_states: bool,
    /// Assumption-ordering hints.
    pub hints: HintOptions,
    /// Obligation selection policy.
    pub pick: PickStrategy,
    /// Stop with an inconclusive answer after this many rounds.
    pub max_rounds: Option<usize>,
    /// Stop with an inconclusive answer after this many solver queries.
    pub max_queries: Option<usize>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            direction: Direction::Backward,
            bidirectional: true,
            partial_states: true,
            hints: HintOptions::default(),
            pick: PickStrategy::RecentFirst,
            max_rounds: None,
            max_queries: None,
        }
    }
}
