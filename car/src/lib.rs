// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Bidirectional Complementary Approximate Reachability (CAR).
//!
//! The engine decides whether any state reachable from a circuit's initial
//! states violates a safety property, searching forward and backward at the
//! same time and exchanging discovered states between the two directions.
//! The answer is either an inductive invariant or a concrete execution trace.

// configure clippy
#![allow(clippy::needless_return)]
#![allow(clippy::too_many_arguments)]
// documentation-related lints (only checked when running rustdoc)
#![warn(missing_docs)]
#![allow(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod checker;
pub mod hashmap;
pub mod heuristics;
pub mod options;
pub mod sequence;
pub mod solvers;
pub mod state;
pub mod witness;

pub use checker::Checker;
pub use options::{Options, PickStrategy};
pub use sequence::Direction;
pub use witness::{Certificate, Outcome, Trace};
