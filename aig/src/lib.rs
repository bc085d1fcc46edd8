// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! The AIGER circuit layer: literals and cubes, the circuit representation,
//! the `.aag` parser, and the clausal transition system consumed by the
//! reachability engine.

// configure clippy
#![allow(clippy::needless_return)]
#![allow(clippy::comparison_chain)]
// documentation-related lints (only checked when running rustdoc)
#![warn(missing_docs)]
#![allow(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod circuit;
pub mod cube;
pub mod parser;
pub mod system;

pub use circuit::Aig;
pub use cube::{Cube, Lit, Var};
pub use system::TransitionSystem;
