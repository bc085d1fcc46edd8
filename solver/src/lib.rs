// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! The incremental SAT capability consumed by the reachability engine, and
//! its CaDiCaL backend.

// configure clippy
#![allow(clippy::needless_return)]
// documentation-related lints (only checked when running rustdoc)
#![warn(missing_docs)]
#![allow(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod basics;
pub mod cadical_solver;

pub use basics::IncrementalSolver;
pub use cadical_solver::CadicalSolver;
