// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! The four specializations of the SAT capability used by the engine: the
//! shared main solver, the start-state enumerator, the partial-state
//! generalizer, and the invariant-sweep solver.

pub mod inv_solver;
pub mod main_solver;
pub mod partial_solver;
pub mod start_solver;

pub use inv_solver::InvSolver;
pub use main_solver::MainSolver;
pub use partial_solver::PartialSolver;
pub use start_solver::StartSolver;
