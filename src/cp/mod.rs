//! Constraint Programming (CP) framework.
//!
//! A small modeling layer for optional-interval problems plus a native
//! solver for it.
//!
//! # Key Components
//!
//! - **Variables**: [`IntervalVar`], [`BoolVar`], [`TimeVar`]
//! - **Constraints**: [`Constraint`] (AtMostOne, NoOverlap)
//! - **Model**: [`CpModel`]: container for variables, constraints, objective
//! - **Solver**: [`CpSolver`] trait, implemented by [`BranchAndBoundSolver`]
//!
//! The model knows nothing about orders or pickers; the picking scheduler
//! builds one model per run and reads the presence literals back.
//!
//! # References
//!
//! Rossi, van Beek & Walsh (2006), "Handbook of Constraint Programming"

mod model;
mod search;
mod solver;
mod variables;

pub use model::{Constraint, CpModel, Objective};
pub use search::BranchAndBoundSolver;
pub use solver::{CpSolution, CpSolver, IntervalSolution, SolverConfig, SolverStatus};
pub use variables::{BoolVar, IntervalVar, TimeVar};
