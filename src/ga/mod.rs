//! Genetic Algorithm framework.
//!
//! A generic, domain-agnostic GA framework built on trait-based abstractions.
//! Users define their problem by implementing [`GaProblem`], which specifies
//! how to create, evaluate, crossover, and mutate individuals.
//!
//! # Core Traits
//!
//! - [`Individual`]: A candidate solution with associated fitness type
//! - [`GaProblem`]: Problem definition: initialization, evaluation, operators
//!
//! # Key Types
//!
//! - [`GaConfig`]: Algorithm parameters (population, selection, limits)
//! - [`GaRunner`]: Executes the evolutionary loop
//! - [`GaResult`]: Final optimization result with statistics
//!
//! Fitness is maximized. Each generation keeps a tournament-selected share
//! of the population and breeds the rest from roulette-selected parents.
//!
//! # Submodules
//!
//! - [`operators`]: Single-point crossover (plain and order-preserving) and
//!   per-gene mutation operators
//!
//! # References
//!
//! - Holland (1975), *Adaptation in Natural and Artificial Systems*
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and Machine Learning*
//! - De Jong (2006), *Evolutionary Computation: A Unified Approach*

mod config;
pub mod operators;
mod runner;
mod selection;
mod types;

pub use config::GaConfig;
pub use runner::{GaResult, GaRunner};
pub use selection::Selection;
pub use types::{Fitness, GaProblem, Individual};
