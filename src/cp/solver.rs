//! CP solver interface.

use super::model::CpModel;
use std::collections::HashMap;

/// Status of the solver after execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverStatus {
    /// Proven optimal solution found.
    Optimal,
    /// Feasible (but not necessarily optimal) solution found.
    Feasible,
    /// Model is invalid or outside what the solver supports.
    ModelInvalid,
    /// Solver exceeded time limit without a solution.
    Timeout,
}

/// Solution for an interval variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalSolution {
    /// Assigned start time.
    pub start: i64,
    /// Assigned end time.
    pub end: i64,
    /// Whether this interval is present.
    pub is_present: bool,
}

/// Solution from a CP solver.
#[derive(Debug, Clone)]
pub struct CpSolution {
    /// Solver status.
    pub status: SolverStatus,
    /// Objective function value (if any).
    pub objective_value: Option<i64>,
    /// Interval variable assignments, by interval name.
    pub intervals: HashMap<String, IntervalSolution>,
    /// Literal assignments, by literal name.
    pub literals: HashMap<String, bool>,
    /// Search nodes explored across all workers.
    pub nodes: u64,
    /// Solve time in milliseconds.
    pub solve_time_ms: u64,
    /// Reason reported with [`SolverStatus::ModelInvalid`].
    pub message: Option<String>,
}

impl CpSolution {
    /// Creates an empty solution with the given status.
    pub fn empty(status: SolverStatus) -> Self {
        Self {
            status,
            objective_value: None,
            intervals: HashMap::new(),
            literals: HashMap::new(),
            nodes: 0,
            solve_time_ms: 0,
            message: None,
        }
    }

    /// An invalid-model result carrying the reason.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::empty(SolverStatus::ModelInvalid)
        }
    }

    /// Whether a feasible solution was found.
    pub fn is_solution_found(&self) -> bool {
        matches!(self.status, SolverStatus::Optimal | SolverStatus::Feasible)
    }

    /// Value of a literal; unknown names read as false.
    pub fn literal(&self, name: &str) -> bool {
        self.literals.get(name).copied().unwrap_or(false)
    }
}

/// Solver configuration.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Maximum solve time in milliseconds.
    pub time_limit_ms: u64,
    /// Number of parallel search workers.
    pub num_workers: usize,
    /// Seed for randomized worker orderings.
    pub seed: u64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_limit_ms: 60_000,
            num_workers: 2,
            seed: 42,
        }
    }
}

impl SolverConfig {
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = ms;
        self
    }

    pub fn with_num_workers(mut self, n: usize) -> Self {
        self.num_workers = n;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.num_workers == 0 {
            return Err("num_workers must be at least 1".into());
        }
        Ok(())
    }
}

/// Trait for CP solver implementations.
///
/// Implementors provide the actual constraint solving logic. This can wrap
/// an external solver or be a native search such as
/// [`BranchAndBoundSolver`](super::BranchAndBoundSolver).
pub trait CpSolver: Send + Sync {
    /// Solves the model and returns a solution.
    fn solve(&self, model: &CpModel, config: &SolverConfig) -> CpSolution;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solver_config_default() {
        let config = SolverConfig::default();
        assert_eq!(config.time_limit_ms, 60_000);
        assert_eq!(config.num_workers, 2);
        assert!(config.validate().is_ok());
        assert!(config.with_num_workers(0).validate().is_err());
    }

    #[test]
    fn test_solution_found() {
        assert!(CpSolution::empty(SolverStatus::Optimal).is_solution_found());
        assert!(CpSolution::empty(SolverStatus::Feasible).is_solution_found());
        assert!(!CpSolution::empty(SolverStatus::Timeout).is_solution_found());
        assert!(!CpSolution::invalid("x").is_solution_found());
    }

    #[test]
    fn test_literal_lookup() {
        let mut solution = CpSolution::empty(SolverStatus::Feasible);
        solution.literals.insert("a".into(), true);
        solution.literals.insert("b".into(), false);
        assert!(solution.literal("a"));
        assert!(!solution.literal("b"));
        assert!(!solution.literal("missing"));
    }
}
