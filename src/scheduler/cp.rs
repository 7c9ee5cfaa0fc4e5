use std::time::{Duration, Instant};

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::{OptimizationCriteria, Scheduler};
use crate::cp::{
    BranchAndBoundSolver, CpModel, CpSolution, CpSolver, IntervalVar, Objective, SolverConfig,
    SolverStatus,
};
use crate::error::ScheduleError;
use crate::model::{time_of_day, Order, Schedule, ScheduleEntry, Store};

/// Seconds in a day: the model horizon.
const HORIZON: i64 = 86_400;

/// Cap on a single objective weight, leaving headroom for sums over
/// millions of pairs.
const MAX_WEIGHT: i64 = i64::MAX >> 24;

/// Configuration for [`CpScheduler`].
#[derive(Debug, Clone)]
pub struct CpSchedulerConfig {
    /// Above this many orders the scheduler returns an empty schedule
    /// without building a model.
    pub problem_size_threshold: usize,
    /// Multiplier turning decimal values into integer weights.
    pub value_scale: u32,
    /// Solver settings. The time limit is overwritten by each call's budget.
    pub solver: SolverConfig,
}

impl Default for CpSchedulerConfig {
    fn default() -> Self {
        Self {
            problem_size_threshold: 1_000,
            value_scale: 100,
            solver: SolverConfig::default(),
        }
    }
}

impl CpSchedulerConfig {
    pub fn with_problem_size_threshold(mut self, n: usize) -> Self {
        self.problem_size_threshold = n;
        self
    }

    pub fn with_value_scale(mut self, scale: u32) -> Self {
        self.value_scale = scale;
        self
    }

    pub fn with_solver(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.value_scale == 0 {
            return Err("value_scale must be positive".into());
        }
        self.solver.validate()
    }
}

/// Exact scheduler: one optional interval per (order, picker) pair, solved
/// by [`BranchAndBoundSolver`].
pub struct CpScheduler {
    criteria: OptimizationCriteria,
    config: CpSchedulerConfig,
    solver: BranchAndBoundSolver,
}

impl CpScheduler {
    /// Creates a scheduler with the default configuration.
    ///
    /// Fails with [`ScheduleError::SolverUnavailable`] if the search threads
    /// cannot be created.
    pub fn new(criteria: OptimizationCriteria) -> Result<Self, ScheduleError> {
        Self::with_config(criteria, CpSchedulerConfig::default())
    }

    pub fn with_config(
        criteria: OptimizationCriteria,
        config: CpSchedulerConfig,
    ) -> Result<Self, ScheduleError> {
        config.validate().map_err(ScheduleError::InvalidConfig)?;
        let solver = BranchAndBoundSolver::new(config.solver.num_workers)
            .map_err(|e| ScheduleError::SolverUnavailable(e.to_string()))?;
        Ok(Self {
            criteria,
            config,
            solver,
        })
    }

    pub fn config(&self) -> &CpSchedulerConfig {
        &self.config
    }

    fn weight(&self, order: &Order) -> i64 {
        match self.criteria {
            OptimizationCriteria::MaximizeCount => 1,
            OptimizationCriteria::MaximizeValue => order
                .value()
                .checked_mul(Decimal::from(self.config.value_scale))
                .and_then(|scaled| scaled.trunc().to_i64())
                .map_or(MAX_WEIGHT, |w| w.min(MAX_WEIGHT)),
        }
    }

    /// Builds the assignment model. Names are indexed by position so that
    /// duplicate order ids cannot collide.
    fn build_model(&self, orders: &[Order], store: &Store) -> CpModel {
        let mut model = CpModel::new("picking", HORIZON);
        let shift_start = store.picking_start_seconds();
        let shift_end = store.picking_end_seconds();
        let pickers = store.pickers().len();

        for (o, order) in orders.iter().enumerate() {
            let duration = order.picking_seconds();
            let complete_by = order.complete_by_seconds();
            for p in 0..pickers {
                let interval = IntervalVar::new(
                    interval_name(o, p),
                    shift_start,
                    complete_by - duration,
                    duration,
                    complete_by.min(shift_end),
                )
                .as_optional(literal_name(o, p));
                model.add_interval(interval);
            }
            model.add_at_most_one((0..pickers).map(|p| literal_name(o, p)).collect());
        }

        for p in 0..pickers {
            model.add_no_overlap((0..orders.len()).map(|o| interval_name(o, p)).collect());
        }

        let terms = orders
            .iter()
            .enumerate()
            .flat_map(|(o, order)| {
                let weight = self.weight(order);
                (0..pickers).map(move |p| (literal_name(o, p), weight))
            })
            .collect();
        model.set_objective(Objective::Maximize { terms });
        model
    }

    fn extract(
        &self,
        orders: &[Order],
        store: &Store,
        solution: &CpSolution,
    ) -> Result<Schedule, ScheduleError> {
        let mut schedule = Schedule::new();
        for (p, picker) in store.pickers().iter().enumerate() {
            for (o, order) in orders.iter().enumerate() {
                if !solution.literal(&literal_name(o, p)) {
                    continue;
                }
                let start = solution
                    .intervals
                    .get(&interval_name(o, p))
                    .map(|iv| iv.start)
                    .and_then(time_of_day)
                    .ok_or_else(|| ScheduleError::ModelInvalid {
                        strategy: self.name().to_string(),
                        reason: format!("no start time for {}", interval_name(o, p)),
                    })?;
                schedule.push(ScheduleEntry::new(picker.clone(), order.clone(), start));
            }
        }
        Ok(schedule)
    }
}

impl Scheduler for CpScheduler {
    fn name(&self) -> &str {
        "cp"
    }

    fn schedule(
        &self,
        orders: &[Order],
        store: &Store,
        time_budget: Duration,
    ) -> Result<Schedule, ScheduleError> {
        if orders.len() > self.config.problem_size_threshold {
            warn!(
                orders = orders.len(),
                threshold = self.config.problem_size_threshold,
                "problem too large for the CP scheduler, skipping"
            );
            return Ok(Schedule::new());
        }
        if orders.is_empty() || store.pickers().is_empty() {
            return Ok(Schedule::new());
        }

        let started = Instant::now();
        let model = self.build_model(orders, store);
        let config = self
            .config
            .solver
            .clone()
            .with_time_limit_ms(millis(time_budget.saturating_sub(started.elapsed())));
        let solution = self.solver.solve(&model, &config);

        debug!(
            status = ?solution.status,
            objective = ?solution.objective_value,
            intervals = model.interval_count(),
            nodes = solution.nodes,
            solve_time_ms = solution.solve_time_ms,
            "cp solve finished"
        );

        match solution.status {
            SolverStatus::Optimal | SolverStatus::Feasible => self.extract(orders, store, &solution),
            SolverStatus::ModelInvalid => Err(ScheduleError::ModelInvalid {
                strategy: self.name().to_string(),
                reason: solution.message.unwrap_or_default(),
            }),
            SolverStatus::Timeout => {
                debug!("no cp solution within the budget, returning empty schedule");
                Ok(Schedule::new())
            }
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn interval_name(order: usize, picker: usize) -> String {
    format!("order_{order}_picker_{picker}_interval")
}

fn literal_name(order: usize, picker: usize) -> String {
    format!("order_{order}_picker_{picker}_assigned")
}
