//! Genetic picking scheduler.
//!
//! The genotype pairs a picker-assignment chromosome with an order
//! permutation (see [`PickingChromosome`]); [`PickingProblem`] decodes it
//! greedily into per-picker sequences. Evolution runs on the generic
//! [`GaRunner`] until the time budget is spent or the best fitness has not
//! improved for `steady_fitness_limit` generations.

mod chromosome;
mod problem;

pub use chromosome::PickingChromosome;
pub use problem::{Assignment, PickingProblem};

use std::time::{Duration, Instant};

use tracing::debug;

use super::{OptimizationCriteria, Scheduler};
use crate::error::ScheduleError;
use crate::ga::{GaConfig, GaRunner};
use crate::model::{time_of_day, Order, Schedule, ScheduleEntry, Store};

/// Configuration for [`GeneticScheduler`].
///
/// `ga.time_limit` is replaced by the budget of each call.
///
/// ```
/// use u_picking::scheduler::GeneticSchedulerConfig;
///
/// let config = GeneticSchedulerConfig::default().with_seed(7);
/// assert_eq!(config.ga.population_size, 100);
/// assert_eq!(config.ga.seed, Some(7));
/// ```
#[derive(Debug, Clone, Default)]
pub struct GeneticSchedulerConfig {
    pub ga: GaConfig,
}

impl GeneticSchedulerConfig {
    pub fn with_ga(mut self, ga: GaConfig) -> Self {
        self.ga = ga;
        self
    }

    /// Fixes the random seed for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.ga.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        self.ga.clone().with_time_limit(Duration::ZERO).validate()
    }
}

/// Heuristic scheduler evolving [`PickingChromosome`]s.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use chrono::{Duration as Span, NaiveTime};
/// use rust_decimal::Decimal;
/// use u_picking::model::{Order, Picker, Store};
/// use u_picking::scheduler::{GeneticScheduler, OptimizationCriteria, Scheduler};
///
/// let at = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
/// let store = Store::new(vec![Picker::new("P1")], at(9, 0), at(10, 0)).unwrap();
/// let orders = vec![
///     Order::new("a", Decimal::ONE, Span::minutes(20), at(10, 0)).unwrap(),
///     Order::new("b", Decimal::ONE, Span::minutes(20), at(10, 0)).unwrap(),
/// ];
///
/// let scheduler = GeneticScheduler::new(OptimizationCriteria::MaximizeCount);
/// let schedule = scheduler.schedule(&orders, &store, Duration::from_secs(1)).unwrap();
/// assert_eq!(schedule.len(), 2);
/// ```
pub struct GeneticScheduler {
    criteria: OptimizationCriteria,
    config: GeneticSchedulerConfig,
}

impl GeneticScheduler {
    pub fn new(criteria: OptimizationCriteria) -> Self {
        Self {
            criteria,
            config: GeneticSchedulerConfig::default(),
        }
    }

    pub fn with_config(
        criteria: OptimizationCriteria,
        config: GeneticSchedulerConfig,
    ) -> Result<Self, ScheduleError> {
        config.validate().map_err(ScheduleError::InvalidConfig)?;
        Ok(Self { criteria, config })
    }

    pub fn config(&self) -> &GeneticSchedulerConfig {
        &self.config
    }
}

impl Scheduler for GeneticScheduler {
    fn name(&self) -> &str {
        "genetic"
    }

    fn schedule(
        &self,
        orders: &[Order],
        store: &Store,
        time_budget: Duration,
    ) -> Result<Schedule, ScheduleError> {
        if orders.is_empty() || store.pickers().is_empty() {
            return Ok(Schedule::new());
        }

        let started = Instant::now();
        let problem = PickingProblem::new(orders, store, self.criteria);
        let config = self.config.ga.clone().with_time_limit(time_budget);
        let result = GaRunner::run(&problem, &config).map_err(ScheduleError::InvalidConfig)?;

        debug!(
            generations = result.generations,
            best_fitness = result.best_fitness,
            stagnated = result.stagnated,
            timed_out = result.timed_out,
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "genetic search finished"
        );

        problem
            .decode(&result.best)
            .into_iter()
            .map(|a| {
                let start = time_of_day(a.start).ok_or_else(|| ScheduleError::ModelInvalid {
                    strategy: self.name().to_string(),
                    reason: format!("decoded start {}s is outside the day", a.start),
                })?;
                Ok(ScheduleEntry::new(
                    store.pickers()[a.picker].clone(),
                    orders[a.order].clone(),
                    start,
                ))
            })
            .collect()
    }
}
