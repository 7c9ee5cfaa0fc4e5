//! Picking schedulers.
//!
//! Every strategy implements [`Scheduler`]. [`CpScheduler`] solves an
//! exact optional-interval model, [`GeneticScheduler`] evolves a two-part
//! genotype, and [`CombinedScheduler`] races the available strategies under
//! one budget and keeps the best result by [`common_fitness`].

mod combined;
mod cp;
mod genetic;

pub use combined::CombinedScheduler;
pub use cp::{CpScheduler, CpSchedulerConfig};
pub use genetic::{GeneticScheduler, GeneticSchedulerConfig, PickingChromosome, PickingProblem};

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::error::ScheduleError;
use crate::model::{Order, Schedule, ScheduleEntry, Store};

/// A scheduling strategy.
///
/// Implementations must return schedules that pass
/// [`validate_schedule`](crate::model::validate_schedule), and treat
/// `time_budget` as a best-effort wall-clock limit.
pub trait Scheduler: Send + Sync {
    /// Short identifier used in logs and errors.
    fn name(&self) -> &str;

    /// Assigns orders to pickers.
    ///
    /// Infeasible or empty instances yield an empty schedule, not an error.
    fn schedule(
        &self,
        orders: &[Order],
        store: &Store,
        time_budget: Duration,
    ) -> Result<Schedule, ScheduleError>;
}

/// What a schedule is scored by.
///
/// # Examples
///
/// ```
/// use u_picking::scheduler::OptimizationCriteria;
///
/// let criteria: OptimizationCriteria = "value".parse().unwrap();
/// assert_eq!(criteria, OptimizationCriteria::MaximizeValue);
/// assert_eq!(criteria.to_string(), "MAXIMIZE_VALUE");
/// assert!("speed".parse::<OptimizationCriteria>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptimizationCriteria {
    /// Number of picked orders.
    MaximizeCount,
    /// Total value of picked orders.
    MaximizeValue,
}

impl OptimizationCriteria {
    /// Per-order score used inside the genetic search.
    pub fn score(&self, order: &Order) -> f64 {
        match self {
            Self::MaximizeCount => 1.0,
            Self::MaximizeValue => order.value().to_f64().unwrap_or_default(),
        }
    }

    /// Exact per-order contribution to [`common_fitness`].
    pub fn exact_score(&self, order: &Order) -> Decimal {
        match self {
            Self::MaximizeCount => Decimal::ONE,
            Self::MaximizeValue => order.value(),
        }
    }
}

impl fmt::Display for OptimizationCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::MaximizeCount => "MAXIMIZE_COUNT",
            Self::MaximizeValue => "MAXIMIZE_VALUE",
        })
    }
}

impl FromStr for OptimizationCriteria {
    type Err = ScheduleError;

    /// Accepts `count`/`value` and `MAXIMIZE_COUNT`/`MAXIMIZE_VALUE`, in any
    /// case, with `-` or `_`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "count" | "maximize_count" => Ok(Self::MaximizeCount),
            "value" | "maximize_value" => Ok(Self::MaximizeValue),
            _ => Err(ScheduleError::UnknownCriteria(s.to_string())),
        }
    }
}

/// Score shared by every strategy: entry count, or the exact sum of order
/// values.
pub fn common_fitness(schedule: &[ScheduleEntry], criteria: OptimizationCriteria) -> Decimal {
    schedule
        .iter()
        .map(|entry| criteria.exact_score(&entry.order))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Picker;
    use chrono::NaiveTime;
    use rust_decimal_macros::dec;

    fn entry(id: &str, value: Decimal) -> ScheduleEntry {
        let t = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        let order = Order::new(id, value, chrono::Duration::minutes(10), t).unwrap();
        ScheduleEntry::new(Picker::new("P1"), order, t)
    }

    #[test]
    fn test_parse_criteria() {
        for s in ["count", "COUNT", "maximize_count", "MAXIMIZE_COUNT", "maximize-count"] {
            assert_eq!(s.parse::<OptimizationCriteria>().unwrap(), OptimizationCriteria::MaximizeCount);
        }
        for s in ["value", " Value ", "MAXIMIZE_VALUE"] {
            assert_eq!(s.parse::<OptimizationCriteria>().unwrap(), OptimizationCriteria::MaximizeValue);
        }
        let err = "profit".parse::<OptimizationCriteria>().unwrap_err();
        assert!(matches!(err, ScheduleError::UnknownCriteria(s) if s == "profit"));
    }

    #[test]
    fn test_display_parses_back() {
        for c in [OptimizationCriteria::MaximizeCount, OptimizationCriteria::MaximizeValue] {
            assert_eq!(c.to_string().parse::<OptimizationCriteria>().unwrap(), c);
        }
    }

    #[test]
    fn test_common_fitness() {
        let schedule = vec![entry("a", dec!(5.25)), entry("b", dec!(0.10)), entry("c", dec!(0))];
        assert_eq!(common_fitness(&schedule, OptimizationCriteria::MaximizeCount), dec!(3));
        assert_eq!(common_fitness(&schedule, OptimizationCriteria::MaximizeValue), dec!(5.35));
        assert_eq!(common_fitness(&[], OptimizationCriteria::MaximizeValue), Decimal::ZERO);
    }

    #[test]
    fn test_score() {
        let e = entry("a", dec!(12.50));
        assert_eq!(OptimizationCriteria::MaximizeCount.score(&e.order), 1.0);
        assert_eq!(OptimizationCriteria::MaximizeValue.score(&e.order), 12.5);
    }
}
