use std::any::Any;
use std::thread;
use std::time::{Duration, Instant};

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use super::{common_fitness, CpScheduler, GeneticScheduler, OptimizationCriteria, Scheduler};
use crate::error::ScheduleError;
use crate::model::{Order, Schedule, Store};

/// Races several strategies under one time budget and keeps the schedule
/// with the highest [`common_fitness`].
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use chrono::{Duration as Span, NaiveTime};
/// use rust_decimal::Decimal;
/// use u_picking::model::{Order, Picker, Store};
/// use u_picking::scheduler::{CombinedScheduler, OptimizationCriteria, Scheduler};
///
/// let at = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
/// let store = Store::new(vec![Picker::new("P1")], at(9, 0), at(10, 0)).unwrap();
/// let orders = vec![
///     Order::new("A", Decimal::ZERO, Span::minutes(45), at(10, 0)).unwrap(),
///     Order::new("B", Decimal::ZERO, Span::minutes(30), at(9, 30)).unwrap(),
/// ];
///
/// let scheduler = CombinedScheduler::new(OptimizationCriteria::MaximizeCount);
/// let schedule = scheduler.schedule(&orders, &store, Duration::from_secs(1)).unwrap();
/// assert_eq!(schedule.len(), 1);
/// ```
pub struct CombinedScheduler {
    criteria: OptimizationCriteria,
    strategies: Vec<Box<dyn Scheduler>>,
}

impl CombinedScheduler {
    /// CP (when its solver can be started) plus the genetic scheduler.
    pub fn new(criteria: OptimizationCriteria) -> Self {
        let mut strategies: Vec<Box<dyn Scheduler>> = Vec::with_capacity(2);
        match CpScheduler::new(criteria) {
            Ok(cp) => strategies.push(Box::new(cp)),
            Err(e) => warn!(error = %e, "CP scheduler unavailable, continuing without it"),
        }
        strategies.push(Box::new(GeneticScheduler::new(criteria)));
        Self::with_strategies(criteria, strategies)
    }

    /// Uses exactly the given strategies, raced in this order.
    pub fn with_strategies(
        criteria: OptimizationCriteria,
        strategies: Vec<Box<dyn Scheduler>>,
    ) -> Self {
        Self {
            criteria,
            strategies,
        }
    }

    pub fn criteria(&self) -> OptimizationCriteria {
        self.criteria
    }

    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }
}

impl Scheduler for CombinedScheduler {
    fn name(&self) -> &str {
        "combined"
    }

    fn schedule(
        &self,
        orders: &[Order],
        store: &Store,
        time_budget: Duration,
    ) -> Result<Schedule, ScheduleError> {
        let started = Instant::now();

        let outcomes: Vec<(&str, thread::Result<Result<Schedule, ScheduleError>>)> =
            thread::scope(|scope| {
                let handles: Vec<_> = self
                    .strategies
                    .iter()
                    .map(|strategy| {
                        let handle = thread::Builder::new()
                            .name(format!("strategy-{}", strategy.name()))
                            .spawn_scoped(scope, move || {
                                strategy.schedule(orders, store, time_budget)
                            });
                        (strategy, handle)
                    })
                    .collect();

                handles
                    .into_iter()
                    .map(|(strategy, handle)| {
                        let outcome = match handle {
                            Ok(handle) => handle.join(),
                            Err(e) => {
                                warn!(strategy = strategy.name(), error = %e, "could not spawn strategy thread, running inline");
                                Ok(strategy.schedule(orders, store, time_budget))
                            }
                        };
                        (strategy.name(), outcome)
                    })
                    .collect()
            });

        let mut best: Option<(Decimal, &str, Schedule)> = None;
        for (name, outcome) in outcomes {
            let schedule = match outcome {
                Ok(result) => result.map_err(|e| ScheduleError::StrategyFailed {
                    strategy: name.to_string(),
                    source: Box::new(e),
                })?,
                Err(payload) => {
                    return Err(ScheduleError::StrategyPanicked {
                        strategy: name.to_string(),
                        message: panic_message(payload.as_ref()),
                    })
                }
            };
            let fitness = common_fitness(&schedule, self.criteria);
            debug!(strategy = name, %fitness, entries = schedule.len(), "strategy finished");
            if best.as_ref().map_or(true, |(f, _, _)| fitness > *f) {
                best = Some((fitness, name, schedule));
            }
        }

        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        match best {
            Some((fitness, name, schedule)) => {
                info!(
                    winner = name,
                    %fitness,
                    criteria = %self.criteria,
                    entries = schedule.len(),
                    elapsed_ms,
                    "arbitration finished"
                );
                Ok(schedule)
            }
            None => {
                info!(elapsed_ms, "no strategies available, returning empty schedule");
                Ok(Schedule::new())
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Picker, ScheduleEntry};
    use chrono::NaiveTime;
    use rust_decimal_macros::dec;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn store() -> Store {
        Store::new(vec![Picker::new("P1")], at(9, 0), at(10, 0)).unwrap()
    }

    fn orders() -> Vec<Order> {
        ["a", "b", "c"]
            .iter()
            .zip([dec!(1), dec!(10), dec!(100)])
            .map(|(id, v)| Order::new(*id, v, chrono::Duration::minutes(10), at(10, 0)).unwrap())
            .collect()
    }

    /// Returns a fixed subset of the orders, back to back from the shift start.
    struct Fixed {
        name: &'static str,
        picks: Vec<usize>,
    }

    impl Scheduler for Fixed {
        fn name(&self) -> &str {
            self.name
        }

        fn schedule(&self, orders: &[Order], store: &Store, _: Duration) -> Result<Schedule, ScheduleError> {
            Ok(self
                .picks
                .iter()
                .enumerate()
                .map(|(slot, &i)| {
                    let start = at(9, 10 * slot as u32);
                    ScheduleEntry::new(store.pickers()[0].clone(), orders[i].clone(), start)
                })
                .collect())
        }
    }

    struct Failing;

    impl Scheduler for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn schedule(&self, _: &[Order], _: &Store, _: Duration) -> Result<Schedule, ScheduleError> {
            Err(ScheduleError::ModelInvalid {
                strategy: "failing".into(),
                reason: "broken".into(),
            })
        }
    }

    struct Panicking;

    impl Scheduler for Panicking {
        fn name(&self) -> &str {
            "panicking"
        }

        fn schedule(&self, _: &[Order], _: &Store, _: Duration) -> Result<Schedule, ScheduleError> {
            panic!("boom")
        }
    }

    fn fixed(name: &'static str, picks: &[usize]) -> Box<dyn Scheduler> {
        Box::new(Fixed {
            name,
            picks: picks.to_vec(),
        })
    }

    #[test]
    fn test_default_strategies() {
        let scheduler = CombinedScheduler::new(OptimizationCriteria::MaximizeCount);
        assert_eq!(scheduler.strategy_names(), vec!["cp", "genetic"]);
        assert_eq!(scheduler.criteria(), OptimizationCriteria::MaximizeCount);
    }

    #[test]
    fn test_picks_best_by_criteria() {
        let strategies = || vec![fixed("two-cheap", &[0, 1]), fixed("one-dear", &[2])];

        let by_count = CombinedScheduler::with_strategies(OptimizationCriteria::MaximizeCount, strategies());
        let schedule = by_count.schedule(&orders(), &store(), Duration::from_secs(1)).unwrap();
        assert_eq!(schedule.len(), 2);

        let by_value = CombinedScheduler::with_strategies(OptimizationCriteria::MaximizeValue, strategies());
        let schedule = by_value.schedule(&orders(), &store(), Duration::from_secs(1)).unwrap();
        assert_eq!(schedule.len(), 1);
        assert_eq!(schedule[0].order.id(), "c");
    }

    #[test]
    fn test_ties_keep_first() {
        let scheduler = CombinedScheduler::with_strategies(
            OptimizationCriteria::MaximizeCount,
            vec![fixed("first", &[0]), fixed("second", &[1])],
        );
        let schedule = scheduler.schedule(&orders(), &store(), Duration::from_secs(1)).unwrap();
        assert_eq!(schedule[0].order.id(), "a");
    }

    #[test]
    fn test_empty_results_still_win_over_nothing() {
        let scheduler = CombinedScheduler::with_strategies(
            OptimizationCriteria::MaximizeValue,
            vec![fixed("empty", &[])],
        );
        assert!(scheduler.schedule(&orders(), &store(), Duration::from_secs(1)).unwrap().is_empty());

        let none = CombinedScheduler::with_strategies(OptimizationCriteria::MaximizeValue, vec![]);
        assert!(none.schedule(&orders(), &store(), Duration::from_secs(1)).unwrap().is_empty());
    }

    #[test]
    fn test_strategy_error_is_fatal() {
        let scheduler = CombinedScheduler::with_strategies(
            OptimizationCriteria::MaximizeCount,
            vec![fixed("ok", &[0]), Box::new(Failing)],
        );
        let err = scheduler.schedule(&orders(), &store(), Duration::from_secs(1)).unwrap_err();
        match err {
            ScheduleError::StrategyFailed { strategy, source } => {
                assert_eq!(strategy, "failing");
                assert!(matches!(*source, ScheduleError::ModelInvalid { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_strategy_panic_is_reported() {
        let scheduler = CombinedScheduler::with_strategies(
            OptimizationCriteria::MaximizeCount,
            vec![Box::new(Panicking), fixed("ok", &[0])],
        );
        let err = scheduler.schedule(&orders(), &store(), Duration::from_secs(1)).unwrap_err();
        match err {
            ScheduleError::StrategyPanicked { strategy, message } => {
                assert_eq!(strategy, "panicking");
                assert_eq!(message, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
