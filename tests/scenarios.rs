//! End-to-end scheduling scenarios fed through the JSON adapters.
#![cfg(feature = "serde")]

use std::time::Duration;

use rust_decimal_macros::dec;
use u_picking::io::{parse_orders, parse_store};
use u_picking::logging;
use u_picking::model::{validate_schedule, Order, Schedule, Store};
use u_picking::scheduler::{
    common_fitness, CombinedScheduler, CpScheduler, CpSchedulerConfig, GeneticScheduler,
    GeneticSchedulerConfig, OptimizationCriteria, Scheduler,
};

const BUDGET: Duration = Duration::from_secs(3);

fn order(id: &str, value: &str, picking: &str, complete_by: &str) -> String {
    format!(
        r#"{{"orderId": "{id}", "orderValue": "{value}", "pickingTime": "{picking}", "completeBy": "{complete_by}"}}"#
    )
}

fn orders(records: &[String]) -> Vec<Order> {
    parse_orders(&format!("[{}]", records.join(","))).unwrap()
}

fn store(pickers: &[&str], start: &str, end: &str) -> Store {
    let pickers: Vec<String> = pickers.iter().map(|p| format!("\"{p}\"")).collect();
    parse_store(&format!(
        r#"{{"pickers": [{}], "pickingStartTime": "{start}", "pickingEndTime": "{end}"}}"#,
        pickers.join(",")
    ))
    .unwrap()
}

/// Seven zero-value orders that all fit on two pickers between 09:00 and 11:00.
fn seven_orders() -> Vec<Order> {
    orders(&[
        order("order-1", "0.00", "PT15M", "09:15"),
        order("order-2", "0.00", "PT30M", "09:30"),
        order("order-3", "0.00", "PT15M", "10:00"),
        order("order-4", "0.00", "PT15M", "10:00"),
        order("order-5", "0.00", "PT60M", "10:15"),
        order("order-6", "0.00", "PT30M", "10:45"),
        order("order-7", "0.00", "PT45M", "11:00"),
    ])
}

/// Five valued orders competing for one hour on two pickers.
fn five_valued_orders() -> Vec<Order> {
    orders(&[
        order("order-1", "5.00", "PT15M", "09:15"),
        order("order-2", "5.00", "PT30M", "10:00"),
        order("order-3", "10.00", "PT45M", "10:00"),
        order("order-4", "20.00", "PT45M", "09:45"),
        order("order-5", "5.00", "PT30M", "10:00"),
    ])
}

fn two_pickers(start: &str, end: &str) -> Store {
    store(&["P1", "P2"], start, end)
}

fn assert_valid(schedule: &Schedule, store: &Store) {
    if let Err(reason) = validate_schedule(schedule, store) {
        panic!("invalid schedule: {reason}\n{schedule:#?}");
    }
}

fn cp(criteria: OptimizationCriteria) -> CpScheduler {
    logging::init_test();
    CpScheduler::new(criteria).unwrap()
}

fn genetic(criteria: OptimizationCriteria) -> GeneticScheduler {
    logging::init_test();
    GeneticScheduler::with_config(criteria, GeneticSchedulerConfig::default().with_seed(42)).unwrap()
}

// ===========================================================================
// CP
// ===========================================================================

#[test]
fn cp_schedules_every_order_when_count_is_maximized() {
    let store = two_pickers("09:00", "11:00");
    let schedule = cp(OptimizationCriteria::MaximizeCount)
        .schedule(&seven_orders(), &store, BUDGET)
        .unwrap();
    assert_valid(&schedule, &store);
    assert_eq!(schedule.len(), 7);
}

#[test]
fn cp_finds_best_value() {
    let store = two_pickers("09:00", "10:00");
    let schedule = cp(OptimizationCriteria::MaximizeValue)
        .schedule(&five_valued_orders(), &store, BUDGET)
        .unwrap();
    assert_valid(&schedule, &store);
    assert_eq!(common_fitness(&schedule, OptimizationCriteria::MaximizeValue), dec!(35));
}

#[test]
fn cp_returns_empty_when_shift_starts_after_deadlines() {
    let store = two_pickers("15:00", "16:00");
    let schedule = cp(OptimizationCriteria::MaximizeCount)
        .schedule(&seven_orders(), &store, BUDGET)
        .unwrap();
    assert!(schedule.is_empty());
}

// ===========================================================================
// Genetic
// ===========================================================================

#[test]
fn genetic_finds_best_count() {
    let store = two_pickers("09:00", "10:00");
    let schedule = genetic(OptimizationCriteria::MaximizeCount)
        .schedule(&five_valued_orders(), &store, BUDGET)
        .unwrap();
    assert_valid(&schedule, &store);
    assert_eq!(schedule.len(), 4);
}

#[test]
fn genetic_finds_best_value() {
    let store = two_pickers("09:00", "10:00");
    let schedule = genetic(OptimizationCriteria::MaximizeValue)
        .schedule(&five_valued_orders(), &store, BUDGET)
        .unwrap();
    assert_valid(&schedule, &store);
    assert_eq!(common_fitness(&schedule, OptimizationCriteria::MaximizeValue), dec!(35));
}

#[test]
fn genetic_returns_empty_when_nothing_fits() {
    let orders = orders(&[
        order("order-1", "125.00", "PT30M", "09:00"),
        order("order-2", "55.00", "PT45M", "09:30"),
    ]);
    let store = two_pickers("08:50", "10:00");
    let schedule = genetic(OptimizationCriteria::MaximizeCount)
        .schedule(&orders, &store, BUDGET)
        .unwrap();
    assert!(schedule.is_empty());
}

// ===========================================================================
// Combined
// ===========================================================================

#[test]
fn combined_picks_one_of_two_conflicting_orders() {
    let orders = orders(&[
        order("order-1", "0.00", "PT45M", "10:00"),
        order("order-2", "0.00", "PT30M", "09:30"),
    ]);
    let store = store(&["P1"], "09:00", "10:00");
    let schedule = CombinedScheduler::new(OptimizationCriteria::MaximizeCount)
        .schedule(&orders, &store, BUDGET)
        .unwrap();
    assert_valid(&schedule, &store);
    assert_eq!(schedule.len(), 1);
}

#[test]
fn combined_includes_zero_duration_order() {
    let orders = orders(&[
        order("order-1", "5.00", "PT15M", "09:15"),
        order("order-2", "5.00", "PT30M", "10:00"),
        order("order-3", "10.00", "PT45M", "10:00"),
        order("order-4", "20.00", "PT45M", "09:45"),
        order("order-5", "50.00", "PT0S", "10:00"),
    ]);
    let store = two_pickers("09:00", "10:00");
    let schedule = CombinedScheduler::new(OptimizationCriteria::MaximizeValue)
        .schedule(&orders, &store, BUDGET)
        .unwrap();
    assert_valid(&schedule, &store);
    assert_eq!(common_fitness(&schedule, OptimizationCriteria::MaximizeValue), dec!(85));
}

#[test]
fn combined_returns_empty_when_shift_starts_after_deadlines() {
    let orders = orders(&[order("order-1", "0.00", "PT15M", "09:15")]);
    let store = two_pickers("15:00", "16:00");
    let schedule = CombinedScheduler::new(OptimizationCriteria::MaximizeCount)
        .schedule(&orders, &store, BUDGET)
        .unwrap();
    assert!(schedule.is_empty());
}

#[test]
fn combined_is_at_least_as_good_as_each_strategy() {
    let store = two_pickers("09:00", "10:00");
    let orders = five_valued_orders();
    let criteria = OptimizationCriteria::MaximizeValue;

    let combined = CombinedScheduler::new(criteria).schedule(&orders, &store, BUDGET).unwrap();
    let by_cp = cp(criteria).schedule(&orders, &store, BUDGET).unwrap();
    let by_ga = genetic(criteria).schedule(&orders, &store, BUDGET).unwrap();

    let best = common_fitness(&combined, criteria);
    assert!(best >= common_fitness(&by_cp, criteria));
    assert!(best >= common_fitness(&by_ga, criteria));
}

#[test]
fn oversized_problem_falls_back_to_genetic() {
    let criteria = OptimizationCriteria::MaximizeCount;
    let small_cp = CpScheduler::with_config(
        criteria,
        CpSchedulerConfig::default().with_problem_size_threshold(2),
    )
    .unwrap();
    let store = two_pickers("09:00", "11:00");
    let orders = seven_orders();

    assert!(small_cp.schedule(&orders, &store, BUDGET).unwrap().is_empty());

    let combined = CombinedScheduler::with_strategies(
        criteria,
        vec![Box::new(small_cp), Box::new(genetic(criteria))],
    );
    let schedule = combined.schedule(&orders, &store, BUDGET).unwrap();
    assert_valid(&schedule, &store);
    assert!(!schedule.is_empty());
}

#[test]
fn no_orders_gives_empty_schedule_everywhere() {
    let store = two_pickers("09:00", "10:00");
    let criteria = OptimizationCriteria::MaximizeValue;
    let strategies: Vec<Box<dyn Scheduler>> = vec![
        Box::new(cp(criteria)),
        Box::new(genetic(criteria)),
        Box::new(CombinedScheduler::new(criteria)),
    ];
    for strategy in &strategies {
        let schedule = strategy.schedule(&[], &store, BUDGET).unwrap();
        assert!(schedule.is_empty(), "{} returned entries", strategy.name());
    }
}

#[test]
fn schedules_never_overrun_the_budget_by_much() {
    let store = two_pickers("09:00", "11:00");
    let started = std::time::Instant::now();
    CombinedScheduler::new(OptimizationCriteria::MaximizeCount)
        .schedule(&seven_orders(), &store, Duration::from_millis(500))
        .unwrap();
    assert!(started.elapsed() < Duration::from_secs(3));
}
