//! Order-picking scheduler.
//!
//! Assigns customer orders to warehouse pickers within a shift so that
//! either the number of picked orders or their total value is maximized.
//! Every scheduled order starts no earlier than the shift start, ends by
//! both its own complete-by time and the shift end, and never overlaps
//! another order of the same picker.
//!
//! Three strategies implement [`scheduler::Scheduler`]:
//!
//! - **CP**: the problem as a constraint program (optional intervals,
//!   at-most-one assignment per order, no-overlap per picker) solved by a
//!   parallel branch-and-bound search.
//! - **Genetic**: a two-part genotype (picker per slot + order permutation)
//!   decoded greedily into per-picker sequences.
//! - **Combined**: races the others on separate threads under one time budget
//!   and keeps the best result by a common fitness.
//!
//! The [`cp`] and [`ga`] modules are generic frameworks with no picking
//! concepts; the picking domain lives in [`model`] and [`scheduler`].
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use chrono::{Duration as Span, NaiveTime};
//! use rust_decimal::Decimal;
//! use u_picking::model::{Order, Picker, Store};
//! use u_picking::scheduler::{CombinedScheduler, OptimizationCriteria, Scheduler};
//!
//! let at = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
//! let store = Store::new(vec![Picker::new("P1")], at(9, 0), at(10, 0)).unwrap();
//! let orders = vec![
//!     Order::new("small", Decimal::new(5, 0), Span::minutes(30), at(10, 0)).unwrap(),
//!     Order::new("large", Decimal::new(50, 0), Span::minutes(45), at(10, 0)).unwrap(),
//! ];
//!
//! let scheduler = CombinedScheduler::new(OptimizationCriteria::MaximizeValue);
//! let schedule = scheduler.schedule(&orders, &store, Duration::from_secs(1)).unwrap();
//! assert_eq!(schedule.len(), 1);
//! assert_eq!(schedule[0].order.id(), "large");
//! ```

pub mod cp;
pub mod error;
pub mod ga;
#[cfg(feature = "serde")]
pub mod io;
pub mod logging;
pub mod model;
pub mod scheduler;

pub use error::{ModelError, ScheduleError};
pub use model::{Order, Picker, Schedule, ScheduleEntry, Store};
pub use scheduler::{
    common_fitness, CombinedScheduler, CpScheduler, GeneticScheduler, OptimizationCriteria,
    Scheduler,
};
