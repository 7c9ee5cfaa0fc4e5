//! Problem model: orders, pickers, the store and schedules.
//!
//! All entities are immutable once built. Scheduling algorithms work on
//! integer seconds-of-day, see [`seconds_of_day`] and [`time_of_day`].

mod order;
mod schedule;
mod store;

pub use order::{Order, Picker};
pub use schedule::{validate_schedule, Schedule, ScheduleEntry};
pub use store::Store;

use chrono::{Duration, NaiveTime, Timelike};

/// Seconds elapsed since midnight.
pub fn seconds_of_day(time: NaiveTime) -> i64 {
    time.num_seconds_from_midnight() as i64
}

/// Exact offset from midnight, including the sub-second part.
pub fn offset_of_day(time: NaiveTime) -> Duration {
    Duration::seconds(i64::from(time.num_seconds_from_midnight()))
        + Duration::nanoseconds(i64::from(time.nanosecond()))
}

/// Inverse of [`seconds_of_day`]. `None` outside `0..86_400`.
pub fn time_of_day(seconds: i64) -> Option<NaiveTime> {
    let seconds = u32::try_from(seconds).ok()?;
    NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0)
}
