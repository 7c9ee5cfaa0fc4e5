use std::collections::{HashMap, HashSet};
use std::fmt;

use chrono::{Duration, NaiveTime, Timelike};

use super::{offset_of_day, seconds_of_day, Order, Picker, Store};

/// One order assigned to one picker, starting at a given time of day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleEntry {
    pub picker: Picker,
    pub order: Order,
    pub start_time: NaiveTime,
}

/// A sequence of schedule entries.
pub type Schedule = Vec<ScheduleEntry>;

impl ScheduleEntry {
    pub fn new(picker: Picker, order: Order, start_time: NaiveTime) -> Self {
        Self {
            picker,
            order,
            start_time,
        }
    }

    pub fn start_seconds(&self) -> i64 {
        seconds_of_day(self.start_time)
    }

    /// `start + picking time`, in seconds-of-day. Not wrapped at midnight.
    pub fn end_seconds(&self) -> i64 {
        self.start_seconds() + self.order.picking_seconds()
    }

    /// Exact start offset from midnight.
    pub fn start_offset(&self) -> Duration {
        offset_of_day(self.start_time)
    }

    /// Exact `start + picking time` offset from midnight. Not wrapped.
    pub fn end_offset(&self) -> Duration {
        self.start_offset() + self.order.picking_time()
    }
}

impl fmt::Display for ScheduleEntry {
    /// `<picker> <order> <HH:MM[:SS]>`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let time = if self.start_time.second() == 0 {
            self.start_time.format("%H:%M")
        } else {
            self.start_time.format("%H:%M:%S")
        };
        write!(f, "{} {} {}", self.picker.id(), self.order.id(), time)
    }
}

/// Checks the invariants every emitted schedule must satisfy:
///
/// 1. no order is assigned twice,
/// 2. a picker's entries never overlap,
/// 3. every entry starts inside the shift and finishes by both the order
///    deadline and the shift end.
///
/// Times are compared exactly, sub-second parts included.
///
/// Returns a description of the first violation.
pub fn validate_schedule(schedule: &[ScheduleEntry], store: &Store) -> Result<(), String> {
    let mut seen: HashSet<&Order> = HashSet::with_capacity(schedule.len());
    for entry in schedule {
        if !seen.insert(&entry.order) {
            return Err(format!("order {} scheduled more than once", entry.order.id()));
        }
    }

    let shift_start = offset_of_day(store.picking_start_time());
    let shift_end = offset_of_day(store.picking_end_time());
    for entry in schedule {
        let limit = offset_of_day(entry.order.complete_by()).min(shift_end);
        if entry.start_offset() < shift_start {
            return Err(format!("{entry}: starts before the shift"));
        }
        if entry.end_offset() > limit {
            return Err(format!("{entry}: finishes after {limit}"));
        }
    }

    let mut by_picker: HashMap<&Picker, Vec<&ScheduleEntry>> = HashMap::new();
    for entry in schedule {
        by_picker.entry(&entry.picker).or_default().push(entry);
    }
    for entries in by_picker.values_mut() {
        entries.sort_by_key(|e| (e.start_offset(), e.end_offset()));
        for pair in entries.windows(2) {
            if pair[0].end_offset() > pair[1].start_offset() {
                return Err(format!("{} overlaps {}", pair[0], pair[1]));
            }
        }
    }

    Ok(())
}
