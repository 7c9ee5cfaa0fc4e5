use chrono::{NaiveTime, Timelike};

use super::{seconds_of_day, Picker};
use crate::error::ModelError;

/// The picking floor: available pickers and the shift window.
///
/// A picker's index in [`pickers`](Store::pickers) is its stable index
/// within one scheduling run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Store {
    pickers: Vec<Picker>,
    picking_start_time: NaiveTime,
    picking_end_time: NaiveTime,
}

impl Store {
    /// Builds a store. The shift start must not be after its end.
    pub fn new(
        pickers: Vec<Picker>,
        picking_start_time: NaiveTime,
        picking_end_time: NaiveTime,
    ) -> Result<Self, ModelError> {
        if picking_start_time > picking_end_time {
            return Err(ModelError::ShiftWindow {
                start: picking_start_time.to_string(),
                end: picking_end_time.to_string(),
            });
        }
        Ok(Self {
            pickers,
            picking_start_time,
            picking_end_time,
        })
    }

    pub fn pickers(&self) -> &[Picker] {
        &self.pickers
    }

    pub fn picking_start_time(&self) -> NaiveTime {
        self.picking_start_time
    }

    pub fn picking_end_time(&self) -> NaiveTime {
        self.picking_end_time
    }

    /// First whole second at or after the shift start.
    pub fn picking_start_seconds(&self) -> i64 {
        let seconds = seconds_of_day(self.picking_start_time);
        if self.picking_start_time.nanosecond() > 0 {
            seconds + 1
        } else {
            seconds
        }
    }

    /// Last whole second at or before the shift end.
    pub fn picking_end_seconds(&self) -> i64 {
        seconds_of_day(self.picking_end_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_rejects_inverted_shift() {
        let err = Store::new(
            vec![Picker::new("P1")],
            NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::ShiftWindow { .. }));
    }

    #[test]
    fn test_fractional_shift_bounds_round_inwards() {
        let store = Store::new(
            vec![Picker::new("P1")],
            NaiveTime::from_hms_milli_opt(9, 0, 0, 500).unwrap(),
            NaiveTime::from_hms_milli_opt(10, 0, 0, 500).unwrap(),
        )
        .unwrap();
        assert_eq!(store.picking_start_seconds(), 9 * 3600 + 1);
        assert_eq!(store.picking_end_seconds(), 10 * 3600);
    }

    #[test]
    fn test_store_allows_empty_shift_and_no_pickers() {
        let t = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        let store = Store::new(Vec::new(), t, t).unwrap();
        assert!(store.pickers().is_empty());
        assert_eq!(store.picking_start_seconds(), store.picking_end_seconds());
    }
}
