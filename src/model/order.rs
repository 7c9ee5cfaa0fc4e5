use chrono::{Duration, NaiveTime};
use rust_decimal::Decimal;

use super::{seconds_of_day, Store};
use crate::error::ModelError;

/// A worker that picks one order at a time. Equality is by identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Picker {
    id: String,
}

impl Picker {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

/// A customer order with a value, a picking time and a completion deadline.
///
/// Two orders are equal iff every field matches.
///
/// # Examples
///
/// ```
/// use chrono::{Duration, NaiveTime};
/// use rust_decimal::Decimal;
/// use u_picking::model::Order;
///
/// let order = Order::new(
///     "order-1",
///     Decimal::new(500, 2),
///     Duration::minutes(15),
///     NaiveTime::from_hms_opt(9, 15, 0).unwrap(),
/// )
/// .unwrap();
/// assert_eq!(order.picking_seconds(), 900);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Order {
    id: String,
    value: Decimal,
    picking_time: Duration,
    complete_by: NaiveTime,
}

impl Order {
    /// Builds an order, rejecting negative values, negative durations and
    /// durations with a sub-second part.
    pub fn new(
        id: impl Into<String>,
        value: Decimal,
        picking_time: Duration,
        complete_by: NaiveTime,
    ) -> Result<Self, ModelError> {
        let id = id.into();
        if value.is_sign_negative() && !value.is_zero() {
            return Err(ModelError::NegativeValue { order_id: id, value });
        }
        if picking_time < Duration::zero() {
            return Err(ModelError::NegativeDuration { order_id: id });
        }
        if picking_time != Duration::seconds(picking_time.num_seconds()) {
            return Err(ModelError::SubSecondDuration { order_id: id });
        }
        Ok(Self {
            id,
            value,
            picking_time,
            complete_by,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn value(&self) -> Decimal {
        self.value
    }

    pub fn picking_time(&self) -> Duration {
        self.picking_time
    }

    pub fn complete_by(&self) -> NaiveTime {
        self.complete_by
    }

    /// Picking time in seconds. Exact, since sub-second times are rejected.
    pub fn picking_seconds(&self) -> i64 {
        self.picking_time.num_seconds()
    }

    /// Deadline as seconds-of-day.
    pub fn complete_by_seconds(&self) -> i64 {
        seconds_of_day(self.complete_by)
    }

    /// Latest start (seconds-of-day) that still finishes before both the
    /// order deadline and the end of the store's shift.
    ///
    /// May be negative or lie before the shift start, in which case the
    /// order cannot be picked at all.
    pub fn start_deadline(&self, store: &Store) -> i64 {
        self.complete_by_seconds().min(store.picking_end_seconds()) - self.picking_seconds()
    }
}
