//! JSON adapters for orders and store descriptions.
//!
//! Orders arrive as
//! `[{"orderId": "order-1", "orderValue": "5.00", "pickingTime": "PT15M", "completeBy": "09:15"}]`
//! and the store as
//! `{"pickers": ["P1", "P2"], "pickingStartTime": "09:00", "pickingEndTime": "10:00"}`.
//! Records are deserialized into plain structs first and then turned into
//! model types through their validating constructors.

use std::collections::HashSet;
use std::str::FromStr;

use chrono::{Duration, NaiveTime};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::ModelError;
use crate::model::{Order, Picker, ScheduleEntry, Store};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderRecord {
    order_id: String,
    order_value: DecimalField,
    picking_time: String,
    complete_by: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreRecord {
    pickers: Vec<String>,
    picking_start_time: String,
    picking_end_time: String,
}

/// `orderValue` may be written as a JSON string or a JSON number.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DecimalField {
    Text(String),
    Number(serde_json::Number),
}

impl DecimalField {
    fn to_decimal(&self, field: &str) -> Result<Decimal, ModelError> {
        let text = match self {
            DecimalField::Text(s) => s.trim().to_string(),
            DecimalField::Number(n) => n.to_string(),
        };
        Decimal::from_str(&text)
            .or_else(|_| Decimal::from_scientific(&text))
            .map_err(|_| ModelError::InvalidDecimal {
                field: field.to_string(),
                value: text,
            })
    }
}

/// Parses a JSON array of order records.
///
/// Order ids must be unique.
pub fn parse_orders(json: &str) -> Result<Vec<Order>, ModelError> {
    let records: Vec<OrderRecord> = serde_json::from_str(json)?;
    let mut seen = HashSet::with_capacity(records.len());
    let mut orders = Vec::with_capacity(records.len());

    for record in records {
        if !seen.insert(record.order_id.clone()) {
            return Err(ModelError::DuplicateOrder(record.order_id));
        }
        let value = record
            .order_value
            .to_decimal(&format!("{}.orderValue", record.order_id))?;
        let picking_time = parse_iso_duration(&record.picking_time)?;
        let complete_by = parse_time_of_day(&record.complete_by)?;
        orders.push(Order::new(record.order_id, value, picking_time, complete_by)?);
    }
    Ok(orders)
}

/// Parses a store description.
pub fn parse_store(json: &str) -> Result<Store, ModelError> {
    let record: StoreRecord = serde_json::from_str(json)?;
    let pickers = record.pickers.into_iter().map(Picker::new).collect();
    Store::new(
        pickers,
        parse_time_of_day(&record.picking_start_time)?,
        parse_time_of_day(&record.picking_end_time)?,
    )
}

/// Parses a time of day written as `HH:MM` or `HH:MM:SS`.
pub fn parse_time_of_day(text: &str) -> Result<NaiveTime, ModelError> {
    let text = text.trim();
    NaiveTime::parse_from_str(text, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M"))
        .map_err(|_| ModelError::InvalidTime(text.to_string()))
}

/// Parses an ISO-8601 duration with whole-number components.
///
/// Accepts `PnDTnHnMnS` with any subset of components present, e.g. `PT45M`,
/// `PT1H30M`, `PT0S` or `P1D`. Years, months, weeks, signs and fractional
/// values are rejected.
///
/// ```
/// use u_picking::io::parse_iso_duration;
///
/// assert_eq!(parse_iso_duration("PT1H30M").unwrap().num_minutes(), 90);
/// assert!(parse_iso_duration("PT10.5S").is_err());
/// ```
pub fn parse_iso_duration(text: &str) -> Result<Duration, ModelError> {
    let invalid = || ModelError::InvalidDuration(text.to_string());

    let body = text.trim().strip_prefix('P').ok_or_else(invalid)?;
    let (date_part, time_part) = match body.split_once('T') {
        Some((date, time)) if !time.is_empty() => (date, Some(time)),
        Some(_) => return Err(invalid()),
        None => (body, None),
    };
    if date_part.is_empty() && time_part.is_none() {
        return Err(invalid());
    }

    let mut seconds: i64 = 0;
    for (amount, unit) in components(date_part).ok_or_else(invalid)? {
        match unit {
            'D' => seconds = add_scaled(seconds, amount, 86_400).ok_or_else(invalid)?,
            _ => return Err(invalid()),
        }
    }

    if let Some(time_part) = time_part {
        let mut last_rank = 0;
        for (amount, unit) in components(time_part).ok_or_else(invalid)? {
            let (rank, scale) = match unit {
                'H' => (1, 3_600),
                'M' => (2, 60),
                'S' => (3, 1),
                _ => return Err(invalid()),
            };
            if rank <= last_rank {
                return Err(invalid());
            }
            last_rank = rank;
            seconds = add_scaled(seconds, amount, scale).ok_or_else(invalid)?;
        }
    }

    Duration::try_seconds(seconds).ok_or_else(invalid)
}

/// Splits `"1H30M"` into `[(1, 'H'), (30, 'M')]`.
fn components(text: &str) -> Option<Vec<(i64, char)>> {
    let mut out = Vec::new();
    let mut digits = String::new();
    for c in text.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
        } else {
            if digits.is_empty() {
                return None;
            }
            out.push((digits.parse().ok()?, c));
            digits.clear();
        }
    }
    digits.is_empty().then_some(out)
}

fn add_scaled(total: i64, amount: i64, scale: i64) -> Option<i64> {
    amount.checked_mul(scale)?.checked_add(total)
}

/// One line per entry: `<picker> <order> <HH:MM>`.
pub fn render_schedule(schedule: &[ScheduleEntry]) -> String {
    schedule
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
