use std::cmp::Reverse;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

/// One submission row as stored under the collection, keyed by `id`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SubmissionRecord {
    pub id: String,
    pub mobile: String,
    pub amount: String,
    pub bank: String,
    pub pin: String,
    pub timestamp: String,
}

impl SubmissionRecord {
    pub fn new(
        id: impl Into<String>,
        mobile: impl Into<String>,
        amount: impl Into<String>,
        bank: impl Into<String>,
        pin: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            mobile: mobile.into(),
            amount: amount.into(),
            bank: bank.into(),
            pin: pin.into(),
            timestamp: timestamp.into(),
        }
    }

    /// Builds a record from one child of a collection snapshot.
    ///
    /// Returns `None` when the child is not a JSON object. Scalar fields are
    /// taken in their textual form, and missing or null fields become empty.
    pub fn from_snapshot_entry(id: &str, value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        Some(Self {
            id: id.to_string(),
            mobile: field_text(obj, "mobile"),
            amount: field_text(obj, "amount"),
            bank: field_text(obj, "bank"),
            pin: field_text(obj, "pin"),
            timestamp: field_text(obj, "timestamp"),
        })
    }

    pub fn instant(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.timestamp)
    }
}

fn field_text(obj: &Map<String, Value>, key: &str) -> String {
    match obj.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Parses a stored timestamp into a UTC instant.
///
/// Accepts RFC 3339 strings, naive `YYYY-MM-DD[ T]HH:MM:SS[.fff]` and bare
/// dates (read as UTC), a bare four-digit year (January 1st, UTC), and
/// integer or float epoch milliseconds.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if raw.len() == 4 && raw.bytes().all(|b| b.is_ascii_digit()) {
        return raw
            .parse::<i32>()
            .ok()
            .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1))
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| Utc.from_utc_datetime(&naive));
    }
    if let Ok(ms) = raw.parse::<i64>() {
        return Utc.timestamp_millis_opt(ms).single();
    }
    if let Ok(ms) = raw.parse::<f64>() {
        if ms.is_finite() {
            return Utc.timestamp_millis_opt(ms.trunc() as i64).single();
        }
        return None;
    }
    for fmt in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Orders records newest first. Undated records go last; ties keep their
/// incoming order.
pub fn sort_newest_first(records: &mut [SubmissionRecord]) {
    records.sort_by_cached_key(|r| {
        let instant = r.instant();
        (instant.is_none(), Reverse(instant))
    });
}

/// Decodes a full collection snapshot (`null` or an object keyed by id).
///
/// Children that are not objects are skipped with a warning.
pub fn records_from_snapshot(snapshot: &Value) -> Vec<SubmissionRecord> {
    let Some(children) = snapshot.as_object() else {
        if !snapshot.is_null() {
            tracing::warn!("collection snapshot is not an object, treating as empty");
        }
        return Vec::new();
    };
    let mut out = Vec::with_capacity(children.len());
    for (id, child) in children {
        match SubmissionRecord::from_snapshot_entry(id, child) {
            Some(record) => out.push(record),
            None => tracing::warn!(id = %id, "skipping snapshot child that is not an object"),
        }
    }
    out
}
