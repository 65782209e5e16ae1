//! The booking record and its stored form.

use crate::error::CalendarError;
use crate::slot_time::SlotTime;
use bookcal_common::{Document, StoredDocument};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BookingStatus {
    /// A draft that has not been saved yet.
    Available,
    /// Every persisted booking.
    Unavailable,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Available => "Available",
            BookingStatus::Unavailable => "Unavailable",
        }
    }

    /// Status of a stored record. Only `"Unavailable"` marks a reserved slot;
    /// anything else, including no status at all, reads as available.
    pub fn from_field(value: Option<&Value>) -> Self {
        match value {
            Some(Value::String(s)) if s == "Unavailable" => BookingStatus::Unavailable,
            _ => BookingStatus::Available,
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One booking as stored in the collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    /// Client-generated, milliseconds since the Unix epoch
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub start_time: SlotTime,
    pub end_time: SlotTime,
    pub status: BookingStatus,
}

impl Booking {
    /// A fresh draft for the slot starting at `start`.
    pub fn draft(id: String, start: SlotTime, length: Duration) -> Result<Self, CalendarError> {
        Ok(Self {
            id,
            first_name: String::new(),
            last_name: String::new(),
            start_time: start,
            end_time: start.plus(length)?,
            status: BookingStatus::Available,
        })
    }

    pub fn is_available(&self) -> bool {
        self.status == BookingStatus::Available
    }

    pub fn duration(&self) -> Duration {
        self.end_time.since(self.start_time)
    }

    /// Same booking with new bounds; everything else is kept.
    pub fn moved_to(&self, start: SlotTime, end: SlotTime) -> Self {
        Self {
            start_time: start,
            end_time: end,
            ..self.clone()
        }
    }

    /// Copy to persist on confirmation.
    pub fn reserved(&self) -> Self {
        Self {
            status: BookingStatus::Unavailable,
            ..self.clone()
        }
    }

    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        doc.insert("id".to_string(), Value::String(self.id.clone()));
        doc.insert("firstName".to_string(), Value::String(self.first_name.clone()));
        doc.insert("lastName".to_string(), Value::String(self.last_name.clone()));
        doc.insert("startTime".to_string(), Value::String(self.start_time.to_wire()));
        doc.insert("endTime".to_string(), Value::String(self.end_time.to_wire()));
        doc.insert("status".to_string(), Value::String(self.status.as_str().to_string()));
        doc
    }

    /// Read a stored record.
    ///
    /// A missing or empty bound gives `IncompleteRecord`. A bound outside the
    /// wire format or a non-string name or id is an error too. Missing names
    /// read as empty. A record without an `id` field takes the document id.
    /// The status never rejects a record, see [`BookingStatus::from_field`].
    pub fn from_stored(stored: &StoredDocument) -> Result<Self, CalendarError> {
        let fields = &stored.fields;
        let start_time = bound(fields, "startTime")?;
        let end_time = bound(fields, "endTime")?;
        let status = BookingStatus::from_field(fields.get("status"));
        let id = match text(fields, "id")? {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => stored.id.clone(),
        };
        Ok(Self {
            id,
            first_name: text(fields, "firstName")?.unwrap_or_default().to_string(),
            last_name: text(fields, "lastName")?.unwrap_or_default().to_string(),
            start_time,
            end_time,
            status,
        })
    }
}

fn text<'a>(fields: &'a Document, key: &'static str) -> Result<Option<&'a str>, CalendarError> {
    match fields.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(CalendarError::InvalidRecord(format!(
            "{key} is not a string: {other}"
        ))),
    }
}

fn bound(fields: &Document, key: &'static str) -> Result<SlotTime, CalendarError> {
    match text(fields, key)? {
        Some(raw) if !raw.trim().is_empty() => SlotTime::parse(raw),
        _ => Err(CalendarError::IncompleteRecord(key)),
    }
}

/// Hands out booking ids from the current time in milliseconds.
///
/// Two ids from one generator never collide: when the clock has not moved
/// (or went backwards) the next id is the previous one plus one.
#[derive(Debug, Default)]
pub struct BookingIdGenerator {
    last: i64,
}

impl BookingIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> String {
        self.next_at(Utc::now().timestamp_millis())
    }

    pub fn next_at(&mut self, now_millis: i64) -> String {
        let id = now_millis.max(self.last + 1);
        self.last = id;
        id.to_string()
    }
}
