//! Wall-clock slot bounds in the `dd/MM/yyyy HH:mm` wire format.

use crate::error::CalendarError;
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// chrono pattern of the stored `startTime`/`endTime` strings.
pub const SLOT_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Years a four-digit wire year can carry.
const WIRE_YEARS: RangeInclusive<i32> = 1..=9999;

/// A slot bound at minute precision, in the calendar's time zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotTime(NaiveDateTime);

impl SlotTime {
    /// Seconds and below are dropped.
    pub fn new(at: NaiveDateTime) -> Self {
        let minute = at
            .with_second(0)
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or(at);
        Self(minute)
    }

    pub fn from_parts(date: NaiveDate, time: NaiveTime) -> Self {
        Self::new(date.and_time(time))
    }

    /// The wall-clock time of `instant` in `zone`.
    pub fn from_instant(instant: DateTime<Utc>, zone: Tz) -> Self {
        Self::new(instant.with_timezone(&zone).naive_local())
    }

    pub fn parse(value: &str) -> Result<Self, CalendarError> {
        let invalid = |reason: String| CalendarError::InvalidSlotTime {
            value: value.to_string(),
            reason,
        };
        let at = NaiveDateTime::parse_from_str(value.trim(), SLOT_FORMAT)
            .map_err(|e| invalid(e.to_string()))?;
        if !WIRE_YEARS.contains(&at.year()) {
            return Err(invalid(format!(
                "year {} is outside {}..={}",
                at.year(),
                WIRE_YEARS.start(),
                WIRE_YEARS.end()
            )));
        }
        Ok(Self(at))
    }

    pub fn naive(&self) -> NaiveDateTime {
        self.0
    }

    pub fn date(&self) -> NaiveDate {
        self.0.date()
    }

    pub fn time(&self) -> NaiveTime {
        self.0.time()
    }

    /// `self + duration`, or `InvalidSlotTime` past the end of the calendar.
    pub fn plus(self, duration: Duration) -> Result<Self, CalendarError> {
        self.0
            .checked_add_signed(duration)
            .map(Self::new)
            .ok_or_else(|| CalendarError::InvalidSlotTime {
                value: self.to_wire(),
                reason: format!("adding {duration} leaves the calendar range"),
            })
    }

    /// Signed distance from `earlier` to `self`.
    pub fn since(self, earlier: SlotTime) -> Duration {
        self.0 - earlier.0
    }

    pub fn to_wire(&self) -> String {
        self.0.format(SLOT_FORMAT).to_string()
    }
}

impl fmt::Display for SlotTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(SLOT_FORMAT))
    }
}

impl FromStr for SlotTime {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for SlotTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SlotTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_and_format_wire_value() {
        let slot = SlotTime::parse("03/06/2024 10:00").unwrap();
        assert_eq!(
            slot.naive(),
            NaiveDate::from_ymd_opt(2024, 6, 3)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap()
        );
        assert_eq!(slot.to_wire(), "03/06/2024 10:00");
        assert_eq!(
            slot.plus(Duration::minutes(30)).unwrap().to_string(),
            "03/06/2024 10:30"
        );
    }

    #[test]
    fn test_parse_rejects_other_formats() {
        for bad in ["2024-06-03 10:00", "03/06/2024", "", "32/06/2024 10:00", "03/06/2024 25:00"] {
            assert!(
                matches!(SlotTime::parse(bad), Err(CalendarError::InvalidSlotTime { .. })),
                "{bad:?} should not parse"
            );
        }
    }

    #[test]
    fn test_parse_rejects_years_beyond_four_digits() {
        for far in ["31/12/+262142 23:45", "01/01/10000 00:00", "01/01/0000 00:00"] {
            assert!(
                matches!(SlotTime::parse(far), Err(CalendarError::InvalidSlotTime { .. })),
                "{far:?} should not parse"
            );
        }
        assert!(SlotTime::parse("31/12/9999 23:30").is_ok());
    }

    #[test]
    fn test_plus_reports_overflow() {
        let last = SlotTime::new(NaiveDateTime::MAX);
        assert!(matches!(
            last.plus(Duration::minutes(30)),
            Err(CalendarError::InvalidSlotTime { .. })
        ));

        let slot = SlotTime::parse("31/12/9999 23:30").unwrap();
        assert_eq!(
            slot.plus(Duration::minutes(30)).unwrap().naive(),
            NaiveDate::from_ymd_opt(10000, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn test_new_drops_seconds() {
        let at = NaiveDate::from_ymd_opt(2024, 6, 3)
            .unwrap()
            .and_hms_milli_opt(10, 0, 42, 500)
            .unwrap();
        assert_eq!(SlotTime::new(at).to_wire(), "03/06/2024 10:00");
        assert_eq!(SlotTime::new(at), SlotTime::parse("03/06/2024 10:00").unwrap());
    }

    #[test]
    fn test_from_instant_uses_calendar_zone() {
        // 08:00 UTC is 10:00 in Paris during summer time.
        let instant = Utc.with_ymd_and_hms(2024, 6, 3, 8, 0, 0).unwrap();
        let slot = SlotTime::from_instant(instant, chrono_tz::Europe::Paris);
        assert_eq!(slot.to_wire(), "03/06/2024 10:00");
    }

    #[test]
    fn test_serde_as_wire_string() {
        let slot = SlotTime::parse("03/06/2024 10:00").unwrap();
        assert_eq!(serde_json::to_value(slot).unwrap(), serde_json::json!("03/06/2024 10:00"));
        let back: SlotTime = serde_json::from_value(serde_json::json!("03/06/2024 10:00")).unwrap();
        assert_eq!(back, slot);
        assert!(serde_json::from_value::<SlotTime>(serde_json::json!("nope")).is_err());
    }
}
