use crate::error::CalendarError;
use bookcal_config::{CalendarConfig, MoveStrategy};
use chrono::{Duration, NaiveTime};
use chrono_tz::Tz;

/// First and last visible time of day on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleHours {
    pub min: NaiveTime,
    pub max: NaiveTime,
}

impl VisibleHours {
    pub fn parse(min: &str, max: &str) -> Result<Self, CalendarError> {
        let min = parse_time_of_day(min)?;
        let max = parse_time_of_day(max)?;
        if min >= max {
            return Err(CalendarError::InvalidSettings(format!(
                "slot_min_time {min} is not before slot_max_time {max}"
            )));
        }
        Ok(Self { min, max })
    }

    pub fn contains(&self, time: NaiveTime) -> bool {
        time >= self.min && time < self.max
    }
}

impl Default for VisibleHours {
    fn default() -> Self {
        Self {
            min: NaiveTime::from_hms_opt(8, 0, 0).unwrap_or(NaiveTime::MIN),
            max: NaiveTime::from_hms_opt(18, 0, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

fn parse_time_of_day(value: &str) -> Result<NaiveTime, CalendarError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|e| CalendarError::InvalidSettings(format!("time of day {value:?}: {e}")))
}

/// Validated `[calendar]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarSettings {
    pub collection: String,
    pub slot_length: Duration,
    pub visible_hours: VisibleHours,
    pub time_zone: Tz,
    pub move_strategy: MoveStrategy,
}

impl CalendarSettings {
    pub fn from_config(config: &CalendarConfig) -> Result<Self, CalendarError> {
        if config.collection.trim().is_empty() {
            return Err(CalendarError::InvalidSettings(
                "collection must not be empty".to_string(),
            ));
        }
        if config.slot_duration_minutes <= 0 {
            return Err(CalendarError::InvalidSettings(format!(
                "slot_duration_minutes must be positive, got {}",
                config.slot_duration_minutes
            )));
        }
        let time_zone: Tz = config.time_zone.parse().map_err(|e| {
            CalendarError::InvalidSettings(format!("time_zone {:?}: {}", config.time_zone, e))
        })?;
        Ok(Self {
            collection: config.collection.clone(),
            slot_length: Duration::minutes(config.slot_duration_minutes),
            visible_hours: VisibleHours::parse(&config.slot_min_time, &config.slot_max_time)?,
            time_zone,
            move_strategy: config.move_strategy,
        })
    }
}

impl Default for CalendarSettings {
    fn default() -> Self {
        Self {
            collection: "bookings".to_string(),
            slot_length: Duration::minutes(30),
            visible_hours: VisibleHours::default(),
            time_zone: chrono_tz::Europe::Paris,
            move_strategy: MoveStrategy::Upsert,
        }
    }
}
