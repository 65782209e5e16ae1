use bookcal_common::{config_error, fetch_error, parse_error, write_error, BookcalError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    #[error("Invalid slot time {value:?}: {reason}")]
    InvalidSlotTime { value: String, reason: String },
    #[error("Record has no {0}")]
    IncompleteRecord(&'static str),
    #[error("Invalid record: {0}")]
    InvalidRecord(String),
    #[error("Invalid calendar settings: {0}")]
    InvalidSettings(String),
    #[error("Fetching bookings failed: {0}")]
    Fetch(String),
    #[error("Writing bookings failed: {0}")]
    Write(String),
}

impl From<CalendarError> for BookcalError {
    fn from(err: CalendarError) -> Self {
        match err {
            CalendarError::Fetch(msg) => fetch_error(msg),
            CalendarError::Write(msg) => write_error(msg),
            CalendarError::InvalidSettings(msg) => config_error(msg),
            other => parse_error(other),
        }
    }
}
