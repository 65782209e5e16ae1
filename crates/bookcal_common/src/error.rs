// --- File: crates/bookcal_common/src/error.rs ---
use std::fmt;
use thiserror::Error;

/// The base error type for bookcal.
///
/// `AuthError`, `FetchError` and `WriteError` are the three failure kinds a
/// calendar command can run into; the others come from the ambient layers.
#[derive(Error, Debug)]
pub enum BookcalError {
    /// Bad credentials or identity provider failure
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// Reading the booking collection failed
    #[error("Fetch error: {0}")]
    FetchError(String),

    /// Insert, delete or commit against the booking collection failed
    #[error("Write error: {0}")]
    WriteError(String),

    /// Error occurred during an HTTP request
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Error occurred while parsing data
    #[error("Failed to parse data: {0}")]
    ParseError(String),

    /// Error occurred due to missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error occurred due to an internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl BookcalError {
    /// Short name of the variant, used as a structured logging field.
    pub fn kind(&self) -> &'static str {
        match self {
            BookcalError::AuthError(_) => "auth",
            BookcalError::FetchError(_) => "fetch",
            BookcalError::WriteError(_) => "write",
            BookcalError::HttpError(_) => "http",
            BookcalError::ParseError(_) => "parse",
            BookcalError::ConfigError(_) => "config",
            BookcalError::InternalError(_) => "internal",
        }
    }
}

/// A trait for adding context to errors.
pub trait Context<T, E> {
    /// Adds context to an error.
    fn context<C>(self, context: C) -> Result<T, BookcalError>
    where
        C: fmt::Display + Send + Sync + 'static;
}

impl<T, E: std::error::Error + Send + Sync + 'static> Context<T, E> for Result<T, E> {
    fn context<C>(self, context: C) -> Result<T, BookcalError>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|error| BookcalError::InternalError(format!("{}: {}", context, error)))
    }
}

// Common error conversions
impl From<reqwest::Error> for BookcalError {
    fn from(err: reqwest::Error) -> Self {
        BookcalError::HttpError(err.to_string())
    }
}

impl From<serde_json::Error> for BookcalError {
    fn from(err: serde_json::Error) -> Self {
        BookcalError::ParseError(err.to_string())
    }
}

impl From<std::io::Error> for BookcalError {
    fn from(err: std::io::Error) -> Self {
        BookcalError::InternalError(err.to_string())
    }
}

impl From<bookcal_config::ConfigError> for BookcalError {
    fn from(err: bookcal_config::ConfigError) -> Self {
        BookcalError::ConfigError(err.to_string())
    }
}

// Utility functions for error handling
pub fn auth_error<T: fmt::Display>(message: T) -> BookcalError {
    BookcalError::AuthError(message.to_string())
}

pub fn fetch_error<T: fmt::Display>(message: T) -> BookcalError {
    BookcalError::FetchError(message.to_string())
}

pub fn write_error<T: fmt::Display>(message: T) -> BookcalError {
    BookcalError::WriteError(message.to_string())
}

pub fn parse_error<T: fmt::Display>(message: T) -> BookcalError {
    BookcalError::ParseError(message.to_string())
}

pub fn config_error<T: fmt::Display>(message: T) -> BookcalError {
    BookcalError::ConfigError(message.to_string())
}
