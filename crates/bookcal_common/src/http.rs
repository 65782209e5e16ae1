// --- File: crates/bookcal_common/src/http.rs ---
use reqwest::{Client, Error as ReqwestError, Response};
use std::time::Duration;

/// Creates an HTTP client with the given request timeout.
///
/// Every remote call made by the backends goes through a client built here,
/// so a hung request fails after `timeout_secs` instead of never resolving.
pub fn create_client(timeout_secs: u64) -> Result<Client, ReqwestError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
}

/// Reads a non-success response into `"<status>: <body>"` for error messages.
pub async fn describe_failure(response: Response) -> String {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|err| format!("<unreadable body: {err}>"));
    format!("{status}: {body}")
}
