//! Shared plumbing for the Firebase clients
//!
//! Holds the error type, the session handle shared by the auth and Firestore
//! clients, and [`connect`], which builds both from a [`FirebaseConfig`].

use crate::auth::FirebaseAuthClient;
use crate::firestore::FirestoreClient;
use bookcal_common::http::create_client;
use bookcal_common::{BookcalError, Session};
use bookcal_config::env_vars::{secret_path_to_env_var, SECRET_MARKER};
use bookcal_config::FirebaseConfig;
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;

/// Production endpoint of the Identity Toolkit API
pub const DEFAULT_AUTH_BASE_URL: &str = "https://identitytoolkit.googleapis.com";

/// Production endpoint of the Cloud Firestore API
pub const DEFAULT_FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com";

/// Errors that can occur when talking to Firebase
#[derive(Error, Debug)]
pub enum FirebaseError {
    /// The Identity Toolkit rejected the sign-in (e.g. `INVALID_LOGIN_CREDENTIALS`)
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// Error during HTTP request to a Firebase API
    #[error("HTTP request error: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Missing or invalid configuration
    #[error("Missing configuration: {0}")]
    ConfigError(String),

    /// Non-success response returned by a Firebase API
    #[error("Firebase API error: {0}")]
    ApiError(String),

    /// A Firestore document could not be mapped to or from JSON
    #[error("Failed to decode Firestore data: {0}")]
    DecodeError(String),
}

impl From<FirebaseError> for BookcalError {
    fn from(err: FirebaseError) -> Self {
        match err {
            FirebaseError::AuthError(msg) => BookcalError::AuthError(msg),
            FirebaseError::RequestError(e) => BookcalError::HttpError(e.to_string()),
            FirebaseError::ConfigError(msg) => BookcalError::ConfigError(msg),
            FirebaseError::ApiError(msg) => BookcalError::HttpError(msg),
            FirebaseError::DecodeError(msg) => BookcalError::ParseError(msg),
        }
    }
}

/// The signed-in session, shared between the auth client and the Firestore client.
#[derive(Debug, Clone, Default)]
pub struct SessionHandle(Arc<RwLock<Option<Session>>>);

impl SessionHandle {
    pub fn get(&self) -> Option<Session> {
        self.0.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn set(&self, session: Option<Session>) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = session;
    }

    /// Bearer token for Firestore requests, if someone is signed in.
    pub fn id_token(&self) -> Option<String> {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|session| session.id_token.clone())
    }
}

/// Auth and Firestore clients wired to the same HTTP client and session.
#[derive(Debug, Clone)]
pub struct FirebaseClients {
    pub auth: FirebaseAuthClient,
    pub firestore: FirestoreClient,
}

/// Build both Firebase clients from configuration.
///
/// # Errors
///
/// Returns `ConfigError` when the API key or project id is empty or the API
/// key is still the unresolved `secret_from_env` marker, and `RequestError`
/// when the HTTP client cannot be built.
pub fn connect(config: &FirebaseConfig) -> Result<FirebaseClients, FirebaseError> {
    if config.api_key.trim().is_empty() {
        return Err(FirebaseError::ConfigError(
            "firebase.api_key is empty".to_string(),
        ));
    }
    if config.api_key == SECRET_MARKER {
        return Err(FirebaseError::ConfigError(format!(
            "firebase.api_key is not resolved, set {}",
            secret_path_to_env_var("firebase.api_key")
        )));
    }
    if config.project_id.trim().is_empty() {
        return Err(FirebaseError::ConfigError(
            "firebase.project_id is empty".to_string(),
        ));
    }

    let http = create_client(config.request_timeout_secs)?;
    let session = SessionHandle::default();

    let auth_base = config
        .auth_base_url
        .as_deref()
        .unwrap_or(DEFAULT_AUTH_BASE_URL);
    let firestore_base = config
        .firestore_base_url
        .as_deref()
        .unwrap_or(DEFAULT_FIRESTORE_BASE_URL);

    let auth = FirebaseAuthClient::new(
        http.clone(),
        auth_base,
        &config.api_key,
        config.auth_domain.as_deref(),
        session.clone(),
    );
    let firestore = FirestoreClient::new(
        http,
        firestore_base,
        &config.project_id,
        &config.database_id,
        session,
    );

    Ok(FirebaseClients { auth, firestore })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookcal_common::SignInMethod;

    fn config() -> FirebaseConfig {
        FirebaseConfig {
            api_key: "key".to_string(),
            project_id: "calapp".to_string(),
            auth_domain: None,
            database_id: "(default)".to_string(),
            auth_base_url: None,
            firestore_base_url: None,
            request_timeout_secs: 5,
        }
    }

    #[test]
    fn test_connect_rejects_missing_project() {
        let mut cfg = config();
        cfg.project_id = " ".to_string();

        assert!(matches!(connect(&cfg), Err(FirebaseError::ConfigError(_))));
    }

    #[test]
    fn test_connect_rejects_unresolved_api_key() {
        let mut cfg = config();
        cfg.api_key = "secret_from_env".to_string();

        match connect(&cfg) {
            Err(FirebaseError::ConfigError(msg)) => {
                assert!(msg.contains("BOOKCAL_SECRET_FIREBASE_API_KEY"))
            }
            other => panic!("expected ConfigError, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_clients_share_the_session() {
        let clients = connect(&config()).unwrap();
        assert!(clients.firestore.session().id_token().is_none());

        clients.auth.session().set(Some(Session {
            user_id: "u1".to_string(),
            email: None,
            display_name: None,
            id_token: "tok".to_string(),
            refresh_token: None,
            method: SignInMethod::Password,
        }));

        assert_eq!(clients.firestore.session().id_token().as_deref(), Some("tok"));
    }

    #[test]
    fn test_auth_error_maps_to_auth_kind() {
        let err: BookcalError = FirebaseError::AuthError("INVALID_PASSWORD".to_string()).into();
        assert_eq!(err.kind(), "auth");
    }
}
