//! Identity Toolkit client
//!
//! Implements [`IdentityProvider`] on top of the Firebase Auth REST API.
//! The session lives in memory only; there is no token refresh, so a session
//! is good for as long as its id token is (one hour on Firebase).

use crate::client::{FirebaseError, SessionHandle};
use crate::models::{
    ErrorEnvelope, SignInResponse, SignInWithIdpRequest, SignInWithPasswordRequest,
};
use bookcal_common::http::describe_failure;
use bookcal_common::{BoxFuture, FederatedCredential, IdentityProvider, Session, SignInMethod};
use reqwest::{Client, Response};
use serde::Serialize;
use tracing::{debug, info};

/// Fallback `requestUri` for `signInWithIdp` when no auth domain is configured.
const DEFAULT_REQUEST_URI: &str = "http://localhost";

/// Client for the Firebase Identity Toolkit API
#[derive(Debug, Clone)]
pub struct FirebaseAuthClient {
    http: Client,
    base_url: String,
    api_key: String,
    request_uri: String,
    session: SessionHandle,
}

impl FirebaseAuthClient {
    pub fn new(
        http: Client,
        base_url: &str,
        api_key: &str,
        auth_domain: Option<&str>,
        session: SessionHandle,
    ) -> Self {
        let request_uri = auth_domain
            .map(|domain| format!("https://{domain}"))
            .unwrap_or_else(|| DEFAULT_REQUEST_URI.to_string());
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            request_uri,
            session,
        }
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/v1/accounts:{}", self.base_url, method)
    }

    async fn post_sign_in<B: Serialize>(
        &self,
        method: &str,
        body: &B,
    ) -> Result<SignInResponse, FirebaseError> {
        let response = self
            .http
            .post(self.endpoint(method))
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(sign_in_failure(response).await);
        }

        Ok(response.json().await?)
    }

    fn start_session(&self, response: SignInResponse, method: SignInMethod) -> Session {
        let session = Session {
            user_id: response.local_id,
            email: response.email,
            display_name: response.display_name,
            id_token: response.id_token,
            refresh_token: response.refresh_token,
            method,
        };
        debug!(
            "session for {} expires in {}s",
            session.user_id,
            response.expires_in.as_deref().unwrap_or("?")
        );
        self.session.set(Some(session.clone()));
        session
    }
}

/// Turn a failed sign-in response into `AuthError` with the provider's error code.
///
/// 4xx answers carry `{"error": {"message": "INVALID_PASSWORD"}}`; anything
/// that does not parse that way is an `ApiError`.
async fn sign_in_failure(response: Response) -> FirebaseError {
    let status = response.status();
    if status.is_client_error() {
        let body = response.text().await.unwrap_or_default();
        return match serde_json::from_str::<ErrorEnvelope>(&body) {
            Ok(envelope) => FirebaseError::AuthError(envelope.error.message),
            Err(_) => FirebaseError::ApiError(format!("{status}: {body}")),
        };
    }
    FirebaseError::ApiError(describe_failure(response).await)
}

impl IdentityProvider for FirebaseAuthClient {
    type Error = FirebaseError;

    fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> BoxFuture<'_, Session, Self::Error> {
        let email = email.to_string();
        let password = password.to_string();
        Box::pin(async move {
            let request = SignInWithPasswordRequest {
                email: &email,
                password: &password,
                return_secure_token: true,
            };
            let response = self.post_sign_in("signInWithPassword", &request).await?;
            info!("User signed in with email: {}", email);
            Ok(self.start_session(response, SignInMethod::Password))
        })
    }

    fn sign_in_federated(
        &self,
        credential: &FederatedCredential,
    ) -> BoxFuture<'_, Session, Self::Error> {
        let credential = credential.clone();
        Box::pin(async move {
            let post_body = serde_urlencoded::to_string([
                ("id_token", credential.id_token.as_str()),
                ("providerId", credential.provider_id.as_str()),
            ])
            .map_err(|e| FirebaseError::AuthError(format!("invalid credential: {e}")))?;

            let request = SignInWithIdpRequest {
                post_body,
                request_uri: self.request_uri.clone(),
                return_idp_credential: true,
                return_secure_token: true,
            };
            let response = self.post_sign_in("signInWithIdp", &request).await?;
            info!(
                "User signed in with {}: {}",
                credential.provider_id, response.local_id
            );
            Ok(self.start_session(
                response,
                SignInMethod::Federated {
                    provider_id: credential.provider_id,
                },
            ))
        })
    }

    fn sign_out(&self) -> BoxFuture<'_, (), Self::Error> {
        Box::pin(async move {
            // Nothing to call remotely.
            self.session.set(None);
            Ok(())
        })
    }

    fn current_session(&self) -> Option<Session> {
        self.session.get()
    }
}
