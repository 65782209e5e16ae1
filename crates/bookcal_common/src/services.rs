// --- File: crates/bookcal_common/src/services.rs ---
//! Backend abstractions.
//!
//! The calendar never talks to a concrete backend. It goes through the two
//! traits below, one for the identity provider and one for the document
//! store holding the booking records. The Firebase crate implements both over
//! REST, [`crate::memory`] implements both in-process.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// A JSON-like record as stored in a collection.
pub type Document = serde_json::Map<String, Value>;

/// A record read back from the store together with its store-assigned id.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    /// Document id inside the collection (not the booking's own `id` field).
    pub id: String,
    pub fields: Document,
}

/// One write inside an atomic [`DocumentStore::commit`].
#[derive(Debug, Clone, PartialEq)]
pub enum StoreWrite {
    /// Create or fully replace the document `id`.
    Set { id: String, fields: Document },
    /// Remove the document `id`; a missing document is not an error.
    Delete { id: String },
}

/// How a session was obtained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "method")]
pub enum SignInMethod {
    Password,
    Federated { provider_id: String },
}

/// An authenticated user session.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    /// Bearer token for the document store.
    pub id_token: String,
    pub refresh_token: Option<String>,
    pub method: SignInMethod,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("display_name", &self.display_name)
            .field("id_token", &"<redacted>")
            .field("method", &self.method)
            .finish()
    }
}

/// Credential issued by an external identity provider (e.g. a Google id token).
#[derive(Clone, PartialEq, Eq)]
pub struct FederatedCredential {
    /// Provider id as the identity platform knows it, e.g. `google.com`.
    pub provider_id: String,
    pub id_token: String,
}

impl FederatedCredential {
    pub const GOOGLE: &'static str = "google.com";

    pub fn google(id_token: impl Into<String>) -> Self {
        Self {
            provider_id: Self::GOOGLE.to_string(),
            id_token: id_token.into(),
        }
    }
}

impl fmt::Debug for FederatedCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FederatedCredential")
            .field("provider_id", &self.provider_id)
            .field("id_token", &"<redacted>")
            .finish()
    }
}

/// A trait for identity provider operations.
pub trait IdentityProvider: Send + Sync {
    /// Error type returned by identity provider operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Sign in with email and password.
    fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> BoxFuture<'_, Session, Self::Error>;

    /// Sign in with a credential from an external provider.
    fn sign_in_federated(
        &self,
        credential: &FederatedCredential,
    ) -> BoxFuture<'_, Session, Self::Error>;

    /// Drop the current session.
    fn sign_out(&self) -> BoxFuture<'_, (), Self::Error>;

    /// The session kept by the provider client, if any.
    fn current_session(&self) -> Option<Session>;
}

/// A trait for document store operations on named collections.
///
/// There is no schema and no server-side validation. Only [`commit`] is atomic.
///
/// [`commit`]: DocumentStore::commit
pub trait DocumentStore: Send + Sync {
    /// Error type returned by document store operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Insert a record under a store-generated id and return that id.
    fn insert(&self, collection: &str, fields: Document) -> BoxFuture<'_, String, Self::Error>;

    /// Every record of the collection.
    fn query_all(&self, collection: &str) -> BoxFuture<'_, Vec<StoredDocument>, Self::Error>;

    /// Records whose top-level `field` equals `value`.
    fn query_where(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> BoxFuture<'_, Vec<StoredDocument>, Self::Error>;

    /// Delete one record by document id.
    fn delete_by_id(&self, collection: &str, id: &str) -> BoxFuture<'_, (), Self::Error>;

    /// Apply all writes atomically: either every write lands or none does.
    /// An empty batch succeeds without touching the store.
    fn commit(
        &self,
        collection: &str,
        writes: Vec<StoreWrite>,
    ) -> BoxFuture<'_, (), Self::Error>;
}

impl<T: IdentityProvider> IdentityProvider for Arc<T> {
    type Error = T::Error;

    fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> BoxFuture<'_, Session, Self::Error> {
        (**self).sign_in_with_password(email, password)
    }

    fn sign_in_federated(
        &self,
        credential: &FederatedCredential,
    ) -> BoxFuture<'_, Session, Self::Error> {
        (**self).sign_in_federated(credential)
    }

    fn sign_out(&self) -> BoxFuture<'_, (), Self::Error> {
        (**self).sign_out()
    }

    fn current_session(&self) -> Option<Session> {
        (**self).current_session()
    }
}

impl<T: DocumentStore> DocumentStore for Arc<T> {
    type Error = T::Error;

    fn insert(&self, collection: &str, fields: Document) -> BoxFuture<'_, String, Self::Error> {
        (**self).insert(collection, fields)
    }

    fn query_all(&self, collection: &str) -> BoxFuture<'_, Vec<StoredDocument>, Self::Error> {
        (**self).query_all(collection)
    }

    fn query_where(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> BoxFuture<'_, Vec<StoredDocument>, Self::Error> {
        (**self).query_where(collection, field, value)
    }

    fn delete_by_id(&self, collection: &str, id: &str) -> BoxFuture<'_, (), Self::Error> {
        (**self).delete_by_id(collection, id)
    }

    fn commit(
        &self,
        collection: &str,
        writes: Vec<StoreWrite>,
    ) -> BoxFuture<'_, (), Self::Error> {
        (**self).commit(collection, writes)
    }
}
