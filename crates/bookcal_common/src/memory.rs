// --- File: crates/bookcal_common/src/memory.rs ---
//! In-process backends.
//!
//! Used by the `memory` backend of the application and by tests. They follow
//! the same contracts as the Firebase clients: generated ids on insert,
//! deleting a missing document succeeds, `commit` is all-or-nothing.

use crate::error::{auth_error, BookcalError};
use crate::services::{
    BoxFuture, Document, DocumentStore, FederatedCredential, IdentityProvider, Session,
    SignInMethod, StoreWrite, StoredDocument,
};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};
use thiserror::Error;
use tracing::debug;

/// Errors raised by the in-process backends.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("empty credential for provider {0}")]
    EmptyCredential(String),
}

impl From<MemoryError> for BookcalError {
    fn from(err: MemoryError) -> Self {
        auth_error(err)
    }
}

type Collections = HashMap<String, BTreeMap<String, Document>>;

/// A document store kept in a map of collections.
///
/// Generated ids are zero-padded sequence numbers, so [`DocumentStore::query_all`]
/// returns inserted records in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<Collections>,
    next_id: AtomicU64,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn generate_id(&self) -> String {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        format!("doc-{n:08}")
    }

    /// Number of documents in `collection`.
    pub fn len(&self, collection: &str) -> usize {
        let collections = self.collections.read().unwrap_or_else(PoisonError::into_inner);
        collections.get(collection).map_or(0, BTreeMap::len)
    }

    /// Whether `collection` holds no documents.
    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }

    /// Snapshot of `collection`, ordered by document id.
    pub fn snapshot(&self, collection: &str) -> Vec<StoredDocument> {
        let collections = self.collections.read().unwrap_or_else(PoisonError::into_inner);
        collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, fields)| StoredDocument {
                        id: id.clone(),
                        fields: fields.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl DocumentStore for InMemoryDocumentStore {
    type Error = MemoryError;

    fn insert(&self, collection: &str, fields: Document) -> BoxFuture<'_, String, Self::Error> {
        let collection = collection.to_string();
        Box::pin(async move {
            let id = self.generate_id();
            let mut collections = self.collections.write().unwrap_or_else(PoisonError::into_inner);
            collections
                .entry(collection.clone())
                .or_default()
                .insert(id.clone(), fields);
            debug!("inserted {} into {}", id, collection);
            Ok(id)
        })
    }

    fn query_all(&self, collection: &str) -> BoxFuture<'_, Vec<StoredDocument>, Self::Error> {
        let collection = collection.to_string();
        Box::pin(async move { Ok(self.snapshot(&collection)) })
    }

    fn query_where(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> BoxFuture<'_, Vec<StoredDocument>, Self::Error> {
        let collection = collection.to_string();
        let field = field.to_string();
        let value = value.clone();
        Box::pin(async move {
            Ok(self
                .snapshot(&collection)
                .into_iter()
                .filter(|doc| doc.fields.get(&field) == Some(&value))
                .collect())
        })
    }

    fn delete_by_id(&self, collection: &str, id: &str) -> BoxFuture<'_, (), Self::Error> {
        let collection = collection.to_string();
        let id = id.to_string();
        Box::pin(async move {
            let mut collections = self.collections.write().unwrap_or_else(PoisonError::into_inner);
            if let Some(docs) = collections.get_mut(&collection) {
                docs.remove(&id);
            }
            Ok(())
        })
    }

    fn commit(
        &self,
        collection: &str,
        writes: Vec<StoreWrite>,
    ) -> BoxFuture<'_, (), Self::Error> {
        let collection = collection.to_string();
        Box::pin(async move {
            if writes.is_empty() {
                debug!("empty commit on {}, nothing to do", collection);
                return Ok(());
            }
            // One write lock for the whole batch.
            let mut collections = self.collections.write().unwrap_or_else(PoisonError::into_inner);
            let docs = collections.entry(collection).or_default();
            for write in writes {
                match write {
                    StoreWrite::Set { id, fields } => {
                        docs.insert(id, fields);
                    }
                    StoreWrite::Delete { id } => {
                        docs.remove(&id);
                    }
                }
            }
            Ok(())
        })
    }
}

/// An identity provider backed by a fixed set of email/password accounts.
///
/// Federated sign-in accepts any non-empty credential and keys the user on
/// the provider id and token.
#[derive(Debug, Default)]
pub struct InMemoryIdentityProvider {
    accounts: HashMap<String, String>,
    session: RwLock<Option<Session>>,
    issued: AtomicU64,
}

impl InMemoryIdentityProvider {
    pub fn new<I, E, P>(accounts: I) -> Self
    where
        I: IntoIterator<Item = (E, P)>,
        E: Into<String>,
        P: Into<String>,
    {
        Self {
            accounts: accounts
                .into_iter()
                .map(|(email, password)| (email.into(), password.into()))
                .collect(),
            ..Self::default()
        }
    }

    /// Start with `session` already signed in, as after a page reload.
    pub fn with_session(self, session: Session) -> Self {
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = Some(session);
        self
    }

    fn issue_token(&self) -> String {
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        format!("memory-token-{n}")
    }

    fn store_session(&self, session: &Session) {
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
    }
}

impl IdentityProvider for InMemoryIdentityProvider {
    type Error = MemoryError;

    fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> BoxFuture<'_, Session, Self::Error> {
        let email = email.to_string();
        let password = password.to_string();
        Box::pin(async move {
            if self.accounts.get(&email) != Some(&password) {
                return Err(MemoryError::InvalidCredentials);
            }
            let session = Session {
                user_id: format!("local:{email}"),
                email: Some(email),
                display_name: None,
                id_token: self.issue_token(),
                refresh_token: None,
                method: SignInMethod::Password,
            };
            self.store_session(&session);
            Ok(session)
        })
    }

    fn sign_in_federated(
        &self,
        credential: &FederatedCredential,
    ) -> BoxFuture<'_, Session, Self::Error> {
        let credential = credential.clone();
        Box::pin(async move {
            if credential.id_token.trim().is_empty() {
                return Err(MemoryError::EmptyCredential(credential.provider_id));
            }
            let session = Session {
                user_id: format!("{}:{}", credential.provider_id, credential.id_token),
                email: None,
                display_name: None,
                id_token: self.issue_token(),
                refresh_token: None,
                method: SignInMethod::Federated {
                    provider_id: credential.provider_id,
                },
            };
            self.store_session(&session);
            Ok(session)
        })
    }

    fn sign_out(&self) -> BoxFuture<'_, (), Self::Error> {
        Box::pin(async move {
            *self.session.write().unwrap_or_else(PoisonError::into_inner) = None;
            Ok(())
        })
    }

    fn current_session(&self) -> Option<Session> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
