//! Firebase backend for bookcal.
//!
//! This crate talks to two Google REST APIs directly from the client, the way
//! the Firebase web SDK does:
//!
//! - the Identity Toolkit (`accounts:signInWithPassword`, `accounts:signInWithIdp`)
//!   behind [`FirebaseAuthClient`], which implements
//!   [`bookcal_common::IdentityProvider`];
//! - Cloud Firestore (`documents`, `:runQuery`, `:commit`) behind
//!   [`FirestoreClient`], which implements [`bookcal_common::DocumentStore`].
//!
//! Both share one HTTP client and one [`SessionHandle`], so Firestore requests
//! carry the id token of whoever is signed in.
//!
//! # Example
//!
//! ```rust,no_run
//! use bookcal_config::FirebaseConfig;
//! use bookcal_common::IdentityProvider;
//!
//! async fn sign_in(config: &FirebaseConfig) -> Result<(), Box<dyn std::error::Error>> {
//!     let clients = bookcal_firebase::connect(config)?;
//!     let session = clients.auth.sign_in_with_password("anne@example.com", "pw").await?;
//!     println!("signed in as {}", session.user_id);
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod codec;
pub mod firestore;
pub mod models;

pub use auth::FirebaseAuthClient;
pub use client::{connect, FirebaseClients, FirebaseError, SessionHandle};
pub use firestore::FirestoreClient;
