// --- File: crates/bookcal_common/src/lib.rs ---

pub mod error; // Error taxonomy shared by every crate
pub mod http; // HTTP client construction
pub mod logging; // Logging initialisation
pub mod memory; // In-process store and identity provider
pub mod services; // Backend traits (document store, identity provider)

pub use error::{
    auth_error, config_error, fetch_error, parse_error, write_error,
    BookcalError, Context,
};

pub use logging::{init, init_with_level, log_result};

pub use services::{
    BoxFuture, Document, DocumentStore, FederatedCredential, IdentityProvider, Session,
    SignInMethod, StoreWrite, StoredDocument,
};

pub use memory::{InMemoryDocumentStore, InMemoryIdentityProvider, MemoryError};
