//! Backend construction from configuration.

use bookcal_common::{BookcalError, InMemoryDocumentStore, InMemoryIdentityProvider};
use bookcal_config::env_vars::SECRET_MARKER;
use bookcal_config::{AppConfig, MemoryBackendConfig};
use bookcal_firebase::{connect, FirebaseClients};
use tracing::{info, warn};

/// In-process backend seeded with the configured accounts. Accounts whose
/// password is still the unresolved `secret_from_env` marker are left out.
pub fn memory_backend(config: &MemoryBackendConfig) -> (InMemoryIdentityProvider, InMemoryDocumentStore) {
    let accounts: Vec<(String, String)> = config
        .accounts
        .iter()
        .filter(|account| {
            let resolved = account.password != SECRET_MARKER;
            if !resolved {
                warn!("Password of {} is not resolved, account skipped", account.email);
            }
            resolved
        })
        .map(|account| (account.email.clone(), account.password.clone()))
        .collect();
    if accounts.is_empty() {
        warn!("Memory backend has no accounts, only federated sign-in will work");
    }
    info!("Using in-memory backend with {} account(s)", accounts.len());
    let identity = InMemoryIdentityProvider::new(accounts);
    (identity, InMemoryDocumentStore::new())
}

/// Firestore and Identity Toolkit clients for the configured project.
pub fn firebase_backend(config: &AppConfig) -> Result<FirebaseClients, BookcalError> {
    let firebase = config.firebase_config()?;
    let clients = connect(firebase)?;
    info!(
        "Using Firebase project {} (database {})",
        firebase.project_id, firebase.database_id
    );
    Ok(clients)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookcal_common::IdentityProvider;
    use bookcal_config::AccountConfig;

    #[tokio::test]
    async fn test_memory_backend_accepts_configured_accounts() {
        let config = MemoryBackendConfig {
            accounts: vec![AccountConfig {
                email: "demo@example.com".to_string(),
                password: "pw".to_string(),
            }],
        };

        let (identity, store) = memory_backend(&config);

        assert!(identity
            .sign_in_with_password("demo@example.com", "pw")
            .await
            .is_ok());
        assert!(store.is_empty("bookings"));
    }

    #[tokio::test]
    async fn test_memory_backend_skips_unresolved_passwords() {
        let config = MemoryBackendConfig {
            accounts: vec![AccountConfig {
                email: "demo@example.com".to_string(),
                password: "secret_from_env".to_string(),
            }],
        };

        let (identity, _) = memory_backend(&config);

        assert!(identity
            .sign_in_with_password("demo@example.com", "secret_from_env")
            .await
            .is_err());
    }

    #[test]
    fn test_firebase_backend_requires_section() {
        let config = AppConfig::default();
        assert!(matches!(
            firebase_backend(&config),
            Err(BookcalError::ConfigError(_))
        ));
    }
}
