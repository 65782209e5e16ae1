//! Environment variable naming for bookcal configuration.
//!
//! Plain settings are read by the `config` crate from `BOOKCAL__SECTION__KEY`.
//! Secrets are written as the marker `"secret_from_env"` in the config files and
//! resolved here from `BOOKCAL_SECRET_SECTION_KEY`, falling back to the short
//! `SECTION_KEY` form (e.g. `FIREBASE_API_KEY`).

use serde_json::Value;
use std::env;

/// The default prefix for configuration environment variables
pub const DEFAULT_PREFIX: &str = "BOOKCAL";

/// The prefix for secret environment variables
pub const SECRET_PREFIX: &str = "BOOKCAL_SECRET";

/// The separator for configuration environment variables
pub const CONFIG_SEPARATOR: &str = "__";

/// The separator for secret environment variables
pub const SECRET_SEPARATOR: &str = "_";

/// Placeholder value that is replaced from the environment after loading.
pub const SECRET_MARKER: &str = "secret_from_env";

/// Prefix of plain settings in the environment, `BOOKCAL` unless `PREFIX` is set.
pub fn get_config_prefix() -> String {
    env::var("PREFIX").unwrap_or_else(|_| DEFAULT_PREFIX.to_string())
}

/// Convert a secret path to an environment variable name
///
/// `"firebase.api_key"` becomes `"BOOKCAL_SECRET_FIREBASE_API_KEY"`.
pub fn secret_path_to_env_var(path: &str) -> String {
    let path = path.replace('.', SECRET_SEPARATOR);
    format!("{}{}{}", SECRET_PREFIX, SECRET_SEPARATOR, path).to_uppercase()
}

/// Short form without the prefix: `"firebase.api_key"` becomes `"FIREBASE_API_KEY"`.
pub fn legacy_secret_path_to_env_var(path: &str) -> String {
    path.replace('.', SECRET_SEPARATOR).to_uppercase()
}

/// Look up the value for a secret path, prefixed name first.
pub fn get_secret_env_var(path: &str) -> Option<String> {
    env::var(secret_path_to_env_var(path))
        .or_else(|_| env::var(legacy_secret_path_to_env_var(path)))
        .ok()
}

/// Replace every `"secret_from_env"` string in `value` with its environment value.
///
/// Returns the paths that were left unresolved.
pub fn inject_env_vars(value: &mut Value) -> Vec<String> {
    fn walk(path: &mut Vec<String>, obj: &mut Value, missing: &mut Vec<String>) {
        match obj {
            Value::Object(map) => {
                for (k, v) in map.iter_mut() {
                    path.push(k.clone());
                    walk(path, v, missing);
                    path.pop();
                }
            }
            Value::Array(arr) => {
                for (i, v) in arr.iter_mut().enumerate() {
                    path.push(i.to_string());
                    walk(path, v, missing);
                    path.pop();
                }
            }
            Value::String(s) if s == SECRET_MARKER => {
                let path_str = path.join(".");
                match get_secret_env_var(&path_str) {
                    Some(env_val) => *s = env_val,
                    None => missing.push(path_str),
                }
            }
            _ => {}
        }
    }

    let mut missing = Vec::new();
    walk(&mut Vec::new(), value, &mut missing);
    missing
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_secret_path_to_env_var() {
        assert_eq!(
            secret_path_to_env_var("firebase.api_key"),
            "BOOKCAL_SECRET_FIREBASE_API_KEY"
        );
        assert_eq!(
            legacy_secret_path_to_env_var("firebase.api_key"),
            "FIREBASE_API_KEY"
        );
    }

    #[test]
    fn test_inject_env_vars_replaces_marker_and_reports_missing() {
        env::set_var("BOOKCAL_SECRET_INJECTTEST_API_KEY", "abc123");
        let mut value = json!({
            "injecttest": { "api_key": "secret_from_env", "project_id": "demo" },
            "unresolved": { "token": "secret_from_env" }
        });

        let missing = inject_env_vars(&mut value);

        assert_eq!(value["injecttest"]["api_key"], "abc123");
        assert_eq!(value["injecttest"]["project_id"], "demo");
        assert_eq!(value["unresolved"]["token"], "secret_from_env");
        assert_eq!(missing, vec!["unresolved.token".to_string()]);
    }

    #[test]
    fn test_inject_env_vars_walks_arrays() {
        env::set_var("BOOKCAL_SECRET_ARRAYTEST_ACCOUNTS_1_PASSWORD", "hunter2");
        let mut value = json!({
            "arraytest": { "accounts": [
                { "password": "plain" },
                { "password": "secret_from_env" }
            ]}
        });

        let missing = inject_env_vars(&mut value);

        assert!(missing.is_empty());
        assert_eq!(value["arraytest"]["accounts"][0]["password"], "plain");
        assert_eq!(value["arraytest"]["accounts"][1]["password"], "hunter2");
    }
}
