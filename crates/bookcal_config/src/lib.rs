//! Configuration for the bookcal booking calendar.
//!
//! Sources are layered in this order, later ones winning:
//!
//! 1. `<config dir>/default.{toml,yaml,json}`
//! 2. `<config dir>/<RUN_ENV>.{toml,yaml,json}` (`RUN_ENV` defaults to `debug`)
//! 3. environment variables `BOOKCAL__SECTION__KEY`
//!
//! Afterwards every `"secret_from_env"` value is resolved, see [`env_vars`].

pub use config::ConfigError;
use config::{Config, Environment, File};
use once_cell::sync::OnceCell;
use std::env;
use std::path::Path;
use tracing::{debug, warn};

pub mod env_vars;
pub mod models;

pub use models::*;

/// Directory searched when `BOOKCAL_CONFIG_DIR` is unset.
pub const DEFAULT_CONFIG_DIR: &str = "config";

/// Loads the configuration from `BOOKCAL_CONFIG_DIR` (or `./config`) and the environment.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();

    let config_dir =
        env::var("BOOKCAL_CONFIG_DIR").unwrap_or_else(|_| DEFAULT_CONFIG_DIR.to_string());
    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| "debug".to_string());

    load_config_from(Path::new(&config_dir), &run_env)
}

/// Loads the configuration from an explicit directory and run environment.
pub fn load_config_from(config_dir: &Path, run_env: &str) -> Result<AppConfig, ConfigError> {
    let prefix = env_vars::get_config_prefix();

    let default_path = config_dir.join("default");
    let env_path = config_dir.join(run_env);
    debug!(
        "loading config from {} and {}",
        default_path.display(),
        env_path.display()
    );

    let builder = Config::builder()
        .add_source(File::with_name(&default_path.to_string_lossy()).required(false))
        .add_source(File::with_name(&env_path.to_string_lossy()).required(false))
        .add_source(Environment::with_prefix(&prefix).separator(env_vars::CONFIG_SEPARATOR));

    let raw_config: AppConfig = builder.build()?.try_deserialize()?;
    apply_env_overrides_from_marker(raw_config)
}

/// Applies environment overrides based on "secret_from_env" markers in the serialized config
pub fn apply_env_overrides_from_marker(config: AppConfig) -> Result<AppConfig, ConfigError> {
    let mut json = serde_json::to_value(&config)
        .map_err(|err| ConfigError::Message(format!("failed to serialize config: {err}")))?;
    let unresolved = env_vars::inject_env_vars(&mut json);
    for path in &unresolved {
        warn!(
            "{} is still {:?}, set {}",
            path,
            env_vars::SECRET_MARKER,
            env_vars::secret_path_to_env_var(path)
        );
    }
    serde_json::from_value(json)
        .map_err(|err| ConfigError::Message(format!("failed to rebuild config: {err}")))
}

impl AppConfig {
    /// The Firebase section, required when the Firebase backend is selected.
    pub fn firebase_config(&self) -> Result<&FirebaseConfig, ConfigError> {
        self.firebase
            .as_ref()
            .ok_or_else(|| ConfigError::NotFound("firebase".to_string()))
    }
}

static INIT_DOTENV: OnceCell<()> = OnceCell::new();

/// Loads the dotenv file into the process environment once.
///
/// The file is `DOTENV_OVERRIDE` if set, else `.env`. A missing file is not an error.
/// Returns the path that was tried.
pub fn ensure_dotenv_loaded() -> String {
    let dotenv_path = env::var("DOTENV_OVERRIDE").unwrap_or_else(|_| ".env".to_string());

    INIT_DOTENV.get_or_init(|| {
        dotenv::from_filename(&dotenv_path).ok();
    });

    dotenv_path
}
