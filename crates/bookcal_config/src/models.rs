// --- File: crates/bookcal_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- Backend selection ---
/// Which managed backend the application talks to.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Firestore + Firebase Identity Toolkit over REST.
    #[default]
    Firebase,
    /// In-process store and identity provider, nothing leaves the process.
    Memory,
}

// --- Firebase Config ---
// The web API key is a "secret_from_env" candidate: BOOKCAL_SECRET_FIREBASE_API_KEY
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FirebaseConfig {
    pub api_key: String,    // Mandatory
    pub project_id: String, // Mandatory
    #[serde(default)]
    pub auth_domain: Option<String>,
    #[serde(default = "default_database_id")]
    pub database_id: String,
    /// Overrides https://identitytoolkit.googleapis.com (emulator, tests)
    #[serde(default)]
    pub auth_base_url: Option<String>,
    /// Overrides https://firestore.googleapis.com (emulator, tests)
    #[serde(default)]
    pub firestore_base_url: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_database_id() -> String {
    "(default)".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

// --- Calendar Config ---
/// How a dragged booking is written back to the store.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MoveStrategy {
    /// Single atomic commit keyed by the booking id.
    #[default]
    Upsert,
    /// Query, delete every match, then insert. Not atomic.
    DeleteThenInsert,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct CalendarConfig {
    #[serde(default = "default_collection")]
    pub collection: String,
    #[serde(default = "default_slot_duration_minutes")]
    pub slot_duration_minutes: i64,
    /// First visible time of day, "HH:MM"
    #[serde(default = "default_slot_min_time")]
    pub slot_min_time: String,
    /// Last visible time of day, "HH:MM"
    #[serde(default = "default_slot_max_time")]
    pub slot_max_time: String,
    /// IANA zone the wire-format wall-clock times are read in
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
    #[serde(default)]
    pub move_strategy: MoveStrategy,
}

fn default_collection() -> String {
    "bookings".to_string()
}

fn default_slot_duration_minutes() -> i64 {
    30
}

fn default_slot_min_time() -> String {
    "08:00".to_string()
}

fn default_slot_max_time() -> String {
    "18:00".to_string()
}

fn default_time_zone() -> String {
    "Europe/Paris".to_string()
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            collection: default_collection(),
            slot_duration_minutes: default_slot_duration_minutes(),
            slot_min_time: default_slot_min_time(),
            slot_max_time: default_slot_max_time(),
            time_zone: default_time_zone(),
            move_strategy: MoveStrategy::default(),
        }
    }
}

// --- Memory backend Config ---
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct AccountConfig {
    pub email: String,
    pub password: String, // "secret_from_env" allowed
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct MemoryBackendConfig {
    #[serde(default)]
    pub accounts: Vec<AccountConfig>,
}

// --- Logging Config ---
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Optional directory for a daily rolling log file
    #[serde(default)]
    pub directory: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: None,
        }
    }
}

// --- Unified App Configuration ---
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub backend: BackendKind,

    // Required when backend = "firebase"
    #[serde(default)]
    pub firebase: Option<FirebaseConfig>,
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub memory: MemoryBackendConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}
