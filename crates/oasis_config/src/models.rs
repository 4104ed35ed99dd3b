// --- File: crates/oasis_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

// --- Scheduling Config ---
// Tuning knobs for the scheduling core. Everything has a sensible default so
// a bare config file still boots.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SchedulingConfig {
    /// Width of the discretized availability slot, in minutes.
    #[serde(default = "default_slot_size_minutes")]
    pub slot_size_minutes: i64,
    /// IANA time zone the branches' operating hours are expressed in.
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
    /// Staff-client poll interval for the booking diff feed, in seconds.
    #[serde(default = "default_poll_interval_seconds")]
    pub poll_interval_seconds: u64,
    /// Fallback duration for upsell services with no duration on record.
    #[serde(default = "default_upsell_fallback_duration")]
    pub upsell_fallback_duration_minutes: i64,
}

fn default_slot_size_minutes() -> i64 {
    30
}

fn default_time_zone() -> String {
    "Asia/Ho_Chi_Minh".to_string()
}

fn default_poll_interval_seconds() -> u64 {
    5
}

fn default_upsell_fallback_duration() -> i64 {
    60
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            slot_size_minutes: default_slot_size_minutes(),
            time_zone: default_time_zone(),
            poll_interval_seconds: default_poll_interval_seconds(),
            upsell_fallback_duration_minutes: default_upsell_fallback_duration(),
        }
    }
}

// --- Catalog Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CatalogConfig {
    /// Path to the JSON seed describing branches, rooms, beds and services.
    pub seed_path: String,
}

// --- Unified App Configuration ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    // Server config is mandatory
    pub server: ServerConfig,

    #[serde(default)]
    pub scheduling: SchedulingConfig,

    #[serde(default)]
    pub catalog: Option<CatalogConfig>,
}
