// --- File: crates/mindmend_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

// --- Database Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String, // e.g. sqlite://data/mindmend.db, loaded via MINDMEND_DATABASE__URL
}

// --- Scheduling Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SchedulingConfig {
    /// Width of one bookable slot in minutes when the caller does not pass one.
    #[serde(default = "default_interval_minutes")]
    pub default_interval_minutes: i64,
    /// Session lengths (minutes) that may be requested.
    #[serde(default = "default_session_durations")]
    pub allowed_session_durations: Vec<i64>,
    /// Slots starting earlier than now + this many minutes are reported as too soon.
    #[serde(default)]
    pub booking_lead_minutes: Option<i64>,
    /// IANA zone used to read appointment dates and times in refund quotes.
    /// Slot times are UTC, so keep this at "UTC" unless clients send local times.
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            default_interval_minutes: default_interval_minutes(),
            allowed_session_durations: default_session_durations(),
            booking_lead_minutes: None,
            time_zone: default_time_zone(),
        }
    }
}

fn default_interval_minutes() -> i64 {
    30
}

fn default_session_durations() -> Vec<i64> {
    vec![30, 60, 90, 120]
}

fn default_time_zone() -> String {
    "UTC".to_string()
}

// --- Refund Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RefundTierConfig {
    /// Minimum notice, in hours, for this tier to apply.
    pub min_hours_before: i64,
    /// Share of the original amount refunded, 0-100.
    pub percentage: u8,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct RefundConfig {
    /// Overrides the built-in 48h/24h ladder when non-empty.
    #[serde(default)]
    pub tiers: Vec<RefundTierConfig>,
}

// --- Unified App Configuration ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    #[serde(default)]
    pub scheduling: SchedulingConfig,
    #[serde(default)]
    pub refund: RefundConfig,
}
