use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginConfig {
    pub backend: BackendSettings,
    pub oracle: OracleSettings,
    pub account: AccountSettings,
    pub tracking: TrackingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendSettings {
    /// Base URL of the recommendation backend.
    pub api_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleSettings {
    /// Base URL of the real-time prices API.
    pub base_url: String,
    /// Identification header required for respectful API usage.
    pub user_agent: String,
    pub cache_ttl_secs: u64,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountSettings {
    pub email: String,
    pub password: String,
    pub runescape_username: String,
    pub auto_login: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingSettings {
    /// Automatically detect and track Grand Exchange orders.
    pub auto_track: bool,
    /// Check real-time prices before tracking a trade.
    pub validate_prices: bool,
    pub show_notifications: bool,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            backend: BackendSettings {
                api_url: "http://localhost:8000".to_string(),
                timeout_secs: 30,
            },
            oracle: OracleSettings {
                base_url: "https://prices.runescape.wiki/api/v1/osrs".to_string(),
                user_agent: "ge-arb-tracker/0.1".to_string(),
                cache_ttl_secs: 30,
                timeout_secs: 10,
            },
            account: AccountSettings {
                email: String::new(),
                password: String::new(),
                runescape_username: String::new(),
                auto_login: true,
            },
            tracking: TrackingSettings {
                auto_track: true,
                validate_prices: true,
                show_notifications: true,
            },
        }
    }
}
