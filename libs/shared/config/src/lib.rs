use std::env;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_STATUS_POLL_INTERVAL_MS: u64 = 2000;

/// How queue tokens are numbered when a patient books.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPolicy {
    /// Active (non-completed) appointments for the clinic plus one.
    /// A token can repeat once an earlier holder has completed.
    #[default]
    ActiveCount,
    /// Highest token ever issued for the clinic plus one. Never reused.
    Monotonic,
}

impl FromStr for TokenPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "active_count" | "active-count" => Ok(TokenPolicy::ActiveCount),
            "monotonic" => Ok(TokenPolicy::Monotonic),
            other => Err(format!("unknown token policy '{}'", other)),
        }
    }
}

impl fmt::Display for TokenPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenPolicy::ActiveCount => write!(f, "active_count"),
            TokenPolicy::Monotonic => write!(f, "monotonic"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: Option<String>,
    pub bind_addr: String,
    pub status_poll_interval_ms: u64,
    pub token_policy: TokenPolicy,
    pub seed_demo_clinic: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            status_poll_interval_ms: DEFAULT_STATUS_POLL_INTERVAL_MS,
            token_policy: TokenPolicy::default(),
            seed_demo_clinic: true,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let config = Self {
            data_dir: env::var("OPD_DATA_DIR")
                .ok()
                .filter(|dir| !dir.trim().is_empty())
                .or_else(|| {
                    warn!("OPD_DATA_DIR not set, records will be kept in memory only");
                    None
                }),
            bind_addr: env::var("OPD_BIND_ADDR")
                .unwrap_or_else(|_| {
                    warn!("OPD_BIND_ADDR not set, using default");
                    defaults.bind_addr.clone()
                }),
            status_poll_interval_ms: parse_var(
                "OPD_STATUS_POLL_INTERVAL_MS",
                defaults.status_poll_interval_ms,
            ),
            token_policy: parse_var("OPD_TOKEN_POLICY", defaults.token_policy),
            seed_demo_clinic: parse_var("OPD_SEED_DEMO_CLINIC", defaults.seed_demo_clinic),
        };

        if config.status_poll_interval_ms == 0 {
            warn!("OPD_STATUS_POLL_INTERVAL_MS must be positive, using default");
            return Self {
                status_poll_interval_ms: DEFAULT_STATUS_POLL_INTERVAL_MS,
                ..config
            };
        }

        config
    }

    pub fn is_persistent(&self) -> bool {
        self.data_dir.is_some()
    }
}

fn parse_var<T>(name: &str, default: T) -> T
where
    T: FromStr + fmt::Display,
    T::Err: fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw.parse().unwrap_or_else(|e| {
            warn!("{} has invalid value '{}' ({}), using default {}", name, raw, e, default);
            default
        }),
        Err(_) => {
            warn!("{} not set, using default {}", name, default);
            default
        }
    }
}
