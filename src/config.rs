use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::address::is_valid_address;
use crate::rpc::Commitment;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Cluster selection; decides the default RPC endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Network {
    #[default]
    #[serde(rename = "mainnet-beta")]
    MainnetBeta,
    #[serde(rename = "testnet")]
    Testnet,
    #[serde(rename = "devnet")]
    Devnet,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::MainnetBeta => "mainnet-beta",
            Network::Testnet => "testnet",
            Network::Devnet => "devnet",
        }
    }

    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Network::MainnetBeta => "https://api.mainnet-beta.solana.com",
            Network::Testnet => "https://api.testnet.solana.com",
            Network::Devnet => "https://api.devnet.solana.com",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet-beta" | "mainnet" => Ok(Network::MainnetBeta),
            "testnet" => Ok(Network::Testnet),
            "devnet" => Ok(Network::Devnet),
            _ => Err(ConfigError::InvalidValue {
                key: "network",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    #[serde(default = "default_environment")]
    pub environment: String,
    #[serde(default = "default_version")]
    pub version: String,
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub network: Network,
    /// Replaces the network's default endpoint when set
    #[serde(default)]
    pub rpc_endpoint_override: Option<String>,
    /// Pre-fills the recipient field of the transfer form
    #[serde(default)]
    pub default_recipient: Option<String>,
    #[serde(default = "default_rpc_timeout_ms")]
    pub rpc_timeout_ms: u64,
    #[serde(default)]
    pub transfer: TransferSettings,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

/// Transfer workflow tuning.
///
/// The confirmation level is not configurable: transfers always wait for
/// [`CONFIRMATION_LEVEL`]. Unknown keys are rejected so a stale
/// `commitment:` entry fails at load instead of being ignored.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct TransferSettings {
    /// Give up waiting for confirmation after this long
    pub confirmation_timeout_ms: u64,
    /// Delay between signature status polls
    pub poll_interval_ms: u64,
}

/// Commitment every transfer is confirmed at
pub const CONFIRMATION_LEVEL: Commitment = Commitment::Confirmed;

impl Default for TransferSettings {
    fn default() -> Self {
        Self {
            confirmation_timeout_ms: 60_000,
            poll_interval_ms: 500,
        }
    }
}

impl TransferSettings {
    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_millis(self.confirmation_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_version() -> String {
    "1.0.0".to_string()
}

fn default_rpc_timeout_ms() -> u64 {
    30_000
}

impl AppConfig {
    /// Load `config/<env>.yaml`, then apply environment overrides
    pub fn load(env: &str) -> Result<Self, ConfigError> {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path).map_err(|source| ConfigError::Io {
            path: config_path.clone(),
            source,
        })?;
        let mut config = Self::from_yaml_str(&content)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply `SOLANA_NETWORK`, `SOLANA_RPC_URL`, `RECIPIENT_WALLET`,
    /// `APP_VERSION` and `APP_ENV`. Unset or empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(network) = get("SOLANA_NETWORK") {
            self.network = network.parse()?;
        }
        if let Some(url) = get("SOLANA_RPC_URL") {
            self.rpc_endpoint_override = Some(url);
        }
        if let Some(recipient) = get("RECIPIENT_WALLET") {
            self.default_recipient = Some(recipient);
        }
        if let Some(version) = get("APP_VERSION") {
            self.version = version;
        }
        if let Some(environment) = get("APP_ENV") {
            self.environment = environment;
        }
        Ok(())
    }

    /// Override if present, else the network default
    pub fn rpc_endpoint(&self) -> &str {
        self.rpc_endpoint_override
            .as_deref()
            .unwrap_or_else(|| self.network.default_endpoint())
    }

    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_millis(self.rpc_timeout_ms)
    }

    /// `false` when a recipient pre-fill is configured but malformed
    pub fn default_recipient_is_valid(&self) -> bool {
        self.default_recipient
            .as_deref()
            .is_none_or(is_valid_address)
    }
}
