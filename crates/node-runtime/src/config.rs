//! # Node Configuration
//!
//! Defaults overridden from `CN_*` environment variables.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `CN_RPC_URL` | `http://127.0.0.1:8545` |
//! | `CN_WS_URL` | `ws://127.0.0.1:8546` |
//! | `CN_BLOCKCHAIN_ID` | `1` |
//! | `CN_CONTRACT_ADDRESS` | none, comma-separated, required |
//! | `CN_START_BLOCK` | `0` (live only when nothing is recorded) |
//! | `CN_BLOCK_STEP` | `10000` |
//! | `CN_MAX_BACKOFF_RETRIES` | `10` |
//! | `CN_LOG_JSON` | `false` |

use alloy_primitives::Address;
use cn_03_event_ingestion::domain::config::{DEFAULT_BLOCK_STEP, DEFAULT_MAX_BACKOFF_RETRIES};
use cn_03_event_ingestion::ListenerConfig;
use shared_types::BlockchainId;
use std::str::FromStr;
use thiserror::Error;

/// Complete node configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeConfig {
    /// HTTP JSON-RPC endpoint for head and range queries.
    pub rpc_url: String,
    /// WebSocket endpoint for log subscriptions.
    pub ws_url: String,
    /// Chain the contracts live on.
    pub blockchain_id: BlockchainId,
    /// Settlement contracts, one listener each.
    pub contract_addresses: Vec<Address>,
    /// Backfill seed when no event has been recorded yet.
    pub start_block: u64,
    /// Blocks per historical range query.
    pub block_step: u64,
    /// Consecutive chain failures tolerated per listener.
    pub max_backoff_retries: u32,
    /// Emit JSON log lines.
    pub log_json: bool,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://127.0.0.1:8545".to_string(),
            ws_url: "ws://127.0.0.1:8546".to_string(),
            blockchain_id: 1,
            contract_addresses: Vec::new(),
            start_block: 0,
            block_step: DEFAULT_BLOCK_STEP,
            max_backoff_retries: DEFAULT_MAX_BACKOFF_RETRIES,
            log_json: false,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// An environment variable could not be parsed.
    #[error("Invalid value {value:?} for {var}: {reason}")]
    InvalidValue {
        /// Variable name.
        var: &'static str,
        /// Raw value.
        value: String,
        /// Parser message.
        reason: String,
    },

    /// No contract to listen to.
    #[error("No contract address configured. Set CN_CONTRACT_ADDRESS.")]
    NoContracts,

    /// Endpoint has the wrong scheme.
    #[error("{var} must start with {expected}, got {value:?}")]
    BadEndpoint {
        /// Variable name.
        var: &'static str,
        /// Accepted scheme prefixes.
        expected: &'static str,
        /// Configured value.
        value: String,
    },

    /// A numeric setting is out of range.
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

impl NodeConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("CN_RPC_URL") {
            config.rpc_url = url;
        }
        if let Some(url) = lookup("CN_WS_URL") {
            config.ws_url = url;
        }
        if let Some(raw) = lookup("CN_BLOCKCHAIN_ID") {
            config.blockchain_id = parse("CN_BLOCKCHAIN_ID", &raw)?;
        }
        if let Some(raw) = lookup("CN_CONTRACT_ADDRESS") {
            config.contract_addresses = raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| parse("CN_CONTRACT_ADDRESS", s))
                .collect::<Result<_, _>>()?;
        }
        if let Some(raw) = lookup("CN_START_BLOCK") {
            config.start_block = parse("CN_START_BLOCK", &raw)?;
        }
        if let Some(raw) = lookup("CN_BLOCK_STEP") {
            config.block_step = parse("CN_BLOCK_STEP", &raw)?;
        }
        if let Some(raw) = lookup("CN_MAX_BACKOFF_RETRIES") {
            config.max_backoff_retries = parse("CN_MAX_BACKOFF_RETRIES", &raw)?;
        }
        if let Some(raw) = lookup("CN_LOG_JSON") {
            config.log_json = parse_flag("CN_LOG_JSON", &raw)?;
        }

        Ok(config)
    }

    /// Reject configurations the runtime cannot start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.rpc_url.starts_with("http://") || self.rpc_url.starts_with("https://")) {
            return Err(ConfigError::BadEndpoint {
                var: "CN_RPC_URL",
                expected: "http:// or https://",
                value: self.rpc_url.clone(),
            });
        }
        if !(self.ws_url.starts_with("ws://") || self.ws_url.starts_with("wss://")) {
            return Err(ConfigError::BadEndpoint {
                var: "CN_WS_URL",
                expected: "ws:// or wss://",
                value: self.ws_url.clone(),
            });
        }
        if self.contract_addresses.is_empty() {
            return Err(ConfigError::NoContracts);
        }
        if self.blockchain_id == 0 {
            return Err(ConfigError::Zero("CN_BLOCKCHAIN_ID"));
        }
        if self.block_step == 0 {
            return Err(ConfigError::Zero("CN_BLOCK_STEP"));
        }
        Ok(())
    }

    /// One listener configuration per contract.
    pub fn listener_configs(&self) -> Vec<ListenerConfig> {
        self.contract_addresses
            .iter()
            .map(|contract| ListenerConfig {
                blockchain_id: self.blockchain_id,
                contract_address: *contract,
                start_block: self.start_block,
                block_step: self.block_step,
                max_backoff_retries: self.max_backoff_retries,
                ..Default::default()
            })
            .collect()
    }
}

fn parse<T>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        var,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

fn parse_flag(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            var,
            value: raw.to_string(),
            reason: "expected a boolean".to_string(),
        }),
    }
}
