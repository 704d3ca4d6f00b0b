use std::collections::HashSet;

use serde::Deserialize;
use serde::de::Deserializer;
use solana_sdk::pubkey::Pubkey;

pub mod loader;
pub mod operations;
pub mod types;

pub use loader::*;
pub use operations::{OperationEntry, OperationsFile, load_operations};
pub use types::*;

use self::types as cfg;

pub(crate) fn default_logging_level() -> String {
    "info".to_string()
}

pub(crate) fn default_prometheus_listen() -> String {
    "0.0.0.0:9898".to_string()
}

pub(crate) fn default_token_program() -> Pubkey {
    spl_token::ID
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RpcUrlField {
    Single(String),
    Multiple(Vec<String>),
}

pub(crate) fn deserialize_rpc_urls<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let helper = Option::<RpcUrlField>::deserialize(deserializer)?;
    let mut seen = HashSet::new();
    let mut urls = Vec::new();

    let values = match helper {
        Some(RpcUrlField::Single(url)) => vec![url],
        Some(RpcUrlField::Multiple(list)) => list,
        None => Vec::new(),
    };

    for value in values {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            continue;
        }
        if seen.insert(trimmed.to_string()) {
            urls.push(trimmed.to_string());
        }
    }

    Ok(urls)
}

impl Default for cfg::GatewayConfig {
    fn default() -> Self {
        Self {
            global: cfg::GlobalConfig::default(),
            limits: Default::default(),
            builder: cfg::BuilderSettings::default(),
            monitoring: cfg::MonitoringConfig::default(),
            lander: cfg::LanderSettings::default(),
            protocols: cfg::ProtocolsConfig::default(),
        }
    }
}

impl Default for cfg::GlobalConfig {
    fn default() -> Self {
        Self {
            rpc_urls: Vec::new(),
            wallet: cfg::WalletConfig::default(),
            logging: cfg::LoggingConfig::default(),
        }
    }
}

impl Default for cfg::LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_logging_level(),
            json: false,
        }
    }
}

impl Default for cfg::PrometheusConfig {
    fn default() -> Self {
        Self {
            enable: false,
            listen: default_prometheus_listen(),
        }
    }
}
