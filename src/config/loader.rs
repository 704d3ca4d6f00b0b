use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::GatewayConfig;

pub const DEFAULT_CONFIG_PATHS: &[&str] = &["vault-gateway.toml", "config/vault-gateway.toml"];

pub const CONFIG_TEMPLATE: &str = r#"[global]
rpc_urls = ["https://api.mainnet-beta.solana.com"]

[global.wallet]
# JSON 字节数组、逗号分隔字节或 base58；也可使用环境变量 VAULT_GATEWAY_PRIVATE_KEY
private_key = ""

[global.logging]
level = "info"
json = false

[limits]
max_transaction_bytes = 1232
max_accounts = 64

[builder]
memo = ""
compute_unit_limit = 400000
compute_unit_price_micro_lamports = 0

[monitoring.prometheus]
enable = false
listen = "0.0.0.0:9898"

[lander]
dry_run = true
skip_preflight = false

# [[protocols.stake_vault.vaults]]
# vault = ""
# program_id = ""
# authority = ""
# reserve = ""
# share_mint = ""
# deposit_mint = "So11111111111111111111111111111111111111112"

# [[protocols.swap_router.pools]]
# pool = ""
# program_id = ""
# authority = ""
# mint_a = ""
# mint_b = ""
# vault_a = ""
# vault_b = ""
"#;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

pub fn load_config(path: Option<PathBuf>) -> Result<GatewayConfig, ConfigError> {
    let candidate_paths = match path {
        Some(p) => vec![p],
        None => DEFAULT_CONFIG_PATHS
            .iter()
            .map(PathBuf::from)
            .collect::<Vec<PathBuf>>(),
    };

    for candidate in candidate_paths {
        if let Some(config) = try_load_file(&candidate)? {
            return Ok(config);
        }
    }

    Ok(GatewayConfig::default())
}

fn try_load_file(path: &Path) -> Result<Option<GatewayConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let config: GatewayConfig = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(Some(config))
}
