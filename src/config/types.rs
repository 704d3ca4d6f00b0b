use serde::Deserialize;
use serde_with::{DisplayFromStr, serde_as};
use solana_sdk::pubkey::Pubkey;

use crate::engine::TransactionLimits;

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    #[serde(default)]
    pub global: GlobalConfig,
    #[serde(default)]
    pub limits: TransactionLimits,
    #[serde(default)]
    pub builder: BuilderSettings,
    #[serde(default)]
    pub monitoring: MonitoringConfig,
    #[serde(default)]
    pub lander: LanderSettings,
    #[serde(default)]
    pub protocols: ProtocolsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GlobalConfig {
    #[serde(default, deserialize_with = "super::deserialize_rpc_urls")]
    pub rpc_urls: Vec<String>,
    #[serde(default)]
    pub wallet: WalletConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl GlobalConfig {
    pub fn primary_rpc_url(&self) -> Option<&str> {
        self.rpc_urls.first().map(|s| s.as_str())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WalletConfig {
    #[serde(default)]
    pub private_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "super::default_logging_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

/// 每笔交易共用的外层指令配置。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuilderSettings {
    #[serde(default)]
    pub memo: String,
    #[serde(default)]
    pub compute_unit_limit: u32,
    #[serde(default)]
    pub compute_unit_price_micro_lamports: u64,
}

impl BuilderSettings {
    pub fn memo(&self) -> Option<&str> {
        let trimmed = self.memo.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MonitoringConfig {
    #[serde(default)]
    pub prometheus: PrometheusConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PrometheusConfig {
    #[serde(default)]
    pub enable: bool,
    #[serde(default = "super::default_prometheus_listen")]
    pub listen: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LanderSettings {
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default)]
    pub skip_preflight: bool,
    #[serde(default)]
    pub min_context_slot: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProtocolsConfig {
    #[serde(default)]
    pub stake_vault: StakeVaultConfig,
    #[serde(default)]
    pub swap_router: SwapRouterConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StakeVaultConfig {
    #[serde(default)]
    pub vaults: Vec<StakeVaultMarketConfig>,
}

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub struct StakeVaultMarketConfig {
    #[serde_as(as = "DisplayFromStr")]
    pub vault: Pubkey,
    #[serde_as(as = "DisplayFromStr")]
    pub program_id: Pubkey,
    #[serde_as(as = "DisplayFromStr")]
    pub authority: Pubkey,
    #[serde_as(as = "DisplayFromStr")]
    pub reserve: Pubkey,
    #[serde_as(as = "DisplayFromStr")]
    pub share_mint: Pubkey,
    #[serde_as(as = "DisplayFromStr")]
    pub deposit_mint: Pubkey,
    #[serde_as(as = "DisplayFromStr")]
    #[serde(default = "super::default_token_program")]
    pub token_program: Pubkey,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SwapRouterConfig {
    #[serde(default)]
    pub pools: Vec<SwapPoolConfig>,
}

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub struct SwapPoolConfig {
    #[serde_as(as = "DisplayFromStr")]
    pub pool: Pubkey,
    #[serde_as(as = "DisplayFromStr")]
    pub program_id: Pubkey,
    #[serde_as(as = "DisplayFromStr")]
    pub authority: Pubkey,
    #[serde_as(as = "DisplayFromStr")]
    pub mint_a: Pubkey,
    #[serde_as(as = "DisplayFromStr")]
    pub mint_b: Pubkey,
    #[serde_as(as = "DisplayFromStr")]
    pub vault_a: Pubkey,
    #[serde_as(as = "DisplayFromStr")]
    pub vault_b: Pubkey,
    #[serde_as(as = "DisplayFromStr")]
    #[serde(default = "super::default_token_program")]
    pub token_program_a: Pubkey,
    #[serde_as(as = "DisplayFromStr")]
    #[serde(default = "super::default_token_program")]
    pub token_program_b: Pubkey,
}
