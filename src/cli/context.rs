use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::pubkey::Pubkey;
use tracing::info;

use crate::adapters::AdapterRegistry;
use crate::cli::args::InitCmd;
use crate::config::{CONFIG_TEMPLATE, GatewayConfig, GlobalConfig, load_operations};
use crate::engine::{GatewayBuilder, TransactionUnit};

pub const RPC_URL_ENV: &str = "VAULT_GATEWAY_RPC_URL";
pub const DEFAULT_TEMPLATE_NAME: &str = "vault-gateway.toml";

pub fn init_configs(args: &InitCmd) -> Result<()> {
    let target_path = match &args.output {
        Some(path) => path.clone(),
        None => env::current_dir()?.join(DEFAULT_TEMPLATE_NAME),
    };

    if target_path.exists() && !args.force {
        println!(
            "跳过 {}（文件已存在，如需覆盖请加 --force）",
            target_path.display()
        );
        return Ok(());
    }
    if let Some(parent) = target_path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(&target_path, CONFIG_TEMPLATE)?;
    println!("已写入 {}", target_path.display());
    Ok(())
}

pub fn resolve_rpc_client(global: &GlobalConfig) -> Result<Arc<RpcClient>> {
    let url = env::var(RPC_URL_ENV)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .or_else(|| global.primary_rpc_url().map(str::to_string))
        .ok_or_else(|| anyhow!("未配置 RPC：请设置 global.rpc_urls 或环境变量 {RPC_URL_ENV}"))?;
    Ok(Arc::new(RpcClient::new(url.trim().to_string())))
}

pub fn parse_payer(raw: &str) -> Result<Pubkey> {
    Pubkey::from_str(raw.trim()).map_err(|err| anyhow!("付款人公钥无效 {raw}: {err}"))
}

/// 读取操作列表，依次交给 builder 并 finalize。
pub async fn build_units(
    config: &GatewayConfig,
    payer: Pubkey,
    operations: &Path,
) -> Result<Vec<TransactionUnit>> {
    let registry = AdapterRegistry::from_config(&config.protocols);
    if registry.is_empty() {
        return Err(anyhow!(
            "未配置任何协议：请在 protocols.stake_vault 或 protocols.swap_router 中添加条目"
        ));
    }

    let file = load_operations(operations)?;
    let mut builder =
        GatewayBuilder::from_settings(Arc::new(registry), payer, config.limits, &config.builder);
    for entry in &file.operations {
        builder.append(entry.kind, entry.request()).await?;
    }
    builder.finalize()?;
    let units = builder.into_transactions()?;
    info!(
        target: "cli",
        operations = file.operations.len(),
        units = units.len(),
        payer = %payer,
        "操作列表已装箱"
    );
    Ok(units)
}
