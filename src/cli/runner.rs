use anyhow::{Result, anyhow};
use tracing::{info, warn};

use crate::cli::args::{Cli, Command, PlanCmd, SubmitCmd};
use crate::cli::context::{build_units, parse_payer, resolve_rpc_client};
use crate::cli::plan::{ReceiptSummary, summarize};
use crate::config::GatewayConfig;
use crate::engine::EngineIdentity;
use crate::lander::{DryRunSubmitter, RpcSubmitter, UnitSubmitter, submit_all};

pub async fn run(cli: Cli, config: GatewayConfig) -> Result<()> {
    crate::monitoring::init_from_config(&config.monitoring.prometheus)
        .map_err(|err| anyhow!(err))?;

    match cli.command {
        Command::Plan(args) => plan(args, &config).await,
        Command::Submit(args) => submit(args, &config).await,
        Command::Init(_) => Err(anyhow!("init 命令不需要加载配置")),
    }
}

async fn plan(args: PlanCmd, config: &GatewayConfig) -> Result<()> {
    let payer = match args.payer.as_deref() {
        Some(raw) => parse_payer(raw)?,
        None => EngineIdentity::from_wallet(&config.global.wallet)?.pubkey,
    };
    let units = build_units(config, payer, &args.operations).await?;
    println!("{}", serde_json::to_string_pretty(&summarize(&units))?);
    Ok(())
}

async fn submit(args: SubmitCmd, config: &GatewayConfig) -> Result<()> {
    let identity = EngineIdentity::from_wallet(&config.global.wallet)?;
    let units = build_units(config, identity.pubkey, &args.operations).await?;

    let dry_run = args.dry_run || config.lander.dry_run;
    let submitter: Box<dyn UnitSubmitter> = if dry_run {
        info!(target: "cli", units = units.len(), "dry-run 模式：仅签名，不发送");
        Box::new(DryRunSubmitter::new(identity))
    } else {
        let client = resolve_rpc_client(&config.global)?;
        Box::new(RpcSubmitter::new(client, identity, &config.lander))
    };

    match submit_all(submitter.as_ref(), &units).await {
        Ok(receipts) => {
            let summaries: Vec<_> = receipts.iter().map(ReceiptSummary::from).collect();
            println!("{}", serde_json::to_string_pretty(&summaries)?);
            Ok(())
        }
        Err(failure) => {
            let landed: Vec<_> = failure.receipts.iter().map(ReceiptSummary::from).collect();
            if !landed.is_empty() {
                println!("{}", serde_json::to_string_pretty(&landed)?);
            }
            warn!(
                target: "cli",
                failed_unit = failure.index,
                landed = landed.len(),
                remaining = units.len() - failure.index,
                "提交中断，后续交易未发送"
            );
            Err(failure.into())
        }
    }
}
