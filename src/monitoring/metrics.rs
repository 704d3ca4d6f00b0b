use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use once_cell::sync::OnceCell;
use tracing::info;

use crate::config::PrometheusConfig;

static EXPORTER: OnceCell<SocketAddr> = OnceCell::new();
static PROMETHEUS_ENABLED: AtomicBool = AtomicBool::new(false);

/// 按配置启用 Prometheus 导出；未开启时所有事件只写日志。
pub fn init_from_config(config: &PrometheusConfig) -> Result<()> {
    if !config.enable {
        return Ok(());
    }
    try_init_prometheus(&config.listen)
}

pub fn try_init_prometheus(listen: &str) -> Result<()> {
    let addr = EXPORTER.get_or_try_init(|| -> Result<SocketAddr> {
        let addr: SocketAddr = listen
            .parse()
            .with_context(|| format!("invalid prometheus listen address: {listen}"))?;
        PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()
            .context("failed to install prometheus exporter")?;
        describe();
        PROMETHEUS_ENABLED.store(true, Ordering::Relaxed);
        Ok(addr)
    })?;
    info!(target: "monitoring::metrics", listen = %addr, "prometheus exporter ready");
    Ok(())
}

pub fn prometheus_enabled() -> bool {
    PROMETHEUS_ENABLED.load(Ordering::Relaxed)
}

fn describe() {
    describe_counter!(
        "vault_gateway_operations_total",
        "operations passed to the builder, by protocol/kind/result"
    );
    describe_histogram!(
        "vault_gateway_operation_fragments",
        "instruction fragments produced per operation"
    );
    describe_counter!(
        "vault_gateway_partition_rejected_total",
        "operations that cannot fit a single transaction"
    );
    describe_histogram!("vault_gateway_unit_bytes", "estimated serialized unit size");
    describe_histogram!("vault_gateway_unit_accounts", "distinct accounts per unit");
    describe_counter!("vault_gateway_finalize_total", "successful finalize calls");
    describe_histogram!("vault_gateway_units_per_session", "units produced per finalize");
    describe_histogram!("vault_gateway_finalize_latency_ms", "finalize latency");
    describe_counter!(
        "vault_gateway_lander_submit_total",
        "unit submissions, by lander/result"
    );
}
