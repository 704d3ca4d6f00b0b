use std::time::Duration;

use metrics::{counter, histogram};
use tracing::{debug, info, warn};

use crate::engine::{GatewayError, OperationDescriptor, TransactionLimits, TransactionUnit};
use crate::lander::{LanderError, LanderReceipt};

use super::metrics::prometheus_enabled;

pub fn operation_appended(index: usize, descriptor: &OperationDescriptor, fragments: usize) {
    info!(
        target: "monitoring::builder",
        event = "append",
        operation = index,
        protocol = %descriptor.protocol(),
        kind = %descriptor.kind(),
        target_account = %descriptor.target(),
        amount = descriptor.amount(),
        direction = ?descriptor.direction(),
        fragments,
        "operation appended"
    );

    if prometheus_enabled() {
        let protocol = descriptor.protocol().to_string();
        let kind = descriptor.kind().to_string();
        counter!(
            "vault_gateway_operations_total",
            "protocol" => protocol.clone(),
            "kind" => kind,
            "result" => "appended"
        )
        .increment(1);
        histogram!("vault_gateway_operation_fragments", "protocol" => protocol)
            .record(fragments as f64);
    }
}

pub fn operation_rejected(descriptor: &OperationDescriptor, err: &GatewayError) {
    warn!(
        target: "monitoring::builder",
        event = "reject",
        protocol = %descriptor.protocol(),
        kind = %descriptor.kind(),
        target_account = %descriptor.target(),
        amount = descriptor.amount(),
        error = %err,
        "operation rejected"
    );

    if prometheus_enabled() {
        counter!(
            "vault_gateway_operations_total",
            "protocol" => descriptor.protocol().to_string(),
            "kind" => descriptor.kind().to_string(),
            "result" => "rejected"
        )
        .increment(1);
    }
}

pub fn partition_rejected(
    operation: usize,
    bytes: usize,
    accounts: usize,
    limits: &TransactionLimits,
) {
    warn!(
        target: "monitoring::partition",
        event = "oversized",
        operation,
        bytes,
        accounts,
        max_bytes = limits.max_transaction_bytes,
        max_accounts = limits.max_accounts,
        "operation exceeds transaction ceiling"
    );

    if prometheus_enabled() {
        counter!("vault_gateway_partition_rejected_total").increment(1);
    }
}

pub fn partition_unit_sealed(unit: &TransactionUnit) {
    debug!(
        target: "monitoring::partition",
        event = "seal",
        operations = ?unit.operations(),
        fragments = unit.fragments().len(),
        accounts = unit.account_count(),
        estimated_bytes = unit.estimated_bytes(),
        "transaction unit sealed"
    );

    if prometheus_enabled() {
        histogram!("vault_gateway_unit_bytes").record(unit.estimated_bytes() as f64);
        histogram!("vault_gateway_unit_accounts").record(unit.account_count() as f64);
    }
}

pub fn partition_completed(
    operations: usize,
    units: &[TransactionUnit],
    limits: &TransactionLimits,
) {
    let max_bytes = units
        .iter()
        .map(TransactionUnit::estimated_bytes)
        .max()
        .unwrap_or_default();
    debug!(
        target: "monitoring::partition",
        event = "complete",
        operations,
        units = units.len(),
        max_bytes,
        limit_bytes = limits.max_transaction_bytes,
        limit_accounts = limits.max_accounts,
        "partition finished"
    );
}

pub fn session_finalized(operations: usize, units: usize, elapsed: Duration) {
    info!(
        target: "monitoring::builder",
        event = "finalize",
        operations,
        units,
        elapsed_us = elapsed.as_micros() as u64,
        "session finalized"
    );

    if prometheus_enabled() {
        counter!("vault_gateway_finalize_total").increment(1);
        histogram!("vault_gateway_units_per_session").record(units as f64);
        histogram!("vault_gateway_finalize_latency_ms").record(elapsed.as_secs_f64() * 1_000.0);
    }
}

pub fn unit_submitted(receipt: &LanderReceipt) {
    info!(
        target: "monitoring::lander",
        event = "success",
        lander = receipt.lander,
        unit = receipt.unit_index,
        signature = %receipt.signature,
        blockhash = %receipt.blockhash,
        serialized_bytes = receipt.serialized_bytes,
        "unit submission succeeded"
    );

    if prometheus_enabled() {
        counter!(
            "vault_gateway_lander_submit_total",
            "lander" => receipt.lander,
            "result" => "success"
        )
        .increment(1);
    }
}

pub fn unit_submission_failed(lander: &'static str, index: usize, err: &LanderError) {
    warn!(
        target: "monitoring::lander",
        event = "failure",
        lander,
        unit = index,
        error = %err,
        "unit submission failed"
    );

    if prometheus_enabled() {
        counter!(
            "vault_gateway_lander_submit_total",
            "lander" => lander,
            "result" => "failure"
        )
        .increment(1);
    }
}
