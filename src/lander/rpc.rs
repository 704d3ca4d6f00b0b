use std::sync::Arc;

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::RpcSendTransactionConfig;
use tracing::info;

use crate::config::LanderSettings;
use crate::engine::{EngineIdentity, TransactionUnit};

use super::error::LanderError;
use super::stack::{LanderReceipt, UnitSubmitter, serialized_size, sign_unit};

/// 通过 RPC `sendTransaction` 提交；每个单元单独获取 blockhash。
#[derive(Clone)]
pub struct RpcSubmitter {
    client: Arc<RpcClient>,
    identity: EngineIdentity,
    config: RpcSendTransactionConfig,
}

impl RpcSubmitter {
    pub fn new(client: Arc<RpcClient>, identity: EngineIdentity, settings: &LanderSettings) -> Self {
        let config = RpcSendTransactionConfig {
            skip_preflight: settings.skip_preflight,
            max_retries: Some(0),
            min_context_slot: settings.min_context_slot,
            ..RpcSendTransactionConfig::default()
        };
        Self {
            client,
            identity,
            config,
        }
    }
}

#[async_trait]
impl UnitSubmitter for RpcSubmitter {
    fn name(&self) -> &'static str {
        "rpc"
    }

    async fn submit(
        &self,
        index: usize,
        unit: &TransactionUnit,
    ) -> Result<LanderReceipt, LanderError> {
        let blockhash = self.client.get_latest_blockhash().await?;
        let transaction = sign_unit(unit, self.identity.signer.as_ref(), blockhash)?;
        let serialized_bytes = serialized_size(&transaction)?;
        let signature = self
            .client
            .send_transaction_with_config(&transaction, self.config)
            .await?;
        info!(
            target: "lander::rpc",
            unit = index,
            signature = %signature,
            blockhash = %blockhash,
            endpoint = %self.client.url(),
            serialized_bytes,
            skip_preflight = self.config.skip_preflight,
            min_context_slot = ?self.config.min_context_slot,
            "transaction submitted via rpc client"
        );
        Ok(LanderReceipt {
            lander: "rpc",
            unit_index: index,
            signature,
            blockhash,
            serialized_bytes,
        })
    }
}
