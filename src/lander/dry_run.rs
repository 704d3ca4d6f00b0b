use async_trait::async_trait;
use solana_sdk::hash::Hash;
use tracing::info;

use crate::engine::{EngineIdentity, TransactionUnit};

use super::error::LanderError;
use super::stack::{LanderReceipt, UnitSubmitter, serialized_size, sign_unit};

/// 只编译并签名，不访问网络。用于检查真实序列化大小。
#[derive(Clone)]
pub struct DryRunSubmitter {
    identity: EngineIdentity,
    blockhash: Hash,
}

impl DryRunSubmitter {
    pub fn new(identity: EngineIdentity) -> Self {
        Self {
            identity,
            blockhash: Hash::default(),
        }
    }

    pub fn with_blockhash(mut self, blockhash: Hash) -> Self {
        self.blockhash = blockhash;
        self
    }
}

#[async_trait]
impl UnitSubmitter for DryRunSubmitter {
    fn name(&self) -> &'static str {
        "dry_run"
    }

    async fn submit(
        &self,
        index: usize,
        unit: &TransactionUnit,
    ) -> Result<LanderReceipt, LanderError> {
        let transaction = sign_unit(unit, self.identity.signer.as_ref(), self.blockhash)?;
        let serialized_bytes = serialized_size(&transaction)?;
        let signature = transaction
            .signatures
            .first()
            .copied()
            .ok_or_else(|| LanderError::fatal("签名后的交易缺少签名"))?;
        info!(
            target: "lander::dry_run",
            unit = index,
            signature = %signature,
            serialized_bytes,
            estimated_bytes = unit.estimated_bytes(),
            instructions = unit.instructions().len(),
            accounts = unit.account_count(),
            "dry-run: 交易已签名，未发送"
        );
        Ok(LanderReceipt {
            lander: "dry_run",
            unit_index: index,
            signature,
            blockhash: self.blockhash,
            serialized_bytes,
        })
    }
}
