use async_trait::async_trait;
use solana_sdk::hash::Hash;
use solana_sdk::message::VersionedMessage;
use solana_sdk::signature::{Keypair, Signature};
use solana_sdk::transaction::VersionedTransaction;
use tracing::info;

use crate::engine::TransactionUnit;
use crate::monitoring::events;

use super::error::{LanderError, SubmissionFailure};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanderReceipt {
    pub lander: &'static str,
    pub unit_index: usize,
    pub signature: Signature,
    pub blockhash: Hash,
    pub serialized_bytes: usize,
}

/// 网络侧协作者：一次接收一个交易单元，补齐 blockhash 并签名提交。
#[async_trait]
pub trait UnitSubmitter: Send + Sync {
    fn name(&self) -> &'static str;

    async fn submit(
        &self,
        index: usize,
        unit: &TransactionUnit,
    ) -> Result<LanderReceipt, LanderError>;
}

/// 编译 v0 消息并用付款人签名。
pub fn sign_unit(
    unit: &TransactionUnit,
    signer: &Keypair,
    blockhash: Hash,
) -> Result<VersionedTransaction, LanderError> {
    use solana_sdk::signature::Signer;

    if signer.pubkey() != *unit.payer() {
        return Err(LanderError::fatal(format!(
            "签名者 {} 与交易付款人 {} 不一致",
            signer.pubkey(),
            unit.payer()
        )));
    }
    let message = unit.compile(blockhash)?;
    VersionedTransaction::try_new(VersionedMessage::V0(message), &[signer])
        .map_err(|err| LanderError::fatal(format!("交易签名失败: {err}")))
}

pub fn serialized_size(transaction: &VersionedTransaction) -> Result<usize, LanderError> {
    let bytes = bincode::serde::encode_to_vec(transaction, bincode::config::legacy())?;
    Ok(bytes.len())
}

/// 严格按顺序提交，遇到第一个失败即停止，后续单元不再发送。
pub async fn submit_all<S>(
    submitter: &S,
    units: &[TransactionUnit],
) -> Result<Vec<LanderReceipt>, SubmissionFailure>
where
    S: UnitSubmitter + ?Sized,
{
    let mut receipts = Vec::with_capacity(units.len());
    for (index, unit) in units.iter().enumerate() {
        match submitter.submit(index, unit).await {
            Ok(receipt) => {
                events::unit_submitted(&receipt);
                receipts.push(receipt);
            }
            Err(source) => {
                events::unit_submission_failed(submitter.name(), index, &source);
                return Err(SubmissionFailure {
                    index,
                    receipts,
                    source,
                });
            }
        }
    }
    info!(
        target: "lander::stack",
        lander = submitter.name(),
        units = receipts.len(),
        "全部交易单元提交完成"
    );
    Ok(receipts)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use solana_sdk::pubkey::Pubkey;

    use super::*;

    /// 记录调用顺序，并在指定序号上失败。
    struct ScriptedSubmitter {
        fail_at: Option<usize>,
        seen: Mutex<Vec<usize>>,
    }

    #[async_trait]
    impl UnitSubmitter for ScriptedSubmitter {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn submit(
            &self,
            index: usize,
            _unit: &TransactionUnit,
        ) -> Result<LanderReceipt, LanderError> {
            if let Ok(mut seen) = self.seen.lock() {
                seen.push(index);
            }
            if self.fail_at == Some(index) {
                return Err(LanderError::fatal("模拟失败"));
            }
            Ok(LanderReceipt {
                lander: "scripted",
                unit_index: index,
                signature: Signature::default(),
                blockhash: Hash::default(),
                serialized_bytes: 0,
            })
        }
    }

    fn units(count: usize) -> Vec<TransactionUnit> {
        let payer = Pubkey::new_unique();
        (0..count)
            .map(|index| {
                TransactionUnit::new(
                    payer,
                    Vec::new(),
                    Vec::new(),
                    vec![index],
                    Default::default(),
                    0,
                )
            })
            .collect()
    }

    #[tokio::test(flavor = "current_thread")]
    async fn submits_every_unit_in_order() {
        let submitter = ScriptedSubmitter {
            fail_at: None,
            seen: Mutex::new(Vec::new()),
        };
        let receipts = submit_all(&submitter, &units(3)).await.expect("all landed");
        assert_eq!(
            receipts.iter().map(|r| r.unit_index).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert_eq!(*submitter.seen.lock().expect("lock"), vec![0, 1, 2]);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn stops_at_first_failure() {
        let submitter = ScriptedSubmitter {
            fail_at: Some(1),
            seen: Mutex::new(Vec::new()),
        };
        let failure = submit_all(&submitter, &units(3))
            .await
            .expect_err("second unit fails");
        assert_eq!(failure.index, 1);
        assert_eq!(failure.receipts.len(), 1);
        assert!(matches!(failure.source, LanderError::Fatal(_)));
        assert_eq!(*submitter.seen.lock().expect("lock"), vec![0, 1]);
    }
}
