use serde::Deserialize;
use solana_sdk::pubkey::Pubkey;
use tracing::debug;

use crate::monitoring::events;

use super::assembly::{AccountConflict, AccountTable, UnitEnvelope, WireFootprint};
use super::error::{GatewayError, GatewayResult};
use super::fragment::{InstructionFragment, Phase};
use super::session::PendingOperation;
use super::unit::TransactionUnit;

/// 单笔交易的线上包体上限（IPv6 MTU 减去头部）。
pub const PACKET_DATA_SIZE: usize = 1232;
/// 单笔交易可锁定的账户上限。
pub const MAX_TX_ACCOUNT_LOCKS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TransactionLimits {
    #[serde(default = "default_max_transaction_bytes")]
    pub max_transaction_bytes: usize,
    #[serde(default = "default_max_accounts")]
    pub max_accounts: usize,
}

fn default_max_transaction_bytes() -> usize {
    PACKET_DATA_SIZE
}

fn default_max_accounts() -> usize {
    MAX_TX_ACCOUNT_LOCKS
}

impl Default for TransactionLimits {
    fn default() -> Self {
        Self {
            max_transaction_bytes: PACKET_DATA_SIZE,
            max_accounts: MAX_TX_ACCOUNT_LOCKS,
        }
    }
}

impl TransactionLimits {
    pub fn new(max_transaction_bytes: usize, max_accounts: usize) -> Self {
        Self {
            max_transaction_bytes,
            max_accounts,
        }
    }

    pub fn admits(&self, bytes: usize, accounts: usize) -> bool {
        bytes <= self.max_transaction_bytes && accounts <= self.max_accounts
    }
}

/// 正在装填的交易草稿。
#[derive(Debug, Clone)]
struct UnitDraft {
    table: AccountTable,
    footprint: WireFootprint,
    fragments: Vec<InstructionFragment>,
    operations: Vec<usize>,
}

impl UnitDraft {
    fn open(payer: Pubkey, envelope: &UnitEnvelope) -> Result<Self, AccountConflict> {
        let mut draft = Self {
            table: AccountTable::with_payer(payer),
            footprint: WireFootprint::default(),
            fragments: Vec::new(),
            operations: Vec::new(),
        };
        for ix in envelope.instructions() {
            let fragment = InstructionFragment::from_instruction(0, Phase::Setup, ix.clone());
            draft.table.absorb(&fragment)?;
            draft
                .footprint
                .add_instruction(fragment.accounts.len(), fragment.payload.len());
        }
        Ok(draft)
    }

    /// 把操作并入本草稿。冲突时草稿已部分改写，调用方应丢弃。
    fn push_operation(
        &mut self,
        index: usize,
        fragments: &[InstructionFragment],
    ) -> Result<(), AccountConflict> {
        for fragment in fragments {
            self.table.absorb(fragment)?;
            self.footprint
                .add_instruction(fragment.accounts.len(), fragment.payload.len());
        }
        self.fragments.extend_from_slice(fragments);
        self.operations.push(index);
        Ok(())
    }

    /// 并入操作后的 (字节数, 账户数)，不改动草稿。
    fn projected(&self, fragments: &[InstructionFragment]) -> (usize, usize) {
        let (signers, accounts) = self.table.projected(fragments);
        let mut footprint = self.footprint;
        for fragment in fragments {
            footprint.add_instruction(fragment.accounts.len(), fragment.payload.len());
        }
        (footprint.transaction_bytes(signers, accounts), accounts)
    }

    fn bytes(&self) -> usize {
        self.footprint
            .transaction_bytes(self.table.signer_count(), self.table.len())
    }

    fn fits(&self, limits: &TransactionLimits) -> bool {
        limits.admits(self.bytes(), self.table.len())
    }

    fn seal(self, payer: Pubkey, envelope: &UnitEnvelope) -> TransactionUnit {
        let bytes = self.bytes();
        TransactionUnit::new(
            payer,
            self.fragments,
            self.table.into_entries(),
            self.operations,
            envelope.clone(),
            bytes,
        )
    }
}

/// 按操作顺序贪心装箱，单个操作永不跨交易。
pub struct BatchPartitioner<'a> {
    payer: Pubkey,
    limits: TransactionLimits,
    envelope: &'a UnitEnvelope,
}

impl<'a> BatchPartitioner<'a> {
    pub fn new(payer: Pubkey, limits: TransactionLimits, envelope: &'a UnitEnvelope) -> Self {
        Self {
            payer,
            limits,
            envelope,
        }
    }

    pub fn partition(
        &self,
        operations: &[PendingOperation],
    ) -> GatewayResult<Vec<TransactionUnit>> {
        let empty = UnitDraft::open(self.payer, self.envelope).map_err(|conflict| {
            GatewayError::InvalidConfig(format!(
                "交易外层指令账户冲突 {}: {}",
                conflict.account, conflict.reason
            ))
        })?;

        let mut units = Vec::new();
        let mut current: Option<UnitDraft> = None;

        for (index, operation) in operations.iter().enumerate() {
            let ordered = operation.ordered_fragments();

            // 账户权限只在真正接收该操作的交易内合并，放不下时先封存当前交易。
            if let Some(draft) = current.as_mut() {
                let (bytes, accounts) = draft.projected(&ordered);
                if self.limits.admits(bytes, accounts) {
                    draft
                        .push_operation(index, &ordered)
                        .map_err(|conflict| conflict_error(index, conflict))?;
                    continue;
                }
                debug!(
                    target: "engine::partition",
                    operation = index,
                    projected_bytes = bytes,
                    projected_accounts = accounts,
                    "当前交易已满，开启新交易"
                );
                if let Some(full) = current.take() {
                    units.push(self.seal(full));
                }
            }

            let mut fresh = empty.clone();
            fresh
                .push_operation(index, &ordered)
                .map_err(|conflict| conflict_error(index, conflict))?;
            if !fresh.fits(&self.limits) {
                events::partition_rejected(index, fresh.bytes(), fresh.table.len(), &self.limits);
                return Err(GatewayError::Partition {
                    operation: index,
                    bytes: fresh.bytes(),
                    accounts: fresh.table.len(),
                    max_bytes: self.limits.max_transaction_bytes,
                    max_accounts: self.limits.max_accounts,
                });
            }
            current = Some(fresh);
        }

        if let Some(draft) = current {
            units.push(self.seal(draft));
        }

        events::partition_completed(operations.len(), &units, &self.limits);
        Ok(units)
    }

    fn seal(&self, draft: UnitDraft) -> TransactionUnit {
        let unit = draft.seal(self.payer, self.envelope);
        events::partition_unit_sealed(&unit);
        unit
    }
}

fn conflict_error(operation: usize, conflict: AccountConflict) -> GatewayError {
    GatewayError::AccountConflict {
        operation,
        account: conflict.account,
        reason: conflict.reason,
    }
}
