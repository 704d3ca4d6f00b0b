use anyhow::anyhow;
use solana_sdk::hash::Hash;
use solana_sdk::instruction::Instruction;
use solana_sdk::message::v0::Message as V0Message;
use solana_sdk::pubkey::Pubkey;

use super::assembly::UnitEnvelope;
use super::error::{GatewayError, GatewayResult};
use super::fragment::{AccountRef, InstructionFragment};

/// finalize 产出的可提交单元，创建后不可变。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionUnit {
    payer: Pubkey,
    fragments: Vec<InstructionFragment>,
    accounts: Vec<AccountRef>,
    operations: Vec<usize>,
    envelope: UnitEnvelope,
    estimated_bytes: usize,
}

impl TransactionUnit {
    pub(crate) fn new(
        payer: Pubkey,
        fragments: Vec<InstructionFragment>,
        accounts: Vec<AccountRef>,
        operations: Vec<usize>,
        envelope: UnitEnvelope,
        estimated_bytes: usize,
    ) -> Self {
        Self {
            payer,
            fragments,
            accounts,
            operations,
            envelope,
            estimated_bytes,
        }
    }

    pub fn payer(&self) -> &Pubkey {
        &self.payer
    }

    pub fn fragments(&self) -> &[InstructionFragment] {
        &self.fragments
    }

    /// 去重后的账户列表，付款人位于首位。
    pub fn accounts(&self) -> &[AccountRef] {
        &self.accounts
    }

    /// 该单元承载的操作序号（按加入会话的顺序）。
    pub fn operations(&self) -> &[usize] {
        &self.operations
    }

    pub fn envelope(&self) -> &UnitEnvelope {
        &self.envelope
    }

    pub fn estimated_bytes(&self) -> usize {
        self.estimated_bytes
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    /// 扁平化为链上指令：compute budget → 片段 → memo。
    pub fn instructions(&self) -> Vec<Instruction> {
        self.envelope
            .wrap(self.fragments.iter().map(InstructionFragment::to_instruction))
    }

    pub fn compile(&self, blockhash: Hash) -> GatewayResult<V0Message> {
        V0Message::try_compile(&self.payer, &self.instructions(), &[], blockhash)
            .map_err(|err| GatewayError::Transaction(anyhow!(err)))
    }
}
