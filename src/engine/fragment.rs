use std::fmt;

use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;

/// 指令所处阶段，决定同一操作内的执行先后。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    Setup,
    Action,
    Cleanup,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Setup => f.write_str("setup"),
            Phase::Action => f.write_str("action"),
            Phase::Cleanup => f.write_str("cleanup"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccountRef {
    pub pubkey: Pubkey,
    pub writable: bool,
    pub signer: bool,
}

impl AccountRef {
    pub fn readonly(pubkey: Pubkey) -> Self {
        Self {
            pubkey,
            writable: false,
            signer: false,
        }
    }

    pub fn writable(pubkey: Pubkey) -> Self {
        Self {
            pubkey,
            writable: true,
            signer: false,
        }
    }

    pub fn signer(pubkey: Pubkey, writable: bool) -> Self {
        Self {
            pubkey,
            writable,
            signer: true,
        }
    }

    /// 合并两份访问权限：可写覆盖只读，签名要求向上传递。
    pub fn merge(&mut self, other: &AccountRef) {
        debug_assert_eq!(self.pubkey, other.pubkey);
        self.writable |= other.writable;
        self.signer |= other.signer;
    }
}

impl From<&AccountMeta> for AccountRef {
    fn from(meta: &AccountMeta) -> Self {
        Self {
            pubkey: meta.pubkey,
            writable: meta.is_writable,
            signer: meta.is_signer,
        }
    }
}

impl From<AccountRef> for AccountMeta {
    fn from(value: AccountRef) -> Self {
        AccountMeta {
            pubkey: value.pubkey,
            is_signer: value.signer,
            is_writable: value.writable,
        }
    }
}

/// 适配器产出的最小工作单元。payload 对 gateway 不透明。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionFragment {
    pub ordinal: u32,
    pub phase: Phase,
    pub program_id: Pubkey,
    pub accounts: Vec<AccountRef>,
    pub payload: Vec<u8>,
}

impl InstructionFragment {
    pub fn new(
        ordinal: u32,
        phase: Phase,
        program_id: Pubkey,
        accounts: Vec<AccountRef>,
        payload: Vec<u8>,
    ) -> Self {
        Self {
            ordinal,
            phase,
            program_id,
            accounts,
            payload,
        }
    }

    pub fn from_instruction(ordinal: u32, phase: Phase, instruction: Instruction) -> Self {
        let Instruction {
            program_id,
            accounts,
            data,
        } = instruction;
        Self {
            ordinal,
            phase,
            program_id,
            accounts: accounts.iter().map(AccountRef::from).collect(),
            payload: data,
        }
    }

    pub fn to_instruction(&self) -> Instruction {
        Instruction {
            program_id: self.program_id,
            accounts: self.accounts.iter().copied().map(AccountMeta::from).collect(),
            data: self.payload.clone(),
        }
    }
}

/// 按照阶段顺序依次分配 ordinal 的小工具，适配器用它拼装指令序列。
#[derive(Debug, Default)]
pub struct FragmentSequence {
    next_ordinal: u32,
    fragments: Vec<InstructionFragment>,
}

impl FragmentSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, phase: Phase, instruction: Instruction) -> &mut Self {
        let ordinal = self.next_ordinal;
        self.next_ordinal = self.next_ordinal.saturating_add(1);
        self.fragments
            .push(InstructionFragment::from_instruction(ordinal, phase, instruction));
        self
    }

    pub fn extend<I>(&mut self, phase: Phase, instructions: I) -> &mut Self
    where
        I: IntoIterator<Item = Instruction>,
    {
        for ix in instructions {
            self.push(phase, ix);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn into_fragments(self) -> Vec<InstructionFragment> {
        self.fragments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_prefers_writable_and_signer() {
        let key = Pubkey::new_unique();
        let mut account = AccountRef::readonly(key);
        account.merge(&AccountRef::writable(key));
        assert!(account.writable);
        assert!(!account.signer);
        account.merge(&AccountRef::signer(key, false));
        assert!(account.writable);
        assert!(account.signer);
    }

    #[test]
    fn fragment_round_trips_through_instruction() {
        let program = Pubkey::new_unique();
        let payer = Pubkey::new_unique();
        let ix = Instruction {
            program_id: program,
            accounts: vec![AccountMeta::new(payer, true)],
            data: vec![9, 9],
        };
        let fragment = InstructionFragment::from_instruction(3, Phase::Cleanup, ix.clone());
        assert_eq!(fragment.ordinal, 3);
        assert_eq!(fragment.accounts[0], AccountRef::signer(payer, true));
        assert_eq!(fragment.to_instruction(), ix);
    }

    #[test]
    fn sequence_assigns_increasing_ordinals() {
        let mut seq = FragmentSequence::new();
        let ix = Instruction {
            program_id: Pubkey::new_unique(),
            accounts: Vec::new(),
            data: vec![1],
        };
        seq.push(Phase::Setup, ix.clone())
            .push(Phase::Action, ix.clone())
            .push(Phase::Cleanup, ix);
        let fragments = seq.into_fragments();
        let ordinals: Vec<_> = fragments.iter().map(|f| f.ordinal).collect();
        assert_eq!(ordinals, vec![0, 1, 2]);
        assert_eq!(fragments[2].phase, Phase::Cleanup);
    }
}
