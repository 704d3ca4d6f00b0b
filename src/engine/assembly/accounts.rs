use std::collections::{HashMap, HashSet};

use solana_sdk::pubkey::Pubkey;

use crate::engine::fragment::{AccountRef, InstructionFragment};

/// 账户权限无法合并时返回的冲突描述。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountConflict {
    pub account: Pubkey,
    pub reason: &'static str,
}

/// 单笔交易内去重后的账户表，付款人固定在首位。
#[derive(Debug, Clone)]
pub struct AccountTable {
    entries: Vec<AccountRef>,
    index: HashMap<Pubkey, usize>,
    programs: HashSet<Pubkey>,
}

impl AccountTable {
    pub fn with_payer(payer: Pubkey) -> Self {
        let mut table = Self {
            entries: Vec::new(),
            index: HashMap::new(),
            programs: HashSet::new(),
        };
        table.entries.push(AccountRef::signer(payer, true));
        table.index.insert(payer, 0);
        table
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn signer_count(&self) -> usize {
        self.entries.iter().filter(|account| account.signer).count()
    }

    pub fn entries(&self) -> &[AccountRef] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<AccountRef> {
        self.entries
    }

    pub fn contains(&self, pubkey: &Pubkey) -> bool {
        self.index.contains_key(pubkey)
    }

    /// 不修改表本身，估算吸收这些片段后的 (签名者数, 账户数)。不做冲突检查。
    pub fn projected<'f, I>(&self, fragments: I) -> (usize, usize)
    where
        I: IntoIterator<Item = &'f InstructionFragment>,
    {
        let mut added: HashMap<Pubkey, bool> = HashMap::new();
        let mut promoted: HashSet<Pubkey> = HashSet::new();
        for fragment in fragments {
            let program = AccountRef::readonly(fragment.program_id);
            for account in std::iter::once(&program).chain(fragment.accounts.iter()) {
                match self.index.get(&account.pubkey) {
                    Some(&slot) => {
                        if account.signer && !self.entries[slot].signer {
                            promoted.insert(account.pubkey);
                        }
                    }
                    None => {
                        let signer = added.entry(account.pubkey).or_insert(false);
                        *signer |= account.signer;
                    }
                }
            }
        }
        let signers = self.signer_count()
            + promoted.len()
            + added.values().filter(|signer| **signer).count();
        (signers, self.len() + added.len())
    }

    /// 登记被调用的程序。程序账户只能以只读方式出现。
    pub fn insert_program(&mut self, program_id: Pubkey) -> Result<(), AccountConflict> {
        if let Some(&slot) = self.index.get(&program_id) {
            let existing = self.entries[slot];
            if existing.writable {
                return Err(AccountConflict {
                    account: program_id,
                    reason: "可写账户同时被当作程序调用",
                });
            }
        } else {
            self.index.insert(program_id, self.entries.len());
            self.entries.push(AccountRef::readonly(program_id));
        }
        self.programs.insert(program_id);
        Ok(())
    }

    pub fn insert(&mut self, account: &AccountRef) -> Result<(), AccountConflict> {
        if account.writable && self.programs.contains(&account.pubkey) {
            return Err(AccountConflict {
                account: account.pubkey,
                reason: "程序账户不能被写锁定",
            });
        }
        match self.index.get(&account.pubkey) {
            Some(&slot) => self.entries[slot].merge(account),
            None => {
                self.index.insert(account.pubkey, self.entries.len());
                self.entries.push(*account);
            }
        }
        Ok(())
    }

    pub fn absorb(&mut self, fragment: &InstructionFragment) -> Result<(), AccountConflict> {
        self.insert_program(fragment.program_id)?;
        for account in &fragment.accounts {
            self.insert(account)?;
        }
        Ok(())
    }
}
