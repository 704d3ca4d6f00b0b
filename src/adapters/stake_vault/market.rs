use std::io;

use borsh::BorshSerialize;
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;

use crate::config::StakeVaultMarketConfig;
use crate::instructions::discriminator::encode_instruction;
use crate::instructions::token::associated_token_address;
use crate::instructions::wsol::{is_native_mint, wsol_account};

#[derive(Debug, BorshSerialize)]
struct DepositArgs {
    amount: u64,
}

#[derive(Debug, BorshSerialize)]
struct WithdrawArgs {
    shares: u64,
}

/// 流动性质押金库的静态元数据。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StakeVaultMarket {
    pub vault: Pubkey,
    pub program_id: Pubkey,
    pub authority: Pubkey,
    pub reserve: Pubkey,
    pub share_mint: Pubkey,
    pub deposit_mint: Pubkey,
    pub token_program: Pubkey,
}

impl From<&StakeVaultMarketConfig> for StakeVaultMarket {
    fn from(value: &StakeVaultMarketConfig) -> Self {
        Self {
            vault: value.vault,
            program_id: value.program_id,
            authority: value.authority,
            reserve: value.reserve,
            share_mint: value.share_mint,
            deposit_mint: value.deposit_mint,
            token_program: value.token_program,
        }
    }
}

impl StakeVaultMarket {
    pub fn accepts_native(&self) -> bool {
        is_native_mint(&self.deposit_mint)
    }

    /// 用户存入资产所在的代币账户，原生 SOL 走 WSOL ATA。
    pub fn user_deposit_account(&self, owner: &Pubkey) -> Pubkey {
        if self.accepts_native() {
            wsol_account(owner)
        } else {
            associated_token_address(owner, &self.deposit_mint, &self.token_program)
        }
    }

    pub fn user_share_account(&self, owner: &Pubkey) -> Pubkey {
        associated_token_address(owner, &self.share_mint, &self.token_program)
    }

    pub fn deposit_instruction(&self, owner: &Pubkey, amount: u64) -> io::Result<Instruction> {
        let data = encode_instruction("deposit", &DepositArgs { amount })?;
        Ok(Instruction {
            program_id: self.program_id,
            accounts: self.accounts(
                owner,
                self.user_deposit_account(owner),
                self.user_share_account(owner),
            ),
            data,
        })
    }

    pub fn withdraw_instruction(&self, owner: &Pubkey, shares: u64) -> io::Result<Instruction> {
        let data = encode_instruction("withdraw", &WithdrawArgs { shares })?;
        Ok(Instruction {
            program_id: self.program_id,
            accounts: self.accounts(
                owner,
                self.user_share_account(owner),
                self.user_deposit_account(owner),
            ),
            data,
        })
    }

    fn accounts(&self, owner: &Pubkey, source: Pubkey, destination: Pubkey) -> Vec<AccountMeta> {
        vec![
            AccountMeta::new(self.vault, false),
            AccountMeta::new_readonly(self.authority, false),
            AccountMeta::new(self.reserve, false),
            AccountMeta::new(self.share_mint, false),
            AccountMeta::new_readonly(self.deposit_mint, false),
            AccountMeta::new_readonly(*owner, true),
            AccountMeta::new(source, false),
            AccountMeta::new(destination, false),
            AccountMeta::new_readonly(self.token_program, false),
        ]
    }
}
