use std::io;

use borsh::BorshSerialize;
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;

use crate::config::SwapPoolConfig;
use crate::engine::SwapDirection;
use crate::instructions::discriminator::encode_instruction;
use crate::instructions::token::associated_token_address;

use super::route::RoutePlan;

#[derive(Debug, BorshSerialize)]
struct SwapArgs {
    amount_in: u64,
    minimum_amount_out: u64,
    a_to_b: bool,
}

/// 双资产兑换池的静态元数据。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapPool {
    pub pool: Pubkey,
    pub program_id: Pubkey,
    pub authority: Pubkey,
    pub mint_a: Pubkey,
    pub mint_b: Pubkey,
    pub vault_a: Pubkey,
    pub vault_b: Pubkey,
    pub token_program_a: Pubkey,
    pub token_program_b: Pubkey,
}

impl From<&SwapPoolConfig> for SwapPool {
    fn from(value: &SwapPoolConfig) -> Self {
        Self {
            pool: value.pool,
            program_id: value.program_id,
            authority: value.authority,
            mint_a: value.mint_a,
            mint_b: value.mint_b,
            vault_a: value.vault_a,
            vault_b: value.vault_b,
            token_program_a: value.token_program_a,
            token_program_b: value.token_program_b,
        }
    }
}

impl SwapPool {
    /// 按方向返回 (输入侧, 输出侧)，每侧为 (mint, vault, token program)。
    pub fn sides(&self, direction: SwapDirection) -> ((Pubkey, Pubkey, Pubkey), (Pubkey, Pubkey, Pubkey)) {
        let a = (self.mint_a, self.vault_a, self.token_program_a);
        let b = (self.mint_b, self.vault_b, self.token_program_b);
        match direction {
            SwapDirection::Forward => (a, b),
            SwapDirection::Reverse => (b, a),
        }
    }

    pub fn swap_instruction(&self, owner: &Pubkey, plan: &RoutePlan) -> io::Result<Instruction> {
        let data = encode_instruction(
            "swap",
            &SwapArgs {
                amount_in: plan.amount_in,
                minimum_amount_out: plan.minimum_amount_out,
                a_to_b: plan.direction == SwapDirection::Forward,
            },
        )?;

        let user_source =
            associated_token_address(owner, &plan.input_mint, &plan.input_token_program);
        let user_destination =
            associated_token_address(owner, &plan.output_mint, &plan.output_token_program);

        let mut accounts = Vec::with_capacity(11 + plan.remaining_accounts.len());
        accounts.extend([
            AccountMeta::new(self.pool, false),
            AccountMeta::new_readonly(self.authority, false),
            AccountMeta::new_readonly(*owner, true),
            AccountMeta::new(user_source, false),
            AccountMeta::new(user_destination, false),
            AccountMeta::new(plan.input_vault, false),
            AccountMeta::new(plan.output_vault, false),
            AccountMeta::new_readonly(plan.input_mint, false),
            AccountMeta::new_readonly(plan.output_mint, false),
            AccountMeta::new_readonly(plan.input_token_program, false),
            AccountMeta::new_readonly(plan.output_token_program, false),
        ]);
        accounts.extend(plan.remaining_accounts.iter().cloned());

        Ok(Instruction {
            program_id: self.program_id,
            accounts,
            data,
        })
    }
}
