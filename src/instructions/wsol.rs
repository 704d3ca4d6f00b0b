use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use solana_system_interface::instruction as system_instruction;

use super::token::{
    SPL_TOKEN_PROGRAM_ID, associated_token_address, close_account,
    create_associated_token_account_idempotent, sync_native,
};

pub const WSOL_MINT: Pubkey = solana_sdk::pubkey!("So11111111111111111111111111111111111111112");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct WrapKey {
    owner: Pubkey,
    lamports: u64,
}

static WRAP_CACHE: Lazy<DashMap<WrapKey, Arc<Vec<Instruction>>>> = Lazy::new(DashMap::new);
static UNWRAP_CACHE: Lazy<DashMap<Pubkey, Arc<Vec<Instruction>>>> = Lazy::new(DashMap::new);

pub fn is_native_mint(mint: &Pubkey) -> bool {
    *mint == WSOL_MINT
}

pub fn wsol_account(owner: &Pubkey) -> Pubkey {
    associated_token_address(owner, &WSOL_MINT, &SPL_TOKEN_PROGRAM_ID)
}

/// 包裹 SOL：幂等创建 WSOL ATA + 转账 + sync_native。
pub fn wrap_sequence(owner: &Pubkey, lamports: u64) -> Arc<Vec<Instruction>> {
    let key = WrapKey {
        owner: *owner,
        lamports,
    };
    WRAP_CACHE
        .entry(key)
        .or_insert_with(|| Arc::new(build_wrap_sequence(*owner, lamports)))
        .clone()
}

/// 解包 SOL：关闭 WSOL ATA，余额退回 owner。
pub fn unwrap_sequence(owner: &Pubkey) -> Arc<Vec<Instruction>> {
    UNWRAP_CACHE
        .entry(*owner)
        .or_insert_with(|| Arc::new(build_unwrap_sequence(*owner)))
        .clone()
}

fn build_wrap_sequence(owner: Pubkey, lamports: u64) -> Vec<Instruction> {
    let ata = wsol_account(&owner);
    vec![
        create_associated_token_account_idempotent(
            &owner,
            &owner,
            &WSOL_MINT,
            &SPL_TOKEN_PROGRAM_ID,
        ),
        system_instruction::transfer(&owner, &ata, lamports),
        sync_native(&SPL_TOKEN_PROGRAM_ID, &ata),
    ]
}

fn build_unwrap_sequence(owner: Pubkey) -> Vec<Instruction> {
    let ata = wsol_account(&owner);
    vec![close_account(&SPL_TOKEN_PROGRAM_ID, &ata, &owner, &owner)]
}
