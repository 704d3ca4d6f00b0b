use dashmap::DashMap;
use once_cell::sync::Lazy;
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;

pub const SPL_TOKEN_PROGRAM_ID: Pubkey = spl_token::ID;
pub const SYSTEM_PROGRAM_ID: Pubkey = solana_sdk::pubkey!("11111111111111111111111111111111");

const CREATE_IDEMPOTENT: u8 = 1;
const CLOSE_ACCOUNT: u8 = 9;
const SYNC_NATIVE: u8 = 17;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct AtaKey {
    owner: Pubkey,
    mint: Pubkey,
    token_program: Pubkey,
}

static ATA_CACHE: Lazy<DashMap<AtaKey, Pubkey>> = Lazy::new(DashMap::new);

pub fn associated_token_program_id() -> Pubkey {
    spl_associated_token_account::id()
}

/// 返回缓存的 ATA 地址，未命中时计算并写入缓存。
pub fn associated_token_address(owner: &Pubkey, mint: &Pubkey, token_program: &Pubkey) -> Pubkey {
    let key = AtaKey {
        owner: *owner,
        mint: *mint,
        token_program: *token_program,
    };
    *ATA_CACHE.entry(key).or_insert_with(|| {
        Pubkey::find_program_address(
            &[owner.as_ref(), token_program.as_ref(), mint.as_ref()],
            &associated_token_program_id(),
        )
        .0
    })
}

/// 幂等创建 ATA，账户已存在时链上直接跳过。
pub fn create_associated_token_account_idempotent(
    payer: &Pubkey,
    owner: &Pubkey,
    mint: &Pubkey,
    token_program: &Pubkey,
) -> Instruction {
    let ata = associated_token_address(owner, mint, token_program);
    Instruction {
        program_id: associated_token_program_id(),
        accounts: vec![
            AccountMeta::new(*payer, true),
            AccountMeta::new(ata, false),
            AccountMeta::new_readonly(*owner, false),
            AccountMeta::new_readonly(*mint, false),
            AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
            AccountMeta::new_readonly(*token_program, false),
        ],
        data: vec![CREATE_IDEMPOTENT],
    }
}

pub fn close_account(
    token_program: &Pubkey,
    account: &Pubkey,
    destination: &Pubkey,
    owner: &Pubkey,
) -> Instruction {
    Instruction {
        program_id: *token_program,
        accounts: vec![
            AccountMeta::new(*account, false),
            AccountMeta::new(*destination, false),
            AccountMeta::new_readonly(*owner, true),
        ],
        data: vec![CLOSE_ACCOUNT],
    }
}

pub fn sync_native(token_program: &Pubkey, account: &Pubkey) -> Instruction {
    Instruction {
        program_id: *token_program,
        accounts: vec![AccountMeta::new(*account, false)],
        data: vec![SYNC_NATIVE],
    }
}
