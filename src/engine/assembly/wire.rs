//! v0 交易的线上字节数估算（不使用 ALT）。
//!
//! 布局: shortvec(签名) + 签名 + 版本前缀 + 消息头 + shortvec(账户) + 账户
//! + blockhash + shortvec(指令) + 指令 + shortvec(ALT 查表)。

pub const SIGNATURE_BYTES: usize = 64;
pub const PUBKEY_BYTES: usize = 32;
const VERSION_PREFIX_BYTES: usize = 1;
const MESSAGE_HEADER_BYTES: usize = 3;
const BLOCKHASH_BYTES: usize = 32;

/// shortvec 长度前缀所占字节数。
pub fn compact_len(value: usize) -> usize {
    match value {
        0..=0x7f => 1,
        0x80..=0x3fff => 2,
        _ => 3,
    }
}

/// 单条已编译指令的字节数（账户以 u8 索引表示）。
pub fn instruction_bytes(account_count: usize, data_len: usize) -> usize {
    1 + compact_len(account_count) + account_count + compact_len(data_len) + data_len
}

/// 累加指令字节后估算整笔交易大小。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WireFootprint {
    pub instruction_count: usize,
    pub instruction_bytes: usize,
}

impl WireFootprint {
    pub fn add_instruction(&mut self, account_count: usize, data_len: usize) {
        self.instruction_count += 1;
        self.instruction_bytes += instruction_bytes(account_count, data_len);
    }

    pub fn transaction_bytes(&self, signer_count: usize, account_count: usize) -> usize {
        compact_len(signer_count)
            + signer_count * SIGNATURE_BYTES
            + VERSION_PREFIX_BYTES
            + MESSAGE_HEADER_BYTES
            + compact_len(account_count)
            + account_count * PUBKEY_BYTES
            + BLOCKHASH_BYTES
            + compact_len(self.instruction_count)
            + self.instruction_bytes
            + compact_len(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::hash::Hash;
    use solana_sdk::instruction::{AccountMeta, Instruction};
    use solana_sdk::message::VersionedMessage;
    use solana_sdk::message::v0::Message as V0Message;
    use solana_sdk::pubkey::Pubkey;

    #[test]
    fn compact_len_boundaries() {
        assert_eq!(compact_len(0), 1);
        assert_eq!(compact_len(127), 1);
        assert_eq!(compact_len(128), 2);
        assert_eq!(compact_len(16_383), 2);
        assert_eq!(compact_len(16_384), 3);
    }

    #[test]
    fn estimate_matches_compiled_v0_message() {
        let payer = Pubkey::new_unique();
        let program = Pubkey::new_unique();
        let vault = Pubkey::new_unique();
        let instructions = vec![
            Instruction {
                program_id: program,
                accounts: vec![AccountMeta::new(payer, true), AccountMeta::new(vault, false)],
                data: vec![7u8; 200],
            },
            Instruction {
                program_id: program,
                accounts: vec![AccountMeta::new_readonly(vault, false)],
                data: vec![1u8; 3],
            },
        ];

        let mut footprint = WireFootprint::default();
        for ix in &instructions {
            footprint.add_instruction(ix.accounts.len(), ix.data.len());
        }

        let message = V0Message::try_compile(&payer, &instructions, &[], Hash::default())
            .expect("compile v0 message");
        assert_eq!(message.account_keys.len(), 3);
        let serialized = VersionedMessage::V0(message).serialize();
        let actual = compact_len(1) + SIGNATURE_BYTES + serialized.len();

        assert_eq!(footprint.transaction_bytes(1, 3), actual);
    }
}
