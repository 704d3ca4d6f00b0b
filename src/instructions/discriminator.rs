use std::io;

use borsh::BorshSerialize;
use sha2::{Digest, Sha256};

/// Anchor 风格的 8 字节指令判别符：`sha256("global:<name>")[..8]`。
pub fn instruction_discriminator(name: &str) -> [u8; 8] {
    let digest = Sha256::digest(format!("global:{name}").as_bytes());
    let mut out = [0u8; 8];
    out.copy_from_slice(&digest[..8]);
    out
}

/// 判别符 + borsh 参数。
pub fn encode_instruction<T>(name: &str, args: &T) -> io::Result<Vec<u8>>
where
    T: BorshSerialize,
{
    let mut data = Vec::with_capacity(8 + 16);
    data.extend_from_slice(&instruction_discriminator(name));
    args.serialize(&mut data)?;
    Ok(data)
}
