use std::env;
use std::sync::Arc;

use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signer};

use crate::config::WalletConfig;

use super::error::{GatewayError, GatewayResult};

pub const PRIVATE_KEY_ENV: &str = "VAULT_GATEWAY_PRIVATE_KEY";

/// 会话付款人 / 签名者。
#[derive(Clone)]
pub struct EngineIdentity {
    pub pubkey: Pubkey,
    pub signer: Arc<Keypair>,
}

impl EngineIdentity {
    pub fn from_wallet(wallet: &WalletConfig) -> GatewayResult<Self> {
        Ok(Self::from_keypair(load_keypair(wallet)?))
    }

    pub fn from_keypair(keypair: Keypair) -> Self {
        Self {
            pubkey: keypair.pubkey(),
            signer: Arc::new(keypair),
        }
    }
}

impl std::fmt::Debug for EngineIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineIdentity")
            .field("pubkey", &self.pubkey)
            .finish_non_exhaustive()
    }
}

fn load_keypair(wallet: &WalletConfig) -> GatewayResult<Keypair> {
    if let Ok(value) = env::var(PRIVATE_KEY_ENV) {
        if !value.trim().is_empty() {
            return parse_keypair_string(value.trim()).map_err(|err| {
                GatewayError::InvalidConfig(format!("环境变量 {PRIVATE_KEY_ENV} 非法: {err}"))
            });
        }
    }

    if !wallet.private_key.trim().is_empty() {
        return parse_keypair_string(wallet.private_key.trim()).map_err(|err| {
            GatewayError::InvalidConfig(format!("配置 global.wallet.private_key 非法: {err}"))
        });
    }

    Err(GatewayError::InvalidConfig(format!(
        "缺少私钥配置，请提供 global.wallet.private_key 或环境变量 {PRIVATE_KEY_ENV}"
    )))
}

/// 支持三种写法：JSON 数组、逗号分隔的字节、bs58 字符串。
pub fn parse_keypair_string(raw: &str) -> Result<Keypair, anyhow::Error> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        anyhow::bail!("keypair string empty");
    }

    if trimmed.starts_with('[') {
        let bytes: Vec<u8> = serde_json::from_str(trimmed)?;
        Ok(Keypair::try_from(bytes.as_slice())?)
    } else if trimmed.contains(',') {
        let bytes = trimmed
            .split(',')
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .map(|part| part.parse::<u8>())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Keypair::try_from(bytes.as_slice())?)
    } else {
        let data = bs58::decode(trimmed).into_vec()?;
        Ok(Keypair::try_from(data.as_slice())?)
    }
}
