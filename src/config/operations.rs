use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_with::{DisplayFromStr, serde_as};
use solana_sdk::pubkey::Pubkey;

use crate::engine::{OperationKind, OperationRequest, ProtocolId, SwapDirection};

use super::ConfigError;

/// CLI 读取的操作清单，按文件中出现的顺序执行。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OperationsFile {
    #[serde(default)]
    pub operations: Vec<OperationEntry>,
}

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub struct OperationEntry {
    pub kind: OperationKind,
    pub protocol: ProtocolId,
    #[serde_as(as = "DisplayFromStr")]
    pub vault: Pubkey,
    pub amount: u64,
    #[serde(default)]
    pub direction: Option<SwapDirection>,
}

impl OperationEntry {
    pub fn request(&self) -> OperationRequest {
        OperationRequest {
            protocol: self.protocol,
            vault: self.vault,
            amount: self.amount,
            direction: self.direction,
        }
    }
}

pub fn load_operations(path: &Path) -> Result<OperationsFile, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
