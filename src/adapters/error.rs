use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

use crate::engine::{OperationKind, ProtocolId};

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("数量必须大于 0")]
    InvalidAmount,
    #[error("未知的金库/池子: {0}")]
    UnknownVault(Pubkey),
    #[error("{protocol} 不支持 {kind} 操作")]
    UnsupportedOperation {
        protocol: ProtocolId,
        kind: OperationKind,
    },
    #[error("兑换操作缺少方向")]
    MissingDirection,
    #[error("路由查询失败: {0}")]
    Route(String),
    #[error("指令编码失败: {0}")]
    Encode(#[from] std::io::Error),
    #[error("适配器未生成任何指令")]
    NoFragments,
}

pub type AdapterResult<T> = Result<T, AdapterError>;
