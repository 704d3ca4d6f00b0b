use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

use crate::adapters::AdapterError;

use super::operation::{OperationKind, ProtocolId};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("协议未注册适配器: {0}")]
    UnsupportedProtocol(ProtocolId),
    #[error("第 {operation} 个操作 ({protocol} {kind}) 生成指令失败: {source}")]
    Adapter {
        operation: usize,
        protocol: ProtocolId,
        kind: OperationKind,
        #[source]
        source: AdapterError,
    },
    #[error("会话中没有任何操作，无法 finalize")]
    EmptySession,
    #[error("会话尚未 finalize")]
    NotFinalized,
    #[error(
        "第 {operation} 个操作无法放入任何交易: 需要 {bytes} 字节/{accounts} 个账户，上限 {max_bytes} 字节/{max_accounts} 个账户"
    )]
    Partition {
        operation: usize,
        bytes: usize,
        accounts: usize,
        max_bytes: usize,
        max_accounts: usize,
    },
    #[error("第 {operation} 个操作的账户 {account} 权限冲突: {reason}")]
    AccountConflict {
        operation: usize,
        account: Pubkey,
        reason: &'static str,
    },
    #[error("配置缺失或非法: {0}")]
    InvalidConfig(String),
    #[error("交易编译失败: {0}")]
    Transaction(#[from] anyhow::Error),
}

impl GatewayError {
    /// 会话级致命错误：调用方需要拆分操作后使用新会话重试。
    pub fn is_fatal_for_session(&self) -> bool {
        matches!(
            self,
            GatewayError::Partition { .. } | GatewayError::AccountConflict { .. }
        )
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;
