use std::fmt;

use bincode::error::EncodeError;
use solana_client::client_error::ClientError;
use thiserror::Error;

use crate::engine::GatewayError;

use super::stack::LanderReceipt;

#[derive(Debug, Error)]
pub enum LanderError {
    #[error("RPC 提交失败: {0}")]
    Rpc(#[from] ClientError),
    #[error("序列化交易失败: {0}")]
    Encode(#[from] EncodeError),
    #[error("交易单元编译失败: {0}")]
    Gateway(#[from] GatewayError),
    #[error("{0}")]
    Fatal(String),
}

impl LanderError {
    pub fn fatal(reason: impl fmt::Display) -> Self {
        Self::Fatal(reason.to_string())
    }
}

/// 顺序提交中断：`receipts` 为此前已落地的单元。
#[derive(Debug, Error)]
#[error("第 {index} 笔交易提交失败，已提交 {} 笔: {source}", .receipts.len())]
pub struct SubmissionFailure {
    pub index: usize,
    pub receipts: Vec<LanderReceipt>,
    #[source]
    pub source: LanderError,
}
