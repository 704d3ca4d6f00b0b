use std::fmt;

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

/// 目标金库 / 池子地址。
pub type VaultId = Pubkey;

/// 支持的外部协议。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolId {
    StakeVault,
    SwapRouter,
}

impl fmt::Display for ProtocolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolId::StakeVault => f.write_str("stake_vault"),
            ProtocolId::SwapRouter => f.write_str("swap_router"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Deposit,
    Withdraw,
    Swap,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Deposit => f.write_str("deposit"),
            OperationKind::Withdraw => f.write_str("withdraw"),
            OperationKind::Swap => f.write_str("swap"),
        }
    }
}

/// 兑换方向：Forward 为 A → B，Reverse 为 B → A。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwapDirection {
    Forward,
    Reverse,
}

impl fmt::Display for SwapDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwapDirection::Forward => f.write_str("forward"),
            SwapDirection::Reverse => f.write_str("reverse"),
        }
    }
}

/// 调用方传给 `deposit` / `withdraw` / `swap` 的请求参数。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationRequest {
    pub protocol: ProtocolId,
    pub vault: VaultId,
    pub amount: u64,
    pub direction: Option<SwapDirection>,
}

impl OperationRequest {
    pub fn new(protocol: ProtocolId, vault: VaultId, amount: u64) -> Self {
        Self {
            protocol,
            vault,
            amount,
            direction: None,
        }
    }

    pub fn with_direction(mut self, direction: SwapDirection) -> Self {
        self.direction = Some(direction);
        self
    }
}

/// 单个操作的不可变描述，由 builder 生成后交给适配器消费。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationDescriptor {
    protocol: ProtocolId,
    target: VaultId,
    kind: OperationKind,
    amount: u64,
    direction: Option<SwapDirection>,
}

impl OperationDescriptor {
    pub fn new(kind: OperationKind, request: OperationRequest) -> Self {
        Self {
            protocol: request.protocol,
            target: request.vault,
            kind,
            amount: request.amount,
            direction: request.direction,
        }
    }

    pub fn protocol(&self) -> ProtocolId {
        self.protocol
    }

    pub fn target(&self) -> &VaultId {
        &self.target
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }

    pub fn direction(&self) -> Option<SwapDirection> {
        self.direction
    }
}
