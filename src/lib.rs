//! 多协议交易组合网关：把存入 / 赎回 / 兑换操作转换为按大小装箱、可顺序提交的交易单元。

pub mod adapters;
pub mod cli;
pub mod config;
pub mod engine;
pub mod instructions;
pub mod lander;
pub mod monitoring;

pub use adapters::{AdapterRegistry, ProtocolAdapter, ProtocolResolver};
pub use engine::{
    GatewayBuilder, GatewayError, GatewayResult, OperationRequest, ProtocolId,
    SharedGatewayBuilder, SwapDirection, TransactionLimits, TransactionUnit,
};
