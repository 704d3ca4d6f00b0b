use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use solana_sdk::pubkey::Pubkey;
use tracing::debug;

use crate::config::ProtocolsConfig;
use crate::engine::{InstructionFragment, OperationDescriptor, ProtocolId};

pub mod error;
pub mod stake_vault;
pub mod swap_router;

pub use error::{AdapterError, AdapterResult};
pub use stake_vault::{StakeVaultAdapter, StakeVaultMarket};
pub use swap_router::{RoutePlan, RouteSource, StaticRouteSource, SwapPool, SwapRouterAdapter};

/// 适配器生成指令时可见的会话上下文。
#[derive(Debug, Clone, Copy)]
pub struct AdapterContext {
    pub payer: Pubkey,
}

impl AdapterContext {
    pub fn new(payer: Pubkey) -> Self {
        Self { payer }
    }
}

/// 协议适配器的固定接口：描述 → 指令片段。
///
/// 返回关联 Future 类型，纯计算的实现用 `Ready`，需要查询外部路由的实现
/// 返回装箱 Future，挂起点因此体现在类型签名上。
pub trait ProtocolResolver: Send + Sync {
    type ResolveFuture<'a>: Future<Output = AdapterResult<Vec<InstructionFragment>>> + Send + 'a
    where
        Self: 'a;

    fn protocol(&self) -> ProtocolId;

    fn resolve<'a>(
        &'a self,
        descriptor: &'a OperationDescriptor,
        context: &'a AdapterContext,
    ) -> Self::ResolveFuture<'a>;
}

/// 封闭的适配器集合，新增协议即新增一个变体。
pub enum ProtocolAdapter {
    StakeVault(StakeVaultAdapter),
    SwapRouter(SwapRouterAdapter),
}

impl ProtocolAdapter {
    pub fn protocol(&self) -> ProtocolId {
        match self {
            ProtocolAdapter::StakeVault(adapter) => adapter.protocol(),
            ProtocolAdapter::SwapRouter(adapter) => adapter.protocol(),
        }
    }

    pub async fn resolve(
        &self,
        descriptor: &OperationDescriptor,
        context: &AdapterContext,
    ) -> AdapterResult<Vec<InstructionFragment>> {
        match self {
            ProtocolAdapter::StakeVault(adapter) => adapter.resolve(descriptor, context).await,
            ProtocolAdapter::SwapRouter(adapter) => adapter.resolve(descriptor, context).await,
        }
    }
}

impl From<StakeVaultAdapter> for ProtocolAdapter {
    fn from(value: StakeVaultAdapter) -> Self {
        ProtocolAdapter::StakeVault(value)
    }
}

impl From<SwapRouterAdapter> for ProtocolAdapter {
    fn from(value: SwapRouterAdapter) -> Self {
        ProtocolAdapter::SwapRouter(value)
    }
}

/// 协议 → 适配器映射，构造时填充，之后只读。
#[derive(Default)]
pub struct AdapterRegistry {
    adapters: BTreeMap<ProtocolId, ProtocolAdapter>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 按配置注册适配器；没有任何条目的协议不注册。
    pub fn from_config(config: &ProtocolsConfig) -> Self {
        let mut registry = Self::new();

        if !config.stake_vault.vaults.is_empty() {
            let markets = config
                .stake_vault
                .vaults
                .iter()
                .map(StakeVaultMarket::from)
                .collect::<Vec<_>>();
            registry.register(StakeVaultAdapter::new(markets));
        }

        if !config.swap_router.pools.is_empty() {
            let pools = config
                .swap_router
                .pools
                .iter()
                .map(SwapPool::from)
                .collect::<Vec<_>>();
            registry.register(SwapRouterAdapter::new(pools, Arc::new(StaticRouteSource)));
        }

        registry
    }

    pub fn register<A>(&mut self, adapter: A)
    where
        A: Into<ProtocolAdapter>,
    {
        let adapter = adapter.into();
        let protocol = adapter.protocol();
        debug!(
            target: "adapters::registry",
            protocol = %protocol,
            "注册协议适配器"
        );
        self.adapters.insert(protocol, adapter);
    }

    pub fn get(&self, protocol: ProtocolId) -> Option<&ProtocolAdapter> {
        self.adapters.get(&protocol)
    }

    pub fn protocols(&self) -> impl Iterator<Item = ProtocolId> + '_ {
        self.adapters.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{StakeVaultConfig, StakeVaultMarketConfig};

    #[test]
    fn from_config_registers_only_configured_protocols() {
        let config = ProtocolsConfig {
            stake_vault: StakeVaultConfig {
                vaults: vec![StakeVaultMarketConfig {
                    vault: Pubkey::new_unique(),
                    program_id: Pubkey::new_unique(),
                    authority: Pubkey::new_unique(),
                    reserve: Pubkey::new_unique(),
                    share_mint: Pubkey::new_unique(),
                    deposit_mint: Pubkey::new_unique(),
                    token_program: spl_token::ID,
                }],
            },
            ..Default::default()
        };
        let registry = AdapterRegistry::from_config(&config);
        assert!(registry.get(ProtocolId::StakeVault).is_some());
        assert!(registry.get(ProtocolId::SwapRouter).is_none());
        assert_eq!(
            registry.protocols().collect::<Vec<_>>(),
            vec![ProtocolId::StakeVault]
        );
    }
}
