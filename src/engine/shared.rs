use std::sync::Arc;

use tokio::sync::Mutex;

use super::builder::GatewayBuilder;
use super::error::GatewayResult;
use super::operation::{OperationKind, OperationRequest};
use super::unit::TransactionUnit;

/// 可跨任务克隆的 builder 句柄。
///
/// 锁在整个适配器调用期间持有，包括其中的 await，
/// 因此并发调用按获取锁的顺序逐个追加。
#[derive(Clone)]
pub struct SharedGatewayBuilder {
    inner: Arc<Mutex<GatewayBuilder>>,
}

impl SharedGatewayBuilder {
    pub fn new(builder: GatewayBuilder) -> Self {
        Self {
            inner: Arc::new(Mutex::new(builder)),
        }
    }

    pub async fn deposit(&self, request: OperationRequest) -> GatewayResult<usize> {
        self.append(OperationKind::Deposit, request).await
    }

    pub async fn withdraw(&self, request: OperationRequest) -> GatewayResult<usize> {
        self.append(OperationKind::Withdraw, request).await
    }

    pub async fn swap(&self, request: OperationRequest) -> GatewayResult<usize> {
        self.append(OperationKind::Swap, request).await
    }

    pub async fn append(
        &self,
        kind: OperationKind,
        request: OperationRequest,
    ) -> GatewayResult<usize> {
        let mut builder = self.inner.lock().await;
        builder.append(kind, request).await
    }

    pub async fn finalize(&self) -> GatewayResult<Vec<TransactionUnit>> {
        let mut builder = self.inner.lock().await;
        builder.finalize().map(<[TransactionUnit]>::to_vec)
    }

    pub async fn transactions(&self) -> GatewayResult<Vec<TransactionUnit>> {
        let builder = self.inner.lock().await;
        builder.transactions().map(<[TransactionUnit]>::to_vec)
    }

    pub async fn operation_count(&self) -> usize {
        self.inner.lock().await.session().len()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use solana_sdk::pubkey::Pubkey;

    use super::*;
    use crate::adapters::{
        AdapterRegistry, AdapterResult, RoutePlan, RouteSource, SwapPool, SwapRouterAdapter,
    };
    use crate::engine::{ProtocolId, SwapDirection};
    use crate::instructions::token::SPL_TOKEN_PROGRAM_ID;

    /// 兑换路由挂起若干次，放大交错的可能。
    struct SlowRoute;

    #[async_trait]
    impl RouteSource for SlowRoute {
        async fn route(
            &self,
            pool: &SwapPool,
            direction: SwapDirection,
            amount_in: u64,
        ) -> AdapterResult<RoutePlan> {
            for _ in 0..3 {
                tokio::task::yield_now().await;
            }
            Ok(RoutePlan::direct(pool, direction, amount_in, 0))
        }
    }

    #[tokio::test(flavor = "current_thread")]
    async fn concurrent_appends_are_serialized() {
        let pool = SwapPool {
            pool: Pubkey::new_unique(),
            program_id: Pubkey::new_unique(),
            authority: Pubkey::new_unique(),
            mint_a: Pubkey::new_unique(),
            mint_b: Pubkey::new_unique(),
            vault_a: Pubkey::new_unique(),
            vault_b: Pubkey::new_unique(),
            token_program_a: SPL_TOKEN_PROGRAM_ID,
            token_program_b: SPL_TOKEN_PROGRAM_ID,
        };
        let address = pool.pool;
        let mut registry = AdapterRegistry::new();
        registry.register(SwapRouterAdapter::new([pool], Arc::new(SlowRoute)));
        let shared = SharedGatewayBuilder::new(GatewayBuilder::new(
            Arc::new(registry),
            Pubkey::new_unique(),
        ));

        let tasks = (1..=4u64).map(|amount| {
            let shared = shared.clone();
            async move {
                shared
                    .swap(
                        OperationRequest::new(ProtocolId::SwapRouter, address, amount)
                            .with_direction(SwapDirection::Forward),
                    )
                    .await
            }
        });
        let mut indices = futures::future::join_all(tasks)
            .await
            .into_iter()
            .collect::<GatewayResult<Vec<_>>>()
            .expect("all swaps appended");
        indices.sort_unstable();
        assert_eq!(indices, vec![0, 1, 2, 3]);
        assert_eq!(shared.operation_count().await, 4);

        let units = shared.finalize().await.expect("finalize");
        assert_eq!(shared.transactions().await.expect("units"), units);
    }
}
