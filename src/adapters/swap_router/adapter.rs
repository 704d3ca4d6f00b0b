use std::collections::HashMap;
use std::sync::Arc;

use futures::future::BoxFuture;
use solana_sdk::pubkey::Pubkey;
use tracing::debug;

use crate::adapters::{AdapterContext, AdapterError, AdapterResult, ProtocolResolver};
use crate::engine::{
    FragmentSequence, InstructionFragment, OperationDescriptor, OperationKind, Phase, ProtocolId,
};
use crate::instructions::token::create_associated_token_account_idempotent;
use crate::instructions::wsol::{is_native_mint, unwrap_sequence, wrap_sequence};

use super::pool::SwapPool;
use super::route::{RoutePlan, RouteSource};

/// 兑换路由适配器。只接受 swap，路由由 [`RouteSource`] 提供，可能跨越 await。
pub struct SwapRouterAdapter {
    pools: HashMap<Pubkey, SwapPool>,
    routes: Arc<dyn RouteSource>,
}

impl SwapRouterAdapter {
    pub fn new<I>(pools: I, routes: Arc<dyn RouteSource>) -> Self
    where
        I: IntoIterator<Item = SwapPool>,
    {
        Self {
            pools: pools.into_iter().map(|pool| (pool.pool, pool)).collect(),
            routes,
        }
    }

    pub fn pool(&self, address: &Pubkey) -> Option<&SwapPool> {
        self.pools.get(address)
    }

    async fn build(
        &self,
        descriptor: &OperationDescriptor,
        context: &AdapterContext,
    ) -> AdapterResult<Vec<InstructionFragment>> {
        let kind = descriptor.kind();
        if kind != OperationKind::Swap {
            return Err(AdapterError::UnsupportedOperation {
                protocol: ProtocolId::SwapRouter,
                kind,
            });
        }
        if descriptor.amount() == 0 {
            return Err(AdapterError::InvalidAmount);
        }
        let direction = descriptor.direction().ok_or(AdapterError::MissingDirection)?;
        let pool = self
            .pools
            .get(descriptor.target())
            .ok_or(AdapterError::UnknownVault(*descriptor.target()))?;

        let plan = self
            .routes
            .route(pool, direction, descriptor.amount())
            .await?;
        debug!(
            target: "adapters::swap_router",
            pool = %pool.pool,
            direction = %direction,
            input_mint = %plan.input_mint,
            output_mint = %plan.output_mint,
            amount_in = plan.amount_in,
            minimum_amount_out = plan.minimum_amount_out,
            "路由完成"
        );

        Ok(swap_fragments(pool, &plan, &context.payer)?.into_fragments())
    }
}

fn swap_fragments(
    pool: &SwapPool,
    plan: &RoutePlan,
    owner: &Pubkey,
) -> AdapterResult<FragmentSequence> {
    let native_in = is_native_mint(&plan.input_mint);
    let native_out = is_native_mint(&plan.output_mint);
    let mut sequence = FragmentSequence::new();

    if native_in {
        sequence.extend(Phase::Setup, wrap_sequence(owner, plan.amount_in).iter().cloned());
    }
    sequence.push(
        Phase::Setup,
        create_associated_token_account_idempotent(
            owner,
            owner,
            &plan.output_mint,
            &plan.output_token_program,
        ),
    );
    sequence.push(Phase::Action, pool.swap_instruction(owner, plan)?);
    if native_in || native_out {
        sequence.extend(Phase::Cleanup, unwrap_sequence(owner).iter().cloned());
    }

    Ok(sequence)
}

impl ProtocolResolver for SwapRouterAdapter {
    type ResolveFuture<'a>
        = BoxFuture<'a, AdapterResult<Vec<InstructionFragment>>>
    where
        Self: 'a;

    fn protocol(&self) -> ProtocolId {
        ProtocolId::SwapRouter
    }

    fn resolve<'a>(
        &'a self,
        descriptor: &'a OperationDescriptor,
        context: &'a AdapterContext,
    ) -> Self::ResolveFuture<'a> {
        Box::pin(self.build(descriptor, context))
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::adapters::StaticRouteSource;
    use crate::engine::{OperationRequest, SwapDirection};
    use crate::instructions::discriminator::instruction_discriminator;
    use crate::instructions::token::SPL_TOKEN_PROGRAM_ID;
    use crate::instructions::wsol::WSOL_MINT;

    fn pool(mint_a: Pubkey) -> SwapPool {
        SwapPool {
            pool: Pubkey::new_unique(),
            program_id: Pubkey::new_unique(),
            authority: Pubkey::new_unique(),
            mint_a,
            mint_b: Pubkey::new_unique(),
            vault_a: Pubkey::new_unique(),
            vault_b: Pubkey::new_unique(),
            token_program_a: SPL_TOKEN_PROGRAM_ID,
            token_program_b: SPL_TOKEN_PROGRAM_ID,
        }
    }

    fn swap(pool: Pubkey, amount: u64, direction: Option<SwapDirection>) -> OperationDescriptor {
        let mut request = OperationRequest::new(ProtocolId::SwapRouter, pool, amount);
        request.direction = direction;
        OperationDescriptor::new(OperationKind::Swap, request)
    }

    struct QuotedRoute(u64);

    #[async_trait]
    impl RouteSource for QuotedRoute {
        async fn route(
            &self,
            pool: &SwapPool,
            direction: SwapDirection,
            amount_in: u64,
        ) -> AdapterResult<RoutePlan> {
            tokio::task::yield_now().await;
            Ok(RoutePlan::direct(pool, direction, amount_in, self.0))
        }
    }

    struct FailingRoute;

    #[async_trait]
    impl RouteSource for FailingRoute {
        async fn route(&self, _: &SwapPool, _: SwapDirection, _: u64) -> AdapterResult<RoutePlan> {
            Err(AdapterError::Route("报价服务不可用".to_string()))
        }
    }

    #[tokio::test(flavor = "current_thread")]
    async fn forward_swap_from_native_wraps_and_closes() {
        let pool = pool(WSOL_MINT);
        let address = pool.pool;
        let vault_b = pool.vault_b;
        let adapter = SwapRouterAdapter::new([pool], Arc::new(QuotedRoute(77)));
        let fragments = adapter
            .resolve(
                &swap(address, 5_000, Some(SwapDirection::Forward)),
                &AdapterContext::new(Pubkey::new_unique()),
            )
            .await
            .expect("swap fragments");

        // wrap(3) + 输出 ATA + swap + close
        assert_eq!(fragments.len(), 6);
        let action = fragments
            .iter()
            .find(|fragment| fragment.phase == Phase::Action)
            .expect("action");
        assert_eq!(&action.payload[..8], &instruction_discriminator("swap"));
        assert_eq!(&action.payload[8..16], &5_000u64.to_le_bytes());
        assert_eq!(&action.payload[16..24], &77u64.to_le_bytes());
        assert_eq!(action.payload[24], 1);
        assert_eq!(action.accounts[6].pubkey, vault_b);
        assert_eq!(fragments.last().map(|f| f.phase), Some(Phase::Cleanup));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn reverse_swap_between_tokens_has_no_cleanup() {
        let pool = pool(Pubkey::new_unique());
        let address = pool.pool;
        let vault_a = pool.vault_a;
        let adapter = SwapRouterAdapter::new([pool], Arc::new(StaticRouteSource));
        let fragments = adapter
            .resolve(
                &swap(address, 42, Some(SwapDirection::Reverse)),
                &AdapterContext::new(Pubkey::new_unique()),
            )
            .await
            .expect("swap fragments");
        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[1].payload[24], 0);
        assert_eq!(fragments[1].accounts[6].pubkey, vault_a);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn swap_requires_direction_and_known_pool() {
        let pool = pool(Pubkey::new_unique());
        let address = pool.pool;
        let adapter = SwapRouterAdapter::new([pool], Arc::new(StaticRouteSource));
        let ctx = AdapterContext::new(Pubkey::new_unique());

        let err = adapter
            .resolve(&swap(address, 1, None), &ctx)
            .await
            .expect_err("missing direction");
        assert!(matches!(err, AdapterError::MissingDirection));

        let err = adapter
            .resolve(
                &swap(Pubkey::new_unique(), 1, Some(SwapDirection::Forward)),
                &ctx,
            )
            .await
            .expect_err("unknown pool");
        assert!(matches!(err, AdapterError::UnknownVault(_)));

        let deposit = OperationDescriptor::new(
            OperationKind::Deposit,
            OperationRequest::new(ProtocolId::SwapRouter, address, 1),
        );
        let err = adapter.resolve(&deposit, &ctx).await.expect_err("deposit");
        assert!(matches!(err, AdapterError::UnsupportedOperation { .. }));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn route_failure_is_surfaced() {
        let pool = pool(Pubkey::new_unique());
        let address = pool.pool;
        let adapter = SwapRouterAdapter::new([pool], Arc::new(FailingRoute));
        let err = adapter
            .resolve(
                &swap(address, 1, Some(SwapDirection::Forward)),
                &AdapterContext::new(Pubkey::new_unique()),
            )
            .await
            .expect_err("route failure");
        assert!(matches!(err, AdapterError::Route(_)));
    }
}
