use std::sync::Arc;
use std::time::Instant;

use solana_sdk::pubkey::Pubkey;
use tracing::{debug, info};

use crate::adapters::{AdapterContext, AdapterError, AdapterRegistry};
use crate::config::BuilderSettings;
use crate::monitoring::events;

use super::assembly::UnitEnvelope;
use super::error::{GatewayError, GatewayResult};
use super::fragment::InstructionFragment;
use super::operation::{OperationDescriptor, OperationKind, OperationRequest};
use super::partition::{BatchPartitioner, TransactionLimits};
use super::session::{BuilderSession, PendingOperation};
use super::unit::TransactionUnit;

/// 对外入口：按协议分派操作、累积片段，finalize 时装箱为交易单元。
///
/// 操作方法都要求 `&mut self`，同一会话的调用天然串行；需要跨任务共享时使用
/// [`SharedGatewayBuilder`](super::SharedGatewayBuilder)。
pub struct GatewayBuilder {
    registry: Arc<AdapterRegistry>,
    payer: Pubkey,
    limits: TransactionLimits,
    envelope: UnitEnvelope,
    session: BuilderSession,
}

impl GatewayBuilder {
    pub fn new(registry: Arc<AdapterRegistry>, payer: Pubkey) -> Self {
        Self {
            registry,
            payer,
            limits: TransactionLimits::default(),
            envelope: UnitEnvelope::default(),
            session: BuilderSession::new(),
        }
    }

    pub fn from_settings(
        registry: Arc<AdapterRegistry>,
        payer: Pubkey,
        limits: TransactionLimits,
        settings: &BuilderSettings,
    ) -> Self {
        let envelope = UnitEnvelope::new(
            settings.compute_unit_limit,
            settings.compute_unit_price_micro_lamports,
            settings.memo(),
        );
        Self::new(registry, payer)
            .with_limits(limits)
            .with_envelope(envelope)
    }

    pub fn with_limits(mut self, limits: TransactionLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_envelope(mut self, envelope: UnitEnvelope) -> Self {
        self.envelope = envelope;
        self
    }

    pub fn payer(&self) -> &Pubkey {
        &self.payer
    }

    pub fn limits(&self) -> &TransactionLimits {
        &self.limits
    }

    pub fn session(&self) -> &BuilderSession {
        &self.session
    }

    pub async fn deposit(&mut self, request: OperationRequest) -> GatewayResult<usize> {
        self.append(OperationKind::Deposit, request).await
    }

    pub async fn withdraw(&mut self, request: OperationRequest) -> GatewayResult<usize> {
        self.append(OperationKind::Withdraw, request).await
    }

    pub async fn swap(&mut self, request: OperationRequest) -> GatewayResult<usize> {
        self.append(OperationKind::Swap, request).await
    }

    /// 分派到协议适配器并把结果追加到会话，返回该操作的序号。
    pub async fn append(
        &mut self,
        kind: OperationKind,
        request: OperationRequest,
    ) -> GatewayResult<usize> {
        let descriptor = OperationDescriptor::new(kind, request);
        match self.resolve(&descriptor).await {
            Ok(fragments) => {
                let fragment_count = fragments.len();
                let index = self
                    .session
                    .append(PendingOperation::new(descriptor, fragments));
                events::operation_appended(index, &descriptor, fragment_count);
                Ok(index)
            }
            Err(err) => {
                events::operation_rejected(&descriptor, &err);
                Err(err)
            }
        }
    }

    async fn resolve(
        &self,
        descriptor: &OperationDescriptor,
    ) -> GatewayResult<Vec<InstructionFragment>> {
        let operation = self.session.len();
        let adapter_error = |source: AdapterError| GatewayError::Adapter {
            operation,
            protocol: descriptor.protocol(),
            kind: descriptor.kind(),
            source,
        };

        let adapter = self
            .registry
            .get(descriptor.protocol())
            .ok_or(GatewayError::UnsupportedProtocol(descriptor.protocol()))?;
        if descriptor.amount() == 0 {
            return Err(adapter_error(AdapterError::InvalidAmount));
        }

        let context = AdapterContext::new(self.payer);
        let fragments = adapter
            .resolve(descriptor, &context)
            .await
            .map_err(adapter_error)?;
        if fragments.is_empty() {
            return Err(adapter_error(AdapterError::NoFragments));
        }

        debug!(
            target: "engine::builder",
            operation,
            protocol = %descriptor.protocol(),
            kind = %descriptor.kind(),
            target_account = %descriptor.target(),
            fragments = fragments.len(),
            "适配器返回指令片段"
        );
        Ok(fragments)
    }

    /// 对当前会话装箱。成功时结果缓存在会话中；失败时不暴露任何单元。
    pub fn finalize(&mut self) -> GatewayResult<&[TransactionUnit]> {
        if self.session.is_empty() {
            return Err(GatewayError::EmptySession);
        }

        let started = Instant::now();
        let partitioner = BatchPartitioner::new(self.payer, self.limits, &self.envelope);
        match partitioner.partition(self.session.operations()) {
            Ok(units) => {
                info!(
                    target: "engine::builder",
                    operations = self.session.len(),
                    units = units.len(),
                    "会话 finalize 完成"
                );
                events::session_finalized(self.session.len(), units.len(), started.elapsed());
                self.session.store_units(units);
                self.transactions()
            }
            Err(err) => {
                self.session.clear_units();
                Err(err)
            }
        }
    }

    /// finalize 之后的交易单元，顺序即提交顺序。
    pub fn transactions(&self) -> GatewayResult<&[TransactionUnit]> {
        self.session.units().ok_or(GatewayError::NotFinalized)
    }

    /// 取出交易单元并结束会话。
    pub fn into_transactions(self) -> GatewayResult<Vec<TransactionUnit>> {
        let Self { session, .. } = self;
        session.into_units().ok_or(GatewayError::NotFinalized)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::adapters::{
        AdapterResult, RoutePlan, RouteSource, StakeVaultAdapter, StakeVaultMarket,
        StaticRouteSource, SwapPool, SwapRouterAdapter,
    };
    use crate::engine::{Phase, ProtocolId, SwapDirection};
    use crate::instructions::token::SPL_TOKEN_PROGRAM_ID;
    use crate::instructions::wsol::WSOL_MINT;

    struct Fixture {
        registry: Arc<AdapterRegistry>,
        vault: Pubkey,
        pool: Pubkey,
    }

    fn fixture(with_swap: bool) -> Fixture {
        let market = StakeVaultMarket {
            vault: Pubkey::new_unique(),
            program_id: Pubkey::new_unique(),
            authority: Pubkey::new_unique(),
            reserve: Pubkey::new_unique(),
            share_mint: Pubkey::new_unique(),
            deposit_mint: WSOL_MINT,
            token_program: SPL_TOKEN_PROGRAM_ID,
        };
        let pool = SwapPool {
            pool: Pubkey::new_unique(),
            program_id: Pubkey::new_unique(),
            authority: Pubkey::new_unique(),
            mint_a: market.share_mint,
            mint_b: Pubkey::new_unique(),
            vault_a: Pubkey::new_unique(),
            vault_b: Pubkey::new_unique(),
            token_program_a: SPL_TOKEN_PROGRAM_ID,
            token_program_b: SPL_TOKEN_PROGRAM_ID,
        };
        let vault = market.vault;
        let pool_address = pool.pool;

        let mut registry = AdapterRegistry::new();
        registry.register(StakeVaultAdapter::new([market]));
        if with_swap {
            registry.register(SwapRouterAdapter::new([pool], Arc::new(StaticRouteSource)));
        }
        Fixture {
            registry: Arc::new(registry),
            vault,
            pool: pool_address,
        }
    }

    fn builder(fixture: &Fixture) -> GatewayBuilder {
        GatewayBuilder::new(fixture.registry.clone(), Pubkey::new_unique())
    }

    #[tokio::test(flavor = "current_thread")]
    async fn unregistered_protocol_is_rejected_before_dispatch() {
        let fixture = fixture(false);
        let mut builder = builder(&fixture);
        let err = builder
            .swap(
                OperationRequest::new(ProtocolId::SwapRouter, fixture.pool, 10)
                    .with_direction(SwapDirection::Forward),
            )
            .await
            .expect_err("swap router is not registered");
        assert!(matches!(
            err,
            GatewayError::UnsupportedProtocol(ProtocolId::SwapRouter)
        ));
        assert!(builder.session().is_empty());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn zero_amount_is_an_adapter_error() {
        let fixture = fixture(true);
        let mut builder = builder(&fixture);
        let err = builder
            .deposit(OperationRequest::new(ProtocolId::StakeVault, fixture.vault, 0))
            .await
            .expect_err("zero amount");
        assert!(matches!(
            err,
            GatewayError::Adapter {
                operation: 0,
                source: AdapterError::InvalidAmount,
                ..
            }
        ));
        assert!(builder.session().is_empty());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn unknown_vault_reports_failing_operation() {
        let fixture = fixture(true);
        let mut builder = builder(&fixture);
        builder
            .deposit(OperationRequest::new(ProtocolId::StakeVault, fixture.vault, 5))
            .await
            .expect("first deposit");
        let err = builder
            .withdraw(OperationRequest::new(
                ProtocolId::StakeVault,
                Pubkey::new_unique(),
                5,
            ))
            .await
            .expect_err("unknown vault");
        match err {
            GatewayError::Adapter {
                operation,
                kind,
                source: AdapterError::UnknownVault(_),
                ..
            } => {
                assert_eq!(operation, 1);
                assert_eq!(kind, OperationKind::Withdraw);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(builder.session().len(), 1);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn sequencing_misuse_is_reported() {
        let fixture = fixture(true);
        let mut builder = builder(&fixture);
        assert!(matches!(
            builder.transactions(),
            Err(GatewayError::NotFinalized)
        ));
        assert!(matches!(builder.finalize(), Err(GatewayError::EmptySession)));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn finalize_is_idempotent_and_invalidated_by_append() {
        let fixture = fixture(true);
        let mut builder = builder(&fixture);
        builder
            .deposit(OperationRequest::new(ProtocolId::StakeVault, fixture.vault, 1_000))
            .await
            .expect("deposit");

        let first = builder.finalize().expect("finalize").to_vec();
        let second = builder.finalize().expect("finalize again").to_vec();
        assert_eq!(first, second);
        assert_eq!(builder.transactions().expect("units"), first.as_slice());

        builder
            .withdraw(OperationRequest::new(ProtocolId::StakeVault, fixture.vault, 1_000))
            .await
            .expect("withdraw");
        assert!(matches!(
            builder.transactions(),
            Err(GatewayError::NotFinalized)
        ));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn mixed_session_preserves_operation_order() {
        let fixture = fixture(true);
        let mut builder = builder(&fixture);
        builder
            .deposit(OperationRequest::new(ProtocolId::StakeVault, fixture.vault, 1_000))
            .await
            .expect("deposit");
        builder
            .swap(
                OperationRequest::new(ProtocolId::SwapRouter, fixture.pool, 500)
                    .with_direction(SwapDirection::Forward),
            )
            .await
            .expect("swap");

        let expected: Vec<_> = builder
            .session()
            .operations()
            .iter()
            .flat_map(|operation| operation.ordered_fragments())
            .collect();
        let limits = *builder.limits();
        let units = builder.finalize().expect("finalize");
        let produced: Vec<_> = units
            .iter()
            .flat_map(|unit| unit.fragments().iter().cloned())
            .collect();
        assert_eq!(produced, expected);

        let operations: Vec<_> = units
            .iter()
            .flat_map(|unit| unit.operations().iter().copied())
            .collect();
        assert_eq!(operations, vec![0, 1]);
        for unit in units {
            assert!(unit.estimated_bytes() <= limits.max_transaction_bytes);
            assert!(unit.account_count() <= limits.max_accounts);
            let first_action = unit
                .fragments()
                .iter()
                .position(|fragment| fragment.phase == Phase::Action);
            assert!(first_action.is_some());
        }
    }

    #[tokio::test(flavor = "current_thread")]
    async fn oversized_operation_fails_finalize_without_units() {
        let fixture = fixture(true);
        let mut builder = builder(&fixture).with_limits(TransactionLimits::new(400, 64));
        builder
            .deposit(OperationRequest::new(ProtocolId::StakeVault, fixture.vault, 1_000))
            .await
            .expect("deposit");
        let err = builder.finalize().expect_err("too large");
        assert!(matches!(err, GatewayError::Partition { operation: 0, .. }));
        assert!(err.is_fatal_for_session());
        assert!(matches!(
            builder.transactions(),
            Err(GatewayError::NotFinalized)
        ));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn registry_is_consulted_once_per_operation() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);

        struct CountingRoute;

        #[async_trait::async_trait]
        impl RouteSource for CountingRoute {
            async fn route(
                &self,
                pool: &SwapPool,
                direction: SwapDirection,
                amount_in: u64,
            ) -> AdapterResult<RoutePlan> {
                CALLS.fetch_add(1, Ordering::SeqCst);
                Ok(RoutePlan::direct(pool, direction, amount_in, 1))
            }
        }

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
        registry.register(SwapRouterAdapter::new([pool], Arc::new(CountingRoute)));
        let mut builder = GatewayBuilder::new(Arc::new(registry), Pubkey::new_unique());

        for direction in [SwapDirection::Forward, SwapDirection::Reverse] {
            builder
                .swap(OperationRequest::new(ProtocolId::SwapRouter, address, 9).with_direction(direction))
                .await
                .expect("swap");
        }
        builder.finalize().expect("finalize");
        builder.finalize().expect("finalize again");
        assert_eq!(CALLS.load(Ordering::SeqCst), 2);
    }
}
