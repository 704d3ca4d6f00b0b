use async_trait::async_trait;
use solana_sdk::instruction::AccountMeta;
use solana_sdk::pubkey::Pubkey;

use crate::adapters::AdapterResult;
use crate::engine::SwapDirection;

use super::pool::SwapPool;

/// 一次兑换的路由结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePlan {
    pub direction: SwapDirection,
    pub input_mint: Pubkey,
    pub output_mint: Pubkey,
    pub input_vault: Pubkey,
    pub output_vault: Pubkey,
    pub input_token_program: Pubkey,
    pub output_token_program: Pubkey,
    pub amount_in: u64,
    pub minimum_amount_out: u64,
    /// 追加在固定账户之后的额外账户（多跳、预言机等）。
    pub remaining_accounts: Vec<AccountMeta>,
}

impl RoutePlan {
    /// 只经过单个池子的直连路由。
    pub fn direct(
        pool: &SwapPool,
        direction: SwapDirection,
        amount_in: u64,
        minimum_amount_out: u64,
    ) -> Self {
        let ((input_mint, input_vault, input_token_program), (output_mint, output_vault, output_token_program)) =
            pool.sides(direction);
        Self {
            direction,
            input_mint,
            output_mint,
            input_vault,
            output_vault,
            input_token_program,
            output_token_program,
            amount_in,
            minimum_amount_out,
            remaining_accounts: Vec::new(),
        }
    }
}

/// 路由来源：可以是本地静态推导，也可以是外部报价服务。
#[async_trait]
pub trait RouteSource: Send + Sync {
    async fn route(
        &self,
        pool: &SwapPool,
        direction: SwapDirection,
        amount_in: u64,
    ) -> AdapterResult<RoutePlan>;
}

/// 不做报价，直连池子且最小输出为 0。
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticRouteSource;

#[async_trait]
impl RouteSource for StaticRouteSource {
    async fn route(
        &self,
        pool: &SwapPool,
        direction: SwapDirection,
        amount_in: u64,
    ) -> AdapterResult<RoutePlan> {
        Ok(RoutePlan::direct(pool, direction, amount_in, 0))
    }
}
