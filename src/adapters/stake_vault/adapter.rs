use std::collections::HashMap;
use std::future::{Ready, ready};

use solana_sdk::pubkey::Pubkey;

use crate::adapters::{AdapterContext, AdapterError, AdapterResult, ProtocolResolver};
use crate::engine::{
    FragmentSequence, InstructionFragment, OperationDescriptor, OperationKind, Phase, ProtocolId,
};
use crate::instructions::token::{SPL_TOKEN_PROGRAM_ID, create_associated_token_account_idempotent};
use crate::instructions::wsol::{WSOL_MINT, unwrap_sequence, wrap_sequence};

use super::market::StakeVaultMarket;

/// 流动性质押金库适配器：支持存入与赎回，指令完全由本地元数据推导。
pub struct StakeVaultAdapter {
    markets: HashMap<Pubkey, StakeVaultMarket>,
}

impl StakeVaultAdapter {
    pub fn new<I>(markets: I) -> Self
    where
        I: IntoIterator<Item = StakeVaultMarket>,
    {
        Self {
            markets: markets
                .into_iter()
                .map(|market| (market.vault, market))
                .collect(),
        }
    }

    pub fn market(&self, vault: &Pubkey) -> Option<&StakeVaultMarket> {
        self.markets.get(vault)
    }

    fn build(
        &self,
        descriptor: &OperationDescriptor,
        context: &AdapterContext,
    ) -> AdapterResult<Vec<InstructionFragment>> {
        if descriptor.amount() == 0 {
            return Err(AdapterError::InvalidAmount);
        }
        let market = self
            .markets
            .get(descriptor.target())
            .ok_or(AdapterError::UnknownVault(*descriptor.target()))?;

        let owner = context.payer;
        let amount = descriptor.amount();
        let mut sequence = FragmentSequence::new();

        match descriptor.kind() {
            OperationKind::Deposit => {
                if market.accepts_native() {
                    sequence.extend(Phase::Setup, wrap_sequence(&owner, amount).iter().cloned());
                }
                sequence.push(
                    Phase::Setup,
                    create_associated_token_account_idempotent(
                        &owner,
                        &owner,
                        &market.share_mint,
                        &market.token_program,
                    ),
                );
                sequence.push(Phase::Action, market.deposit_instruction(&owner, amount)?);
            }
            OperationKind::Withdraw => {
                let destination = if market.accepts_native() {
                    create_associated_token_account_idempotent(
                        &owner,
                        &owner,
                        &WSOL_MINT,
                        &SPL_TOKEN_PROGRAM_ID,
                    )
                } else {
                    create_associated_token_account_idempotent(
                        &owner,
                        &owner,
                        &market.deposit_mint,
                        &market.token_program,
                    )
                };
                sequence.push(Phase::Setup, destination);
                sequence.push(Phase::Action, market.withdraw_instruction(&owner, amount)?);
            }
            kind @ OperationKind::Swap => {
                return Err(AdapterError::UnsupportedOperation {
                    protocol: ProtocolId::StakeVault,
                    kind,
                });
            }
        }

        if market.accepts_native() {
            sequence.extend(Phase::Cleanup, unwrap_sequence(&owner).iter().cloned());
        }

        Ok(sequence.into_fragments())
    }
}

impl ProtocolResolver for StakeVaultAdapter {
    type ResolveFuture<'a>
        = Ready<AdapterResult<Vec<InstructionFragment>>>
    where
        Self: 'a;

    fn protocol(&self) -> ProtocolId {
        ProtocolId::StakeVault
    }

    fn resolve<'a>(
        &'a self,
        descriptor: &'a OperationDescriptor,
        context: &'a AdapterContext,
    ) -> Self::ResolveFuture<'a> {
        ready(self.build(descriptor, context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::OperationRequest;
    use crate::instructions::discriminator::instruction_discriminator;
    use crate::instructions::wsol::wsol_account;

    fn market(deposit_mint: Pubkey) -> StakeVaultMarket {
        StakeVaultMarket {
            vault: Pubkey::new_unique(),
            program_id: Pubkey::new_unique(),
            authority: Pubkey::new_unique(),
            reserve: Pubkey::new_unique(),
            share_mint: Pubkey::new_unique(),
            deposit_mint,
            token_program: SPL_TOKEN_PROGRAM_ID,
        }
    }

    fn descriptor(kind: OperationKind, vault: Pubkey, amount: u64) -> OperationDescriptor {
        OperationDescriptor::new(
            kind,
            OperationRequest::new(ProtocolId::StakeVault, vault, amount),
        )
    }

    #[tokio::test(flavor = "current_thread")]
    async fn native_deposit_wraps_then_unwraps() {
        let market = market(WSOL_MINT);
        let vault = market.vault;
        let program = market.program_id;
        let adapter = StakeVaultAdapter::new([market]);
        let payer = Pubkey::new_unique();

        let fragments = adapter
            .resolve(
                &descriptor(OperationKind::Deposit, vault, 2_000_000),
                &AdapterContext::new(payer),
            )
            .await
            .expect("deposit fragments");

        let phases: Vec<_> = fragments.iter().map(|f| f.phase).collect();
        assert_eq!(
            phases,
            vec![
                Phase::Setup,
                Phase::Setup,
                Phase::Setup,
                Phase::Setup,
                Phase::Action,
                Phase::Cleanup,
            ]
        );
        let action = &fragments[4];
        assert_eq!(action.program_id, program);
        assert_eq!(&action.payload[..8], &instruction_discriminator("deposit"));
        assert_eq!(&action.payload[8..16], &2_000_000u64.to_le_bytes());
        assert!(
            action
                .accounts
                .iter()
                .any(|account| account.pubkey == wsol_account(&payer) && account.writable)
        );
    }

    #[tokio::test(flavor = "current_thread")]
    async fn token_withdraw_creates_destination_only() {
        let market = market(Pubkey::new_unique());
        let vault = market.vault;
        let adapter = StakeVaultAdapter::new([market]);

        let fragments = adapter
            .resolve(
                &descriptor(OperationKind::Withdraw, vault, 10),
                &AdapterContext::new(Pubkey::new_unique()),
            )
            .await
            .expect("withdraw fragments");
        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0].phase, Phase::Setup);
        assert_eq!(
            &fragments[1].payload[..8],
            &instruction_discriminator("withdraw")
        );
    }

    #[tokio::test(flavor = "current_thread")]
    async fn rejects_unknown_vault_and_swap() {
        let market = market(Pubkey::new_unique());
        let vault = market.vault;
        let adapter = StakeVaultAdapter::new([market]);
        let ctx = AdapterContext::new(Pubkey::new_unique());

        let unknown = Pubkey::new_unique();
        let err = adapter
            .resolve(&descriptor(OperationKind::Deposit, unknown, 1), &ctx)
            .await
            .expect_err("unknown vault");
        assert!(matches!(err, AdapterError::UnknownVault(key) if key == unknown));

        let err = adapter
            .resolve(&descriptor(OperationKind::Swap, vault, 1), &ctx)
            .await
            .expect_err("swap unsupported");
        assert!(matches!(
            err,
            AdapterError::UnsupportedOperation {
                kind: OperationKind::Swap,
                ..
            }
        ));
    }
}
