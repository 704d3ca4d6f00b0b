use serde::Serialize;
use serde_with::{DisplayFromStr, serde_as};
use solana_sdk::pubkey::Pubkey;

use crate::engine::{Phase, TransactionUnit};
use crate::lander::LanderReceipt;

#[serde_as]
#[derive(Debug, Serialize)]
pub struct UnitSummary {
    pub index: usize,
    pub operations: Vec<usize>,
    pub instructions: usize,
    pub setup: usize,
    pub action: usize,
    pub cleanup: usize,
    pub accounts: usize,
    pub signers: usize,
    pub estimated_bytes: usize,
    #[serde_as(as = "Vec<DisplayFromStr>")]
    pub programs: Vec<Pubkey>,
}

impl UnitSummary {
    pub fn from_unit(index: usize, unit: &TransactionUnit) -> Self {
        let count = |phase: Phase| {
            unit.fragments()
                .iter()
                .filter(|fragment| fragment.phase == phase)
                .count()
        };
        let mut programs = Vec::new();
        for instruction in unit.instructions() {
            if !programs.contains(&instruction.program_id) {
                programs.push(instruction.program_id);
            }
        }
        Self {
            index,
            operations: unit.operations().to_vec(),
            instructions: unit.instructions().len(),
            setup: count(Phase::Setup),
            action: count(Phase::Action),
            cleanup: count(Phase::Cleanup),
            accounts: unit.account_count(),
            signers: unit.accounts().iter().filter(|account| account.signer).count(),
            estimated_bytes: unit.estimated_bytes(),
            programs,
        }
    }
}

#[serde_as]
#[derive(Debug, Serialize)]
pub struct ReceiptSummary {
    pub unit: usize,
    pub lander: &'static str,
    #[serde_as(as = "DisplayFromStr")]
    pub signature: solana_sdk::signature::Signature,
    #[serde_as(as = "DisplayFromStr")]
    pub blockhash: solana_sdk::hash::Hash,
    pub serialized_bytes: usize,
}

impl From<&LanderReceipt> for ReceiptSummary {
    fn from(receipt: &LanderReceipt) -> Self {
        Self {
            unit: receipt.unit_index,
            lander: receipt.lander,
            signature: receipt.signature,
            blockhash: receipt.blockhash,
            serialized_bytes: receipt.serialized_bytes,
        }
    }
}

pub fn summarize(units: &[TransactionUnit]) -> Vec<UnitSummary> {
    units
        .iter()
        .enumerate()
        .map(|(index, unit)| UnitSummary::from_unit(index, unit))
        .collect()
}
