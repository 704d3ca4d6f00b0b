use dashmap::DashMap;
use once_cell::sync::Lazy;
use smallvec::SmallVec;
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;

pub const COMPUTE_BUDGET_PROGRAM_ID: Pubkey =
    solana_sdk::pubkey!("ComputeBudget111111111111111111111111111111");

const SET_COMPUTE_UNIT_LIMIT: u8 = 2;
const SET_COMPUTE_UNIT_PRICE: u8 = 3;

pub type BudgetInstructions = SmallVec<[Instruction; 2]>;

/// 每笔交易前置的 compute budget 设置，0 表示不下发对应指令。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ComputeBudget {
    pub unit_limit: u32,
    pub unit_price_micro_lamports: u64,
}

static ENCODED: Lazy<DashMap<ComputeBudget, BudgetInstructions>> = Lazy::new(DashMap::new);

impl ComputeBudget {
    pub fn new(unit_limit: u32, unit_price_micro_lamports: u64) -> Self {
        Self {
            unit_limit,
            unit_price_micro_lamports,
        }
    }

    pub fn is_unset(&self) -> bool {
        self.unit_limit == 0 && self.unit_price_micro_lamports == 0
    }

    /// price 在前、limit 在后；同一组取值只编码一次。
    pub fn instructions(&self) -> BudgetInstructions {
        if let Some(encoded) = ENCODED.get(self) {
            return encoded.clone();
        }

        let mut encoded = BudgetInstructions::new();
        if self.unit_price_micro_lamports > 0 {
            encoded.push(budget_instruction(
                SET_COMPUTE_UNIT_PRICE,
                &self.unit_price_micro_lamports.to_le_bytes(),
            ));
        }
        if self.unit_limit > 0 {
            encoded.push(budget_instruction(
                SET_COMPUTE_UNIT_LIMIT,
                &self.unit_limit.to_le_bytes(),
            ));
        }
        ENCODED.insert(*self, encoded.clone());
        encoded
    }
}

fn budget_instruction(opcode: u8, value: &[u8]) -> Instruction {
    let mut data = Vec::with_capacity(1 + value.len());
    data.push(opcode);
    data.extend_from_slice(value);
    Instruction {
        program_id: COMPUTE_BUDGET_PROGRAM_ID,
        accounts: Vec::new(),
        data,
    }
}
