use solana_sdk::instruction::Instruction;

use crate::instructions::compute_budget::ComputeBudget;
use crate::instructions::memo::memo_instruction;

/// 每笔交易都会携带的外层指令：前置 compute budget，末尾 memo。
/// 它们占用交易空间，但不属于任何操作。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitEnvelope {
    pub budget: ComputeBudget,
    pub leading: Vec<Instruction>,
    pub trailing: Vec<Instruction>,
}

impl UnitEnvelope {
    pub fn new(compute_unit_limit: u32, compute_unit_price: u64, memo: Option<&str>) -> Self {
        let budget = ComputeBudget::new(compute_unit_limit, compute_unit_price);
        let leading = budget.instructions().into_vec();
        let trailing = memo
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(memo_instruction)
            .into_iter()
            .collect();
        Self {
            budget,
            leading,
            trailing,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.leading.is_empty() && self.trailing.is_empty()
    }

    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.leading.iter().chain(self.trailing.iter())
    }

    /// 按照 compute → body → memo 的顺序拼接。
    pub fn wrap<I>(&self, body: I) -> Vec<Instruction>
    where
        I: IntoIterator<Item = Instruction>,
    {
        let body = body.into_iter();
        let mut combined =
            Vec::with_capacity(self.leading.len() + body.size_hint().0 + self.trailing.len());
        combined.extend(self.leading.iter().cloned());
        combined.extend(body);
        combined.extend(self.trailing.iter().cloned());
        combined
    }
}
