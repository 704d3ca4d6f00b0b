use super::fragment::InstructionFragment;
use super::operation::OperationDescriptor;
use super::unit::TransactionUnit;

/// 已加入会话、等待分批的单个操作。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingOperation {
    descriptor: OperationDescriptor,
    fragments: Vec<InstructionFragment>,
}

impl PendingOperation {
    pub fn new(descriptor: OperationDescriptor, fragments: Vec<InstructionFragment>) -> Self {
        Self {
            descriptor,
            fragments,
        }
    }

    pub fn descriptor(&self) -> &OperationDescriptor {
        &self.descriptor
    }

    /// 适配器产出时的原始顺序。
    pub fn fragments(&self) -> &[InstructionFragment] {
        &self.fragments
    }

    /// Setup → Action → Cleanup，阶段内按 ordinal，排序稳定。
    pub fn ordered_fragments(&self) -> Vec<InstructionFragment> {
        let mut ordered = self.fragments.clone();
        ordered.sort_by_key(|fragment| (fragment.phase, fragment.ordinal));
        ordered
    }

    pub fn payload_bytes(&self) -> usize {
        self.fragments
            .iter()
            .map(|fragment| fragment.payload.len())
            .sum()
    }
}

/// 一次 builder 生命周期内的累积状态，只追加。
#[derive(Debug, Default)]
pub struct BuilderSession {
    operations: Vec<PendingOperation>,
    finalized: Option<Vec<TransactionUnit>>,
}

impl BuilderSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn operations(&self) -> &[PendingOperation] {
        &self.operations
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn fragment_count(&self) -> usize {
        self.operations
            .iter()
            .map(|operation| operation.fragments.len())
            .sum()
    }

    /// 追加操作并返回其序号。已 finalize 的结果随之失效。
    pub(crate) fn append(&mut self, operation: PendingOperation) -> usize {
        self.finalized = None;
        self.operations.push(operation);
        self.operations.len() - 1
    }

    pub(crate) fn store_units(&mut self, units: Vec<TransactionUnit>) {
        self.finalized = Some(units);
    }

    pub(crate) fn clear_units(&mut self) {
        self.finalized = None;
    }

    pub fn units(&self) -> Option<&[TransactionUnit]> {
        self.finalized.as_deref()
    }

    pub(crate) fn into_units(self) -> Option<Vec<TransactionUnit>> {
        self.finalized
    }
}
