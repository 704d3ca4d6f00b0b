pub mod assembly;
mod builder;
mod error;
mod fragment;
mod identity;
mod operation;
mod partition;
mod session;
mod shared;
mod unit;

pub use assembly::{AccountConflict, AccountTable, UnitEnvelope, WireFootprint};
pub use builder::GatewayBuilder;
pub use error::{GatewayError, GatewayResult};
pub use fragment::{AccountRef, FragmentSequence, InstructionFragment, Phase};
pub use identity::{EngineIdentity, PRIVATE_KEY_ENV, parse_keypair_string};
pub use operation::{
    OperationDescriptor, OperationKind, OperationRequest, ProtocolId, SwapDirection, VaultId,
};
pub use partition::{BatchPartitioner, MAX_TX_ACCOUNT_LOCKS, PACKET_DATA_SIZE, TransactionLimits};
pub use session::{BuilderSession, PendingOperation};
pub use shared::SharedGatewayBuilder;
pub use unit::TransactionUnit;
