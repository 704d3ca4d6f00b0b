mod dry_run;
pub mod error;
mod rpc;
mod stack;

pub use dry_run::DryRunSubmitter;
pub use error::{LanderError, SubmissionFailure};
pub use rpc::RpcSubmitter;
pub use stack::{LanderReceipt, UnitSubmitter, serialized_size, sign_unit, submit_all};
