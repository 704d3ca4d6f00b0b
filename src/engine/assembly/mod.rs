pub mod accounts;
pub mod envelope;
pub mod wire;

pub use accounts::{AccountConflict, AccountTable};
pub use envelope::UnitEnvelope;
pub use wire::WireFootprint;
