pub mod adapter;
pub mod market;

pub use adapter::StakeVaultAdapter;
pub use market::StakeVaultMarket;
