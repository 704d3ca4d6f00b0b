pub mod compute_budget;
pub mod discriminator;
pub mod memo;
pub mod token;
pub mod wsol;
