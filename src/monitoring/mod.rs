pub mod events;
pub mod metrics;

pub use self::metrics::{init_from_config, prometheus_enabled, try_init_prometheus};
