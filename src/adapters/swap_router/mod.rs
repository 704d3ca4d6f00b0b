pub mod adapter;
pub mod pool;
pub mod route;

pub use adapter::SwapRouterAdapter;
pub use pool::SwapPool;
pub use route::{RoutePlan, RouteSource, StaticRouteSource};
