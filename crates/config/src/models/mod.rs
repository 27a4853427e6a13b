pub mod api_observability;
pub mod app_config;
pub mod store;

pub use api_observability::*;
pub use app_config::*;
pub use store::*;
