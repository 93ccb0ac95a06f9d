// Service modules
pub mod args;
pub mod http_server;
pub mod process;
pub mod service_config;
pub mod service_state;

// Re-exports for the binary and integration tests
pub use process::{init_logging, spawn_service};
pub use service_config::Config as ServiceConfig;
pub use service_state::State as ServiceState;
