//! Infrastructure concerns: configuration and logging

pub mod config;
pub mod logging;

pub use config::DeployConfig;
pub use logging::init_logging;
