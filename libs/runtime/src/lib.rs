//! Process-level plumbing shared by the user-directory binaries:
//! layered configuration, logging bootstrap and shutdown signals.

pub mod config;
pub mod logging;
pub mod paths;
pub mod shutdown;

pub use config::{
    AppConfig, CliArgs, DatabaseConfig, Environment, LoggingConfig, Section, ServerConfig,
};
