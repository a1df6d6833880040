//! Configuration module for the Trellis runtime.
//!
//! Figment-based layered configuration for the application mount, session
//! page store, and logging.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, load_config, load_config_from_file};
pub use schema::{
    ApplicationConfig, LogFormat, LogLevel, LogOutput, LoggingConfig, SpanEventConfig,
    StoreConfig, TrellisConfig,
};
pub use validation::validate_config;
