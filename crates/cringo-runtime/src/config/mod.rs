//! Configuration for the CRINGO! runtime.
//!
//! This module provides layered loading (defaults, files, `CRINGO_*`
//! environment variables) and validation of the logging, game and payout
//! settings.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    CringoConfig, GameConfig, LogFormat, LogLevel, LogOutput, LoggingConfig, PayoutConfig,
    SpanEventConfig,
};
pub use validation::validate_config;
