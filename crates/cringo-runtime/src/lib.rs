//! CRINGO! Runtime - hosting layer for CRINGO! games.
//!
//! This crate provides:
//! - Layered configuration (`CringoConfig`, `ConfigLoader`)
//! - Logging initialisation (`LoggingBuilder`)
//! - The `!cringo [size] [min_balance]` command ([`parse_command`])
//! - One game per channel ([`GameRegistry`])
//! - Event routing and game spawning ([`CringoRuntime`])
//!
//! A platform adapter implements the collaborator traits from
//! `cringo-framework`, converts its gateway events into [`InboundEvent`]s and
//! hands them to the runtime:
//!
//! ```ignore
//! use cringo_runtime::CringoRuntime;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let services = GameServices::new(messenger, ledger, moderation, PlayingRoster::new());
//!     let runtime = CringoRuntime::builder().build(services)?;
//!
//!     let (tx, rx) = tokio::sync::mpsc::channel(256);
//!     adapter.forward_events(tx);
//!
//!     // Run until the adapter disconnects or Ctrl+C
//!     runtime.run(rx).await?;
//!     Ok(())
//! }
//! ```
//!
//! [`InboundEvent`]: cringo_core::InboundEvent

pub mod command;
pub mod config;
pub mod error;
pub mod logging;
pub mod registry;
pub mod runtime;

// Re-exports
pub use command::{StartCommand, parse_command};
pub use config::{
    ConfigError, ConfigLoader, ConfigResult, CringoConfig, GameConfig, LoggingConfig,
    PayoutConfig,
};
pub use error::{CommandError, RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents};
pub use registry::{GameLease, GameRecord, GameRegistry, RegistryStats};
pub use runtime::{CringoRuntime, GameHandle, RuntimeBuilder};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Prelude module for convenient imports.
///
/// This provides the commonly used logging macros:
/// - `trace!`, `debug!`, `info!`, `warn!`, `error!`
/// - `span`, `event`
/// - `instrument` attribute
/// - `Level` for span creation
pub mod prelude {
    pub use tracing::{Level, debug, error, event, info, instrument, span, trace, warn};
}
