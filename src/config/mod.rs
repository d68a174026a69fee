//! # Dispatch Configuration
//!
//! Settings for the handler dispatch stage.
//!
//! ## Sources
//!
//! Layered with the `config` crate, later sources overriding earlier ones:
//! 1. built-in defaults ([`DispatchConfig::default`])
//! 2. an optional TOML/YAML/JSON file
//! 3. `COURIER__`-prefixed environment variables, e.g.
//!    `COURIER__CHAIN_RESET=inherited`
//!
//! ## Usage
//!
//! ```rust,no_run
//! use courier_core::config::ConfigLoader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigLoader::new().with_file("config/dispatch.toml").load()?;
//! println!("chain reset policy: {:?}", config.chain_reset);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use crate::dispatch::chain::ChainResetPolicy;
use serde::{Deserialize, Serialize};

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigLoader;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// When the chain signal is cleared between the messages of a unit
    pub chain_reset: ChainResetPolicy,

    /// Check every dispatcher factory mapping when the behavior is built
    pub validate_factories_on_startup: bool,

    /// Emit a debug event for every dispatch action run
    pub log_dispatch_actions: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            chain_reset: ChainResetPolicy::PerMessage,
            validate_factories_on_startup: true,
            log_dispatch_actions: true,
        }
    }
}
