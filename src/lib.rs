//! # pubkey
//!
//! Discovers OpenSSH public keys on a host and reports them per account.
//!
//! A registry file lists `account:path` pairs. Each referenced file is read
//! and its public-key line is split into options, type, key blob and
//! comment. The resulting inventory is what a configuration-management
//! layer distributes to other hosts.

pub mod cli;
pub mod config;
pub mod inventory;
pub mod key;

pub use config::Config;
pub use inventory::{InventoryBuilder, KeyEntry, KeyInventory};
pub use key::{KeyLineParser, OptionsPolicy, PublicKeyRecord};

/// Result type alias for pubkey operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for pubkey operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Key parsing or path resolution error
    #[error("Key error: {0}")]
    Key(#[from] key::KeyError),

    /// Inventory error
    #[error("Inventory error: {0}")]
    Inventory(#[from] inventory::InventoryError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
