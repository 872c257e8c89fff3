//! Per-account public-key inventory
//!
//! Builds a mapping from account name to the public key found at the path
//! the registry records for it. A missing key file is a normal state for a
//! freshly provisioned account and maps to [`KeyEntry::Absent`]. A file that
//! exists but cannot be read or parsed maps to [`KeyEntry::Invalid`] without
//! affecting the other accounts.

use crate::key::{KeyError, KeyLineParser, PublicKeyRecord};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

pub mod registry;

pub use registry::{Registry, RegistryEntry, RegistryMode, DEFAULT_REGISTRY_PATH};

/// Inventory errors
#[derive(Debug, Error)]
pub enum InventoryError {
    /// Registry line that is not an `account:path` pair (strict mode)
    #[error("Invalid registry line {line_number}: {line}")]
    InvalidRegistryLine {
        /// 1-based line number
        line_number: usize,
        /// Offending line
        line: String,
    },

    /// Key error
    #[error("Key error: {0}")]
    Key(#[from] KeyError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// What was found for one account
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyEntry {
    /// A parsed public key
    Present(PublicKeyRecord),
    /// No regular file at the registered path
    Absent,
    /// The file exists but could not be read or parsed
    Invalid {
        /// Human-readable failure
        reason: String,
    },
}

impl KeyEntry {
    /// The record, if one was parsed
    pub fn record(&self) -> Option<&PublicKeyRecord> {
        match self {
            KeyEntry::Present(record) => Some(record),
            _ => None,
        }
    }

    /// Whether no key file exists yet
    pub fn is_absent(&self) -> bool {
        matches!(self, KeyEntry::Absent)
    }
}

impl Serialize for KeyEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            KeyEntry::Present(record) => record.serialize(serializer),
            KeyEntry::Absent => serializer.serialize_map(Some(0))?.end(),
            KeyEntry::Invalid { reason } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("error", reason)?;
                map.end()
            }
        }
    }
}

/// Account name to key mapping
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct KeyInventory {
    entries: BTreeMap<String, KeyEntry>,
}

impl KeyInventory {
    /// Create an empty inventory
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, returning the one it replaced
    pub fn insert(&mut self, account: impl Into<String>, entry: KeyEntry) -> Option<KeyEntry> {
        self.entries.insert(account.into(), entry)
    }

    /// Entry for an account
    pub fn get(&self, account: &str) -> Option<&KeyEntry> {
        self.entries.get(account)
    }

    /// Iterate over accounts in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &KeyEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Accounts with a parsed key
    pub fn present(&self) -> impl Iterator<Item = (&str, &PublicKeyRecord)> {
        self.iter()
            .filter_map(|(account, entry)| entry.record().map(|r| (account, r)))
    }

    /// Number of accounts
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the inventory has no accounts
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builds [`KeyInventory`] values from registry entries
#[derive(Debug, Clone, Copy, Default)]
pub struct InventoryBuilder {
    parser: KeyLineParser,
}

impl InventoryBuilder {
    /// Create a builder around a parser
    pub fn new(parser: KeyLineParser) -> Self {
        Self { parser }
    }

    /// Build an inventory; later entries for the same account win
    pub fn build<I>(&self, registry: I) -> KeyInventory
    where
        I: IntoIterator<Item = RegistryEntry>,
    {
        let mut inventory = KeyInventory::new();

        for RegistryEntry { account, path } in registry {
            let entry = self.fetch_key(&path);
            if let KeyEntry::Invalid { reason } = &entry {
                warn!(account = %account, path = %path.display(), "unusable public key: {}", reason);
            }
            if inventory.insert(account.clone(), entry).is_some() {
                debug!(account = %account, "registry entry overrides an earlier one");
            }
        }

        inventory
    }

    /// Load the registry at `path` and build an inventory from it
    pub fn build_from_registry_file(
        &self,
        path: &Path,
        mode: RegistryMode,
    ) -> Result<KeyInventory, InventoryError> {
        let registry = Registry::load(path, mode)?;
        debug!(path = %path.display(), entries = registry.len(), "loaded registry");
        Ok(self.build(registry))
    }

    /// Look up the key for a single path
    pub fn fetch_key(&self, path: &Path) -> KeyEntry {
        // metadata follows symlinks, so a dangling link is an error here
        let is_file = std::fs::metadata(path)
            .map(|m| m.is_file())
            .unwrap_or(false);
        if !is_file {
            debug!(path = %path.display(), "no public key file");
            return KeyEntry::Absent;
        }

        match self.parser.parse_file(path) {
            Ok(record) => KeyEntry::Present(record),
            Err(e) => KeyEntry::Invalid {
                reason: e.to_string(),
            },
        }
    }
}
