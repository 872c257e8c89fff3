//! Registry of exported keys
//!
//! The registry is a plain text file with one `account:path` pair per line,
//! maintained by whatever generates and exports keys on the host.

use crate::inventory::InventoryError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default registry location
pub const DEFAULT_REGISTRY_PATH: &str = "/var/cache/pubkey/exported_keys";

static ENTRY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z0-9_-]+):(.*)$").expect("registry entry pattern"));

/// How to treat lines that are not `account:path` pairs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistryMode {
    /// Skip them
    #[default]
    Lenient,
    /// Fail on them (blank and `#` lines are still skipped)
    Strict,
}

/// One `account:path` pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    /// Account name
    pub account: String,
    /// Path to the account's public key
    pub path: PathBuf,
}

impl RegistryEntry {
    /// Create a new entry
    pub fn new(account: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            account: account.into(),
            path: path.into(),
        }
    }

    /// Parse a single registry line, `None` if it is not an entry
    pub fn from_line(line: &str) -> Option<Self> {
        let caps = ENTRY_RE.captures(line)?;
        Some(Self::new(&caps[1], &caps[2]))
    }
}

/// Ordered list of registry entries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    entries: Vec<RegistryEntry>,
}

impl Registry {
    /// Create a registry from entries
    pub fn new(entries: Vec<RegistryEntry>) -> Self {
        Self { entries }
    }

    /// Parse registry text
    pub fn parse(text: &str, mode: RegistryMode) -> Result<Self, InventoryError> {
        let mut entries = Vec::new();

        for (idx, line) in text.lines().enumerate() {
            match RegistryEntry::from_line(line) {
                Some(entry) if mode == RegistryMode::Strict && !entry.path.is_absolute() => {
                    return Err(InventoryError::InvalidRegistryLine {
                        line_number: idx + 1,
                        line: line.to_string(),
                    });
                }
                Some(entry) => entries.push(entry),
                None => {
                    let trimmed = line.trim();
                    let ignorable = trimmed.is_empty() || trimmed.starts_with('#');
                    if mode == RegistryMode::Strict && !ignorable {
                        return Err(InventoryError::InvalidRegistryLine {
                            line_number: idx + 1,
                            line: line.to_string(),
                        });
                    }
                    debug!(line_number = idx + 1, "skipping registry line");
                }
            }
        }

        Ok(Self { entries })
    }

    /// Load the registry file at `path`
    ///
    /// A missing file is an empty registry.
    pub fn load(path: &Path, mode: RegistryMode) -> Result<Self, InventoryError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::parse(&text, mode),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "registry file not found");
                Ok(Self::default())
            }
            Err(e) => Err(InventoryError::Io(e)),
        }
    }

    /// Entries in file order
    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for Registry {
    type Item = RegistryEntry;
    type IntoIter = std::vec::IntoIter<RegistryEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
