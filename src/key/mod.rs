//! OpenSSH public-key handling for pubkey
//!
//! This module parses OpenSSH public-key lines into normalized records and
//! maps key-type aliases to their conventional file names.

use thiserror::Error;

pub mod kind;
pub mod parser;
pub mod path;
pub mod record;

pub use kind::KeyKind;
pub use parser::{KeyLineParser, OptionsPolicy};
pub use path::ssh_key_path;
pub use record::PublicKeyRecord;

/// Key handling errors
#[derive(Debug, Error)]
pub enum KeyError {
    /// No recognizable type token followed by a key blob
    #[error("Wrong key line format: {0}")]
    MalformedKeyLine(String),

    /// Type alias outside the known table
    #[error("Unknown key type: {0}")]
    UnknownKeyType(String),

    /// Key blob is not a well-formed SSH wire-format blob
    #[error("Invalid key blob: {0}")]
    InvalidBlob(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_line_message_carries_line() {
        let err = KeyError::MalformedKeyLine("garbage".to_string());
        assert_eq!(err.to_string(), "Wrong key line format: garbage");
    }
}
