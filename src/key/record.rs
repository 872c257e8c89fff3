//! Normalized public-key record

use crate::key::parser::is_ws;
use crate::key::{KeyError, KeyKind};
use base64::{
    engine::general_purpose::{STANDARD as BASE64, STANDARD_NO_PAD},
    Engine as _,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{Cursor, Read};

/// One parsed OpenSSH public-key line
///
/// Absent optional fields are omitted when serialized, never emitted as
/// empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKeyRecord {
    /// Key type token, e.g. `ssh-ed25519`
    #[serde(rename = "type")]
    pub key_type: String,
    /// Raw authorized_keys options preceding the type token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<String>,
    /// Base64 key blob
    pub key: String,
    /// Trailing comment, often `user@host`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl PublicKeyRecord {
    /// Convert to public-key line format
    pub fn to_line(&self) -> String {
        let mut parts = Vec::with_capacity(4);

        if let Some(options) = &self.options {
            parts.push(options.as_str());
        }
        parts.push(&self.key_type);
        parts.push(&self.key);
        if let Some(comment) = &self.comment {
            parts.push(comment.as_str());
        }

        parts.join(" ")
    }

    /// The type token without any concatenated options prefix
    pub fn bare_type(&self) -> &str {
        self.key_type
            .rsplit(|c: char| c.is_ascii() && is_ws(c as u8))
            .next()
            .unwrap_or(&self.key_type)
    }

    /// Alias for the key type, if it is one of the known kinds
    pub fn kind(&self) -> Option<KeyKind> {
        KeyKind::from_ssh_type(self.bare_type())
    }

    /// Split the options span into individual options
    ///
    /// Commas inside double-quoted values do not split.
    pub fn option_list(&self) -> Vec<String> {
        let Some(options) = &self.options else {
            return Vec::new();
        };

        let mut list = Vec::new();
        let mut current = String::new();
        let mut in_quotes = false;
        let mut escaped = false;

        for ch in options.chars() {
            if escaped {
                current.push(ch);
                escaped = false;
                continue;
            }
            match ch {
                '\\' if in_quotes => {
                    current.push(ch);
                    escaped = true;
                }
                '"' => {
                    in_quotes = !in_quotes;
                    current.push(ch);
                }
                ',' if !in_quotes => {
                    if !current.is_empty() {
                        list.push(std::mem::take(&mut current));
                    }
                }
                _ => current.push(ch),
            }
        }
        if !current.is_empty() {
            list.push(current);
        }

        list
    }

    /// Decode the base64 key blob
    pub fn blob(&self) -> Result<Vec<u8>, KeyError> {
        BASE64
            .decode(&self.key)
            .map_err(|e| KeyError::InvalidBlob(format!("invalid base64: {}", e)))
    }

    /// Algorithm name embedded at the start of the blob
    pub fn blob_type(&self) -> Result<String, KeyError> {
        let blob = self.blob()?;
        let mut cursor = Cursor::new(blob.as_slice());
        read_string(&mut cursor)
    }

    /// SHA256 fingerprint in the form `ssh-keygen -l` prints
    pub fn fingerprint(&self) -> Result<String, KeyError> {
        use ring::digest;
        let blob = self.blob()?;
        let hash = digest::digest(&digest::SHA256, &blob);
        Ok(format!("SHA256:{}", STANDARD_NO_PAD.encode(hash.as_ref())))
    }

    /// Check the blob describes itself with the same type as the line
    pub fn check_blob(&self) -> Result<(), KeyError> {
        let embedded = self.blob_type()?;
        if embedded != self.bare_type() {
            return Err(KeyError::InvalidBlob(format!(
                "blob declares {} but line declares {}",
                embedded,
                self.bare_type()
            )));
        }
        Ok(())
    }
}

impl fmt::Display for PublicKeyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_line())
    }
}

/// Read a string from the cursor (4-byte length prefix + data)
fn read_string(cursor: &mut Cursor<&[u8]>) -> Result<String, KeyError> {
    let mut len = [0u8; 4];
    cursor
        .read_exact(&mut len)
        .map_err(|_| KeyError::InvalidBlob("truncated length prefix".to_string()))?;
    let len = u32::from_be_bytes(len) as usize;

    let remaining = cursor.get_ref().len() - cursor.position() as usize;
    if len > remaining {
        return Err(KeyError::InvalidBlob(format!(
            "string of {} bytes exceeds remaining {} bytes",
            len, remaining
        )));
    }

    let mut bytes = vec![0u8; len];
    cursor
        .read_exact(&mut bytes)
        .map_err(|_| KeyError::InvalidBlob("truncated string".to_string()))?;
    String::from_utf8(bytes).map_err(|e| KeyError::InvalidBlob(format!("invalid UTF-8: {}", e)))
}
