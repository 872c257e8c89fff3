//! Canonical key file locations

use crate::key::{KeyError, KeyKind};

/// Default alias used when a caller does not name one
pub const DEFAULT_KEY_TYPE: &str = "ed25519";

/// Resolve the conventional path of a key inside `dir`
///
/// `dir` is taken as-is; no I/O is performed. With `want_public` the
/// `.pub` suffix is appended.
pub fn ssh_key_path(dir: &str, key_type: &str, want_public: bool) -> Result<String, KeyError> {
    let kind: KeyKind = key_type.parse()?;
    Ok(kind_key_path(dir, kind, want_public))
}

/// Same as [`ssh_key_path`] for an already-parsed kind
pub fn kind_key_path(dir: &str, kind: KeyKind, want_public: bool) -> String {
    let mut path = format!("{}/{}", dir, kind.file_stem());
    if want_public {
        path.push_str(".pub");
    }
    path
}
