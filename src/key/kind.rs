//! Key-type alias vocabulary

use crate::key::KeyError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Short user-facing key kind, as accepted by `ssh-keygen -t`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeyKind {
    /// DSA (legacy)
    Dsa,
    /// RSA
    Rsa,
    /// ECDSA over a NIST curve
    Ecdsa,
    /// FIDO security-key backed ECDSA
    EcdsaSk,
    /// Ed25519
    Ed25519,
    /// FIDO security-key backed Ed25519
    Ed25519Sk,
}

impl KeyKind {
    /// All kinds, in the order aliases are listed to users
    pub const ALL: [KeyKind; 6] = [
        KeyKind::Dsa,
        KeyKind::Rsa,
        KeyKind::Ecdsa,
        KeyKind::EcdsaSk,
        KeyKind::Ed25519,
        KeyKind::Ed25519Sk,
    ];

    /// Alias string, e.g. `ed25519-sk`
    pub fn alias(&self) -> &'static str {
        match self {
            KeyKind::Dsa => "dsa",
            KeyKind::Rsa => "rsa",
            KeyKind::Ecdsa => "ecdsa",
            KeyKind::EcdsaSk => "ecdsa-sk",
            KeyKind::Ed25519 => "ed25519",
            KeyKind::Ed25519Sk => "ed25519-sk",
        }
    }

    /// Canonical file name stem inside an `.ssh` directory
    pub fn file_stem(&self) -> &'static str {
        match self {
            KeyKind::Dsa => "id_dsa",
            KeyKind::Rsa => "id_rsa",
            KeyKind::Ecdsa => "id_ecdsa",
            KeyKind::EcdsaSk => "id_ecdsa_sk",
            KeyKind::Ed25519 => "id_ed25519",
            KeyKind::Ed25519Sk => "id_ed25519_sk",
        }
    }

    /// Classify an OpenSSH type token such as `ssh-ed25519`
    ///
    /// ECDSA tokens carry the curve in their name, so any
    /// `ecdsa-sha2-*` token maps to [`KeyKind::Ecdsa`].
    pub fn from_ssh_type(token: &str) -> Option<Self> {
        match token {
            "ssh-dss" => Some(KeyKind::Dsa),
            "ssh-rsa" => Some(KeyKind::Rsa),
            "ssh-ed25519" => Some(KeyKind::Ed25519),
            "sk-ssh-ed25519@openssh.com" => Some(KeyKind::Ed25519Sk),
            "sk-ecdsa-sha2-nistp256@openssh.com" => Some(KeyKind::EcdsaSk),
            t if t.starts_with("ecdsa-sha2-") => Some(KeyKind::Ecdsa),
            _ => None,
        }
    }
}

impl FromStr for KeyKind {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KeyKind::ALL
            .into_iter()
            .find(|kind| kind.alias() == s)
            .ok_or_else(|| KeyError::UnknownKeyType(s.to_string()))
    }
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.alias())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("dsa", "id_dsa")]
    #[case("rsa", "id_rsa")]
    #[case("ecdsa", "id_ecdsa")]
    #[case("ecdsa-sk", "id_ecdsa_sk")]
    #[case("ed25519", "id_ed25519")]
    #[case("ed25519-sk", "id_ed25519_sk")]
    fn test_alias_table(#[case] alias: &str, #[case] stem: &str) {
        let kind: KeyKind = alias.parse().unwrap();
        assert_eq!(kind.file_stem(), stem);
        assert_eq!(kind.to_string(), alias);
    }

    #[test]
    fn test_unknown_alias() {
        let result = "ed448".parse::<KeyKind>();
        assert!(matches!(result, Err(KeyError::UnknownKeyType(t)) if t == "ed448"));

        // Aliases are case sensitive
        assert!("RSA".parse::<KeyKind>().is_err());
    }

    #[rstest]
    #[case("ssh-dss", Some(KeyKind::Dsa))]
    #[case("ssh-rsa", Some(KeyKind::Rsa))]
    #[case("ecdsa-sha2-nistp256", Some(KeyKind::Ecdsa))]
    #[case("ecdsa-sha2-nistp521", Some(KeyKind::Ecdsa))]
    #[case("sk-ecdsa-sha2-nistp256@openssh.com", Some(KeyKind::EcdsaSk))]
    #[case("ssh-ed25519", Some(KeyKind::Ed25519))]
    #[case("sk-ssh-ed25519@openssh.com", Some(KeyKind::Ed25519Sk))]
    #[case("ssh-rsa-cert-v01@openssh.com", None)]
    fn test_from_ssh_type(#[case] token: &str, #[case] expected: Option<KeyKind>) {
        assert_eq!(KeyKind::from_ssh_type(token), expected);
    }

    #[test]
    fn test_serde_uses_alias() {
        let json = serde_json::to_string(&KeyKind::Ed25519Sk).unwrap();
        assert_eq!(json, "\"ed25519-sk\"");
    }
}
