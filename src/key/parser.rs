//! OpenSSH public-key line parser
//!
//! A line has the shape `[options] type key [comment]`. Nothing marks where
//! the options end, so the split point is the first whitespace-delimited
//! token that looks like a key type and is followed by a key blob.

use crate::key::{KeyError, PublicKeyRecord};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Recognized type-token prefixes, most specific first
pub const TYPE_PREFIXES: [&str; 4] = ["sk-ssh-ed25519", "sk-ecdsa-", "ssh-", "ecdsa-"];

/// Where a leading options span ends up in the record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionsPolicy {
    /// Options go in their own field, `type` is the bare token
    #[default]
    Separate,
    /// Options stay glued to the front of `type`, `options` is never set
    Concatenate,
}

/// Public-key line parser
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyLineParser {
    policy: OptionsPolicy,
}

/// Byte offsets of the pieces of a matched line
struct Split {
    type_start: usize,
    type_end: usize,
    key_start: usize,
    key_end: usize,
}

impl KeyLineParser {
    /// Create a parser with the given options policy
    pub fn new(policy: OptionsPolicy) -> Self {
        Self { policy }
    }

    /// Active options policy
    pub fn policy(&self) -> OptionsPolicy {
        self.policy
    }

    /// Parse one logical public-key line
    pub fn parse(&self, line: &str) -> Result<PublicKeyRecord, KeyError> {
        let split = locate(line).ok_or_else(|| KeyError::MalformedKeyLine(line.to_string()))?;

        let options = line[..split.type_start].trim_end();
        let token = &line[split.type_start..split.type_end];
        let comment = line[split.key_end..].trim();

        let (key_type, options) = match self.policy {
            OptionsPolicy::Separate => (token.to_string(), non_empty(options)),
            OptionsPolicy::Concatenate if options.is_empty() => (token.to_string(), None),
            OptionsPolicy::Concatenate => (line[..split.type_end].to_string(), None),
        };

        Ok(PublicKeyRecord {
            key_type,
            options,
            key: line[split.key_start..split.key_end].to_string(),
            comment: non_empty(comment),
        })
    }

    /// Parse a key split over several physical lines
    ///
    /// Lines are joined with no separator before parsing.
    pub fn parse_lines<I, S>(&self, lines: I) -> Result<PublicKeyRecord, KeyError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined: String = lines.into_iter().map(|l| l.as_ref().to_owned()).collect();
        self.parse(&joined)
    }

    /// Read and parse a public-key file
    pub fn parse_file(&self, path: &Path) -> Result<PublicKeyRecord, KeyError> {
        let content = std::fs::read_to_string(path)?;
        self.parse_lines(content.lines())
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// ASCII whitespace including vertical tab
pub(crate) fn is_ws(b: u8) -> bool {
    b.is_ascii_whitespace() || b == 0x0b
}

/// Whether `token` starts with a known prefix and has something after it
fn is_type_token(token: &str) -> bool {
    TYPE_PREFIXES
        .iter()
        .any(|prefix| token.len() > prefix.len() && token.starts_with(prefix))
}

fn skip_ws(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && is_ws(bytes[pos]) {
        pos += 1;
    }
    pos
}

/// End of a plain whitespace-delimited token
fn token_end(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && !is_ws(bytes[pos]) {
        pos += 1;
    }
    pos
}

/// End of an options token; whitespace inside double quotes does not end it
fn option_token_end(bytes: &[u8], mut pos: usize) -> usize {
    let mut in_quotes = false;
    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' if in_quotes => pos += 1,
            b'"' => in_quotes = !in_quotes,
            b if is_ws(b) && !in_quotes => break,
            _ => {}
        }
        pos += 1;
    }
    pos.min(bytes.len())
}

/// Find the first type token that is followed by a key blob
fn locate(line: &str) -> Option<Split> {
    // All delimiters are ASCII, so byte offsets are valid char boundaries.
    let bytes = line.as_bytes();
    let mut pos = 0;

    loop {
        let start = skip_ws(bytes, pos);
        if start == bytes.len() {
            return None;
        }

        let end = token_end(bytes, start);
        if is_type_token(&line[start..end]) {
            let key_start = skip_ws(bytes, end);
            if key_start > end && key_start < bytes.len() {
                return Some(Split {
                    type_start: start,
                    type_end: end,
                    key_start,
                    key_end: token_end(bytes, key_start),
                });
            }
        }

        pos = option_token_end(bytes, start);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    const RSA_KEY: &str = "AAAAB3NzaC1yc2EAAAADAQABAAABAQC7";
    const SK_ECDSA_KEY: &str = "AAAAInNrLWVjZHNhLXNoYTItbmlzdHAyNTZAb3BlbnNzaC5jb20";

    fn parse(line: &str) -> PublicKeyRecord {
        KeyLineParser::default().parse(line).unwrap()
    }

    #[test]
    fn test_plain_line() {
        let rec = parse(&format!("ssh-rsa {} user@host", RSA_KEY));
        assert_eq!(rec.key_type, "ssh-rsa");
        assert_eq!(rec.key, RSA_KEY);
        assert_eq!(rec.comment.as_deref(), Some("user@host"));
        assert_eq!(rec.options, None);
    }

    #[test]
    fn test_options_kept_separate() {
        let line = format!(
            "no-touch-required sk-ecdsa-sha2-nistp256@openssh.com {} joe@example",
            SK_ECDSA_KEY
        );
        let rec = parse(&line);
        assert_eq!(rec.options.as_deref(), Some("no-touch-required"));
        assert_eq!(rec.key_type, "sk-ecdsa-sha2-nistp256@openssh.com");
        assert_eq!(rec.key, SK_ECDSA_KEY);
        assert_eq!(rec.comment.as_deref(), Some("joe@example"));
    }

    #[test]
    fn test_options_concatenated() {
        let parser = KeyLineParser::new(OptionsPolicy::Concatenate);
        let line = format!(
            "no-touch-required sk-ecdsa-sha2-nistp256@openssh.com {} joe@example",
            SK_ECDSA_KEY
        );
        let rec = parser.parse(&line).unwrap();
        assert_eq!(rec.options, None);
        assert_eq!(
            rec.key_type,
            "no-touch-required sk-ecdsa-sha2-nistp256@openssh.com"
        );
        assert_eq!(rec.key, SK_ECDSA_KEY);

        // Without options both policies agree
        let rec = parser.parse(&format!("ssh-rsa {} c", RSA_KEY)).unwrap();
        assert_eq!(rec.key_type, "ssh-rsa");
    }

    #[test]
    fn test_sk_ed25519_is_not_split_inside_token() {
        let rec = parse("sk-ssh-ed25519@openssh.com AAAAGnNrLXNzaC1lZDI1NTE5 me@yubikey");
        assert_eq!(rec.key_type, "sk-ssh-ed25519@openssh.com");
        assert_eq!(rec.options, None);
    }

    #[test]
    fn test_comment_with_spaces_and_trimming() {
        let rec = parse(&format!("ssh-rsa {}   John Doe's laptop  ", RSA_KEY));
        assert_eq!(rec.comment.as_deref(), Some("John Doe's laptop"));
    }

    #[test]
    fn test_missing_comment() {
        let rec = parse(&format!("ssh-rsa {}", RSA_KEY));
        assert_eq!(rec.comment, None);

        let rec = parse(&format!("ssh-rsa {}   \t", RSA_KEY));
        assert_eq!(rec.comment, None);
    }

    #[test]
    fn test_quoted_options_are_not_type_tokens() {
        let line = format!(
            r#"command="echo ssh-rsa hello",no-pty ssh-ed25519 {} ops"#,
            RSA_KEY
        );
        let rec = parse(&line);
        assert_eq!(rec.options.as_deref(), Some(r#"command="echo ssh-rsa hello",no-pty"#));
        assert_eq!(rec.key_type, "ssh-ed25519");
        assert_eq!(rec.comment.as_deref(), Some("ops"));
    }

    #[test]
    fn test_multiple_option_tokens() {
        let line = format!(
            r#"from="10.0.0.0/8" restrict,pty  ecdsa-sha2-nistp384 {} x"#,
            RSA_KEY
        );
        let rec = parse(&line);
        assert_eq!(rec.options.as_deref(), Some(r#"from="10.0.0.0/8" restrict,pty"#));
        assert_eq!(rec.key_type, "ecdsa-sha2-nistp384");
    }

    #[test]
    fn test_type_token_without_key_is_skipped() {
        // A trailing bare type token is followed by nothing, so there is no match
        assert!(KeyLineParser::default().parse("restrict ssh-rsa").is_err());
    }

    #[test]
    fn test_bare_prefix_is_not_a_type() {
        let rec = parse(&format!("ssh- ssh-rsa {} c", RSA_KEY));
        assert_eq!(rec.options.as_deref(), Some("ssh-"));
        assert_eq!(rec.key_type, "ssh-rsa");
    }

    #[test]
    fn test_parse_lines_joins_without_separator() {
        let lines = ["ssh-ed25519 AAAAC3NzaC1lZDI1", "NTE5AAAAIAAB alice@box"];
        let rec = KeyLineParser::default().parse_lines(lines).unwrap();
        assert_eq!(rec.key, "AAAAC3NzaC1lZDI1NTE5AAAAIAAB");
        assert_eq!(rec.comment.as_deref(), Some("alice@box"));
    }

    #[test]
    fn test_parse_file_strips_crlf() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("id_rsa.pub");
        std::fs::write(&path, format!("ssh-rsa {}\r\n", RSA_KEY)).unwrap();

        let rec = KeyLineParser::default().parse_file(&path).unwrap();
        assert_eq!(rec.key, RSA_KEY);
        assert_eq!(rec.comment, None);
    }

    #[test]
    fn test_vertical_tab_separates_fields() {
        let rec = parse(&format!("ssh-rsa\x0b{}\x0bbob@host", RSA_KEY));
        assert_eq!(rec.key_type, "ssh-rsa");
        assert_eq!(rec.key, RSA_KEY);
        assert_eq!(rec.comment.as_deref(), Some("bob@host"));

        let rec = parse(&format!("restrict\x0bssh-rsa {}", RSA_KEY));
        assert_eq!(rec.options.as_deref(), Some("restrict"));
    }

    #[test]
    fn test_unicode_in_comment() {
        let rec = parse(&format!("ssh-rsa {} José@hôte", RSA_KEY));
        assert_eq!(rec.comment.as_deref(), Some("José@hôte"));
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("garbage text with no key")]
    #[case("ssh-rsa")]
    #[case(r#"command="ssh-rsa AAAA comment"#)]
    fn test_malformed(#[case] line: &str) {
        let result = KeyLineParser::default().parse(line);
        match result {
            Err(KeyError::MalformedKeyLine(original)) => assert_eq!(original, line),
            other => panic!("expected MalformedKeyLine, got {:?}", other),
        }
    }
}
