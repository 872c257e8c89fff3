//! Basic functionality tests for the public library surface

use pubkey::config::Config;
use pubkey::key::KeyError;

#[test]
fn test_version() {
    assert_eq!(pubkey::VERSION, "0.1.0");
}

#[test]
fn test_default_config() {
    let config = Config::default();
    assert!(!config.registry.as_os_str().is_empty());
    assert_eq!(config.log_level, "info");
}

#[test]
fn test_error_conversion() {
    let err: pubkey::Error = KeyError::UnknownKeyType("bogus".to_string()).into();
    assert!(matches!(err, pubkey::Error::Key(KeyError::UnknownKeyType(_))));
    assert_eq!(err.to_string(), "Key error: Unknown key type: bogus");

    let result: pubkey::Result<String> =
        pubkey::key::ssh_key_path("/root/.ssh", "bogus", true).map_err(Into::into);
    assert!(result.is_err());
}
