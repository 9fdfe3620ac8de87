// Tests for BrokerConfig
// Test cases:
// - Load resolves relative paths against the config file directory
// - Missing cacheDictionaries defaults to true
// - Malformed JSON is reported as a parse error
// - Discovery honours ENCHANT_CONFIG_DIR with and without broker.json
// - Ordering lines without a colon are skipped

use super::*;
use serial_test::serial;
use tempfile::TempDir;

#[test]
fn test_load_resolves_relative_paths() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join(CONFIG_FILE_NAME);
    fs::write(
        &path,
        r#"{
            "userConfigDir": "user",
            "engines": [
                { "name": "hunspell", "description": "Hunspell lists", "dictionaryDir": "hunspell" },
                { "name": "aspell", "dictionaryDir": "/abs/aspell" }
            ]
        }"#,
    )
    .unwrap();

    let config = BrokerConfig::load(&path).unwrap();
    assert_eq!(config.user_config_dir, temp_dir.path().join("user"));
    assert_eq!(config.engines.len(), 2);
    assert_eq!(config.engines[0].dictionary_dir, temp_dir.path().join("hunspell"));
    assert_eq!(config.engines[1].dictionary_dir, PathBuf::from("/abs/aspell"));
    assert_eq!(config.engines[1].description, "");
    assert!(config.cache_dictionaries);
}

#[test]
fn test_load_reports_parse_errors() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join(CONFIG_FILE_NAME);
    fs::write(&path, "{ not json").unwrap();

    let result = BrokerConfig::load(&path);
    assert!(matches!(result, Err(ConfigError::Parse { .. })));
}

#[test]
fn test_load_reports_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let result = BrokerConfig::load(&temp_dir.path().join("absent.json"));
    assert!(matches!(result, Err(ConfigError::Io { .. })));
}

#[test]
#[serial]
fn test_discover_uses_env_dir_defaults() {
    let temp_dir = TempDir::new().unwrap();
    std::env::set_var(CONFIG_DIR_ENV, temp_dir.path());

    let config = BrokerConfig::discover().unwrap();
    std::env::remove_var(CONFIG_DIR_ENV);

    assert_eq!(config.user_config_dir, temp_dir.path());
    assert_eq!(config.engines.len(), 1);
    assert_eq!(config.engines[0].name, DEFAULT_ENGINE_NAME);
    assert_eq!(config.engines[0].dictionary_dir, temp_dir.path().join("dictionaries"));
}

#[test]
#[serial]
fn test_discover_prefers_config_file() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join(CONFIG_FILE_NAME),
        r#"{ "userConfigDir": ".", "engines": [], "cacheDictionaries": false }"#,
    )
    .unwrap();
    std::env::set_var(CONFIG_DIR_ENV, temp_dir.path());

    let config = BrokerConfig::discover().unwrap();
    std::env::remove_var(CONFIG_DIR_ENV);

    assert!(config.engines.is_empty());
    assert!(!config.cache_dictionaries);
}

#[test]
fn test_parse_orderings_skips_lines_without_colon() {
    let orderings = parse_orderings("en_US:aspell,myspell\nnonsense\n*:wordlist\n");
    assert_eq!(
        orderings,
        vec![
            ("en_US".to_string(), "aspell,myspell".to_string()),
            ("*".to_string(), "wordlist".to_string()),
        ]
    );
}

#[test]
fn test_load_orderings_missing_file_is_empty() {
    let temp_dir = TempDir::new().unwrap();
    let config = BrokerConfig::with_user_config_dir(temp_dir.path().to_path_buf());
    assert!(config.load_orderings().is_empty());
}
