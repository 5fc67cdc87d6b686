/*!
 * Tests for configuration defaults, parsing, and validation
 */

use anyhow::Result;
use m3u_curator::Config;
use m3u_curator::app_config::LogLevel;

/// Defaults match the documented probe and output settings
#[test]
fn test_config_default_shouldUseDocumentedValues() {
    let config = Config::default();
    assert_eq!(config.validation.timeout_secs, 6);
    assert_eq!(config.validation.min_bytes, 2048);
    assert_eq!(config.validation.concurrency, 8);
    assert!(!config.validation.skip_validation);
    assert_eq!(config.output.valid_csv, "filtered_valid_m3u.csv");
    assert_eq!(config.output.rejected_csv, "filtered_out.csv");
    assert_eq!(config.output.playlist, "final_playlist.m3u");
    assert_eq!(config.output.raw_dir, "RAW");
    assert_eq!(config.log_level, LogLevel::Info);
    assert!(config.filters.languages.is_empty());
}

/// Missing sections fall back to defaults section by section
#[test]
fn test_config_fromJson_withPartialDocument_shouldFillDefaults() -> Result<()> {
    let json = r#"{
        "filters": { "languages": ["fr"] },
        "validation": { "timeout_secs": 3 },
        "log_level": "debug"
    }"#;
    let config: Config = serde_json::from_str(json)?;
    assert_eq!(config.filters.languages, vec!["fr".to_string()]);
    assert!(config.filters.countries.is_empty());
    assert_eq!(config.validation.timeout_secs, 3);
    assert_eq!(config.validation.min_bytes, 2048);
    assert_eq!(config.log_level, LogLevel::Debug);
    Ok(())
}

/// Zero-valued probe settings are rejected
#[test]
fn test_config_validate_withZeroTimeout_shouldFail() {
    let mut config = Config::default();
    config.validation.timeout_secs = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_config_validate_withZeroMinBytes_shouldFail() {
    let mut config = Config::default();
    config.validation.min_bytes = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_config_validate_withZeroConcurrency_shouldFail() {
    let mut config = Config::default();
    config.validation.concurrency = 0;
    assert!(config.validate().is_err());
}

/// Blank output paths are rejected
#[test]
fn test_config_validate_withBlankPlaylistPath_shouldFail() {
    let mut config = Config::default();
    config.output.playlist = "  ".to_string();
    assert!(config.validate().is_err());
}

/// A defaulted configuration validates cleanly
#[test]
fn test_config_validate_withDefaults_shouldSucceed() {
    assert!(Config::default().validate().is_ok());
}

/// Configs round-trip through serde without losing fields
#[test]
fn test_config_serde_roundTrip_shouldPreserveValues() -> Result<()> {
    let mut config = Config::default();
    config.filters.countries = vec!["CA".to_string()];
    config.validation.skip_validation = true;

    let json = serde_json::to_string(&config)?;
    let restored: Config = serde_json::from_str(&json)?;
    assert_eq!(restored.filters.countries, vec!["CA".to_string()]);
    assert!(restored.validation.skip_validation);
    Ok(())
}
