//! Tests for configuration defaults.

use rstest::rstest;

use rail_config::{Config, DEFAULT_MANIFEST_FILE, LogFormat};

#[test]
fn default_config_uses_documented_values() {
    let config = Config::default();
    assert_eq!(config.log_filter(), "info");
    assert_eq!(config.log_format(), LogFormat::Json);
    assert_eq!(config.manifest_path().as_str(), DEFAULT_MANIFEST_FILE);
    assert!(config.write_manifest());
}

#[rstest]
#[case::json("json", LogFormat::Json)]
#[case::compact("compact", LogFormat::Compact)]
#[case::upper("COMPACT", LogFormat::Compact)]
fn log_format_parses_case_insensitively(#[case] input: &str, #[case] expected: LogFormat) {
    let parsed: LogFormat = input.parse().expect("known log format");
    assert_eq!(parsed, expected);
}

#[test]
fn log_format_rejects_unknown_values() {
    assert!("pretty".parse::<LogFormat>().is_err());
}

#[test]
fn log_format_displays_in_snake_case() {
    assert_eq!(LogFormat::Compact.to_string(), "compact");
}

#[test]
fn missing_fields_fall_back_to_serde_defaults() {
    let json = r#"{"log_filter":"warn","log_format":"compact"}"#;
    let config: Config = serde_json::from_str(json).expect("partial config deserialises");
    assert_eq!(config.log_filter(), "warn");
    assert_eq!(config.log_format(), LogFormat::Compact);
    assert_eq!(config.manifest_path().as_str(), DEFAULT_MANIFEST_FILE);
}

#[rstest]
#[case::json(LogFormat::Json, true, false)]
#[case::compact(LogFormat::Compact, false, true)]
fn structured_formats_never_carry_colour(
    #[case] format: LogFormat,
    #[case] structured: bool,
    #[case] ansi: bool,
) {
    assert_eq!(format.is_structured(), structured);
    assert_eq!(format.allows_ansi(), ansi);
}
