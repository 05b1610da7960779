//! Unit tests for config module
//!
//! Tests configuration types, defaults, and serialization.
//! No filesystem dependencies - all in-memory.

#![allow(clippy::panic, clippy::unwrap_used)]

use crate::{
    MediabarError,
    config::{Config, LogLevel, MediaConfig},
};

#[test]
fn media_defaults() {
    let media = MediaConfig::default();

    assert!(media.ignored_players.is_empty());
    assert!(media.scroll_title);
    assert_eq!(media.scroll_interval_ms, 200);
    assert_eq!(media.scroll_step, 2);
    assert_eq!(media.scroll_before_timeout_s, 5);
    assert_eq!(media.title_max_width, 40);
    assert_eq!(media.stopped_grace_ms, 2000);
    assert_eq!(media.position_poll_ms, 250);
    assert!(media.tooltip);
}

#[test]
fn config_serialize_toml() {
    let toml_str = toml::to_string(&Config::default()).unwrap();

    assert!(toml_str.contains("[general]"));
    assert!(toml_str.contains("[media]"));
}

#[test]
fn config_serialize_roundtrip() {
    let original = Config {
        media: MediaConfig {
            ignored_players: "spotify, firefox".to_string(),
            title_max_width: 25,
            ..MediaConfig::default()
        },
        ..Config::default()
    };

    let toml_str = toml::to_string(&original).unwrap();
    let deserialized: Config = toml::from_str(&toml_str).unwrap();

    assert_eq!(original, deserialized);
}

#[test]
fn config_empty_toml() {
    let config = Config::from_toml("").unwrap();

    assert_eq!(config, Config::default());
}

#[test]
fn config_partial_media_section() {
    let config = Config::from_toml(
        r#"
        [general]
        log_level = "debug"

        [media]
        ignored_players = "Spotify"
        scroll_title = false
    "#,
    )
    .unwrap();

    assert_eq!(config.general.log_level, LogLevel::Debug);
    assert_eq!(config.media.ignored_players, "Spotify");
    assert!(!config.media.scroll_title);
    assert_eq!(config.media.scroll_interval_ms, 200);
}

#[test]
fn invalid_toml_is_a_parse_error() {
    let err = Config::from_toml("[media\nscroll_step = 2").unwrap_err();

    match err {
        MediabarError::TomlParseError { location, .. } => assert_eq!(location, "string"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn wrong_type_is_a_parse_error() {
    let err = Config::from_toml("[media]\nscroll_step = \"fast\"").unwrap_err();

    assert!(matches!(err, MediabarError::TomlParseError { .. }));
}

#[test]
fn unknown_log_level_is_rejected() {
    assert!(Config::from_toml("[general]\nlog_level = \"loud\"").is_err());
}

#[test]
fn zero_values_fail_validation() {
    let err = Config::from_toml("[media]\nscroll_interval_ms = 0").unwrap_err();

    match err {
        MediabarError::ConfigValidation { component, details } => {
            assert_eq!(component, "media");
            assert!(details.contains("scroll_interval_ms"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn schema_describes_media_section() {
    let schema = serde_json::to_string(&Config::schema()).unwrap();

    assert!(schema.contains("ignored_players"));
    assert!(schema.contains("stopped_grace_ms"));
}
