use super::*;

use std::collections::HashMap;

fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_match_daily_oracle() {
    let settings = Settings::default();
    let policy = settings.policy().expect("policy");
    assert_eq!(settings.source, "urls.txt");
    assert_eq!(policy.history_limit, 20);
    assert_eq!(policy.reset_after, Duration::from_secs(24 * 60 * 60));
}

#[test]
fn file_values_override_defaults() {
    let mut settings = Settings::default();
    apply_file(
        &mut settings,
        r#"
        source = "https://cards.test/urls.txt"
        history_limit = 5
        reset_hours = 12
        "#,
    )
    .expect("apply");

    assert_eq!(settings.source, "https://cards.test/urls.txt");
    assert_eq!(settings.history_limit, 5);
    assert_eq!(settings.reset_hours, 12);
    assert_eq!(settings.database_url, Settings::default().database_url);
}

#[test]
fn malformed_file_is_rejected() {
    let mut settings = Settings::default();
    assert!(apply_file(&mut settings, "history_limit = \"many\"").is_err());
}

#[test]
fn app_prefixed_env_wins_over_short_name() {
    let mut settings = Settings::default();
    apply_env(
        &mut settings,
        env_of(&[
            ("ORACLE_SOURCE", "short.txt"),
            ("APP__SOURCE", "app.txt"),
            ("APP__HISTORY_LIMIT", " 7 "),
        ]),
    )
    .expect("apply");

    assert_eq!(settings.source, "app.txt");
    assert_eq!(settings.history_limit, 7);
}

#[test]
fn invalid_numeric_env_is_an_error() {
    let mut settings = Settings::default();
    let err = apply_env(&mut settings, env_of(&[("APP__RESET_HOURS", "soon")]))
        .expect_err("should fail");
    assert!(err.to_string().contains("APP__RESET_HOURS"));
}

#[test]
fn zero_limits_are_rejected() {
    let settings = Settings {
        history_limit: 0,
        ..Settings::default()
    };
    assert!(settings.policy().is_err());

    let settings = Settings {
        reset_hours: 0,
        ..Settings::default()
    };
    assert!(settings.policy().is_err());

    let settings = Settings {
        fetch_timeout_secs: 0,
        ..Settings::default()
    };
    assert!(settings.fetch_timeout().is_err());
}

#[test]
fn explicit_missing_config_file_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("absent.toml");
    assert!(load_settings(Some(missing.as_path())).is_err());
}

#[test]
fn explicit_config_file_is_loaded() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("oracle.toml");
    std::fs::write(&path, "fetch_timeout_secs = 3\n").expect("write");

    let settings = load_settings(Some(path.as_path())).expect("load");
    assert_eq!(settings.fetch_timeout_secs, 3);
}

#[test]
fn normalizes_plain_file_path_to_sqlite_url() {
    assert_eq!(
        prepare_database_url("./data/test.db"),
        "sqlite://./data/test.db"
    );
    assert_eq!(
        prepare_database_url("sqlite:data\\test.db"),
        "sqlite://data/test.db"
    );
    assert_eq!(prepare_database_url("sqlite::memory:"), "sqlite::memory:");
    assert_eq!(prepare_database_url("  "), Settings::default().database_url);
}
