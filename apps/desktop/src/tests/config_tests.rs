use super::*;

use std::{
    env,
    time::{SystemTime, UNIX_EPOCH},
};

fn temp_settings_file(name: &str, contents: &str) -> std::path::PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("clinic_desktop_{name}_{suffix}.toml"));
    fs::write(&path, contents).expect("write settings");
    path
}

fn env_from(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
    move |key| {
        pairs
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.to_string())
    }
}

#[test]
fn defaults_apply_without_file_or_env() {
    let settings = load_settings_from(Path::new("/nonexistent/clinic.toml"), |_| None);
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.api_url, "https://crmeyecare.onrender.com/");
    assert_eq!(settings.recent_limit, 5);
}

#[test]
fn file_values_override_defaults() {
    let path = temp_settings_file(
        "file_values",
        "api_url = \"http://localhost:4000\"\nrecent_limit = 8\ndisplay_utc_offset_minutes = 330\n",
    );

    let settings = load_settings_from(&path, |_| None);

    assert_eq!(settings.api_url, "http://localhost:4000");
    assert_eq!(settings.recent_limit, 8);
    assert_eq!(settings.display_utc_offset_minutes, 330);
    fs::remove_file(path).expect("cleanup");
}

#[test]
fn env_overrides_file_and_app_prefix_wins() {
    let path = temp_settings_file("env_overrides", "api_url = \"http://from-file\"\n");

    let settings = load_settings_from(
        &path,
        env_from(&[
            ("CLINIC_API_URL", "http://from-clinic-env"),
            ("APP__API_URL", "http://from-app-env"),
            ("CLINIC_TOKEN_ENV", "MY_TOKEN"),
        ]),
    );

    assert_eq!(settings.api_url, "http://from-app-env");
    assert_eq!(settings.token_env, "MY_TOKEN");
    fs::remove_file(path).expect("cleanup");
}

#[test]
fn invalid_numbers_keep_previous_layer() {
    let path = temp_settings_file("invalid_numbers", "recent_limit = 3\n");

    let settings = load_settings_from(
        &path,
        env_from(&[
            ("APP__RECENT_LIMIT", "many"),
            ("APP__DISPLAY_UTC_OFFSET_MINUTES", "east"),
        ]),
    );

    assert_eq!(settings.recent_limit, 3);
    assert_eq!(settings.display_utc_offset_minutes, 0);
    fs::remove_file(path).expect("cleanup");
}

#[test]
fn malformed_file_is_ignored() {
    let path = temp_settings_file("malformed", "this is = = not toml");
    let settings = load_settings_from(&path, |_| None);
    assert_eq!(settings, Settings::default());
    fs::remove_file(path).expect("cleanup");
}

#[test]
fn display_offset_is_validated() {
    let mut settings = Settings {
        display_utc_offset_minutes: -300,
        ..Settings::default()
    };
    assert_eq!(
        settings.display_offset().expect("offset"),
        FixedOffset::west_opt(5 * 3600).unwrap()
    );

    settings.display_utc_offset_minutes = 24 * 60;
    assert!(settings.display_offset().is_err());
}

#[test]
fn huge_display_offset_is_rejected_without_overflow() {
    for minutes in [i32::MAX, i32::MIN, 40_000_000] {
        let settings = Settings {
            display_utc_offset_minutes: minutes,
            ..Settings::default()
        };
        assert!(settings.display_offset().is_err(), "{minutes} accepted");
    }
}
