use std::{collections::HashMap, fs, path::Path};

use anyhow::{anyhow, Context};
use chrono::FixedOffset;
use client_core::gateway::DEFAULT_BASE_URL;

pub const SETTINGS_FILE: &str = "clinic.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_url: String,
    pub token_env: String,
    pub recent_limit: usize,
    pub display_utc_offset_minutes: i32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_BASE_URL.into(),
            token_env: "CLINIC_ACCESS_TOKEN".into(),
            recent_limit: client_core::dashboard::DEFAULT_RECENT_LIMIT,
            display_utc_offset_minutes: 0,
        }
    }
}

impl Settings {
    pub fn display_offset(&self) -> anyhow::Result<FixedOffset> {
        self.display_utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                anyhow!(
                    "display offset of {} minutes is out of range",
                    self.display_utc_offset_minutes
                )
            })
    }
}

pub fn load_settings() -> Settings {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

/// Defaults, then the optional settings file, then environment overrides.
pub fn load_settings_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    match read_file_overrides(path) {
        Ok(Some(file_cfg)) => apply_overrides(&mut settings, |key| file_cfg.get(key).cloned()),
        Ok(None) => {}
        Err(err) => tracing::warn!(error = %err, "ignoring unreadable settings file"),
    }

    apply_overrides(&mut settings, |key| {
        let upper = key.to_ascii_uppercase();
        env(&format!("APP__{upper}")).or_else(|| env(&format!("CLINIC_{upper}")))
    });

    settings
}

fn read_file_overrides(path: &Path) -> anyhow::Result<Option<HashMap<String, String>>> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read '{}'", path.display()))
        }
    };
    let table: HashMap<String, toml::Value> = toml::from_str(&raw)
        .with_context(|| format!("failed to parse '{}'", path.display()))?;
    Ok(Some(
        table
            .into_iter()
            .map(|(key, value)| match value {
                toml::Value::String(s) => (key, s),
                other => (key, other.to_string()),
            })
            .collect(),
    ))
}

fn apply_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("api_url") {
        settings.api_url = v;
    }
    if let Some(v) = lookup("token_env") {
        settings.token_env = v;
    }
    if let Some(v) = lookup("recent_limit") {
        if let Ok(parsed) = v.trim().parse::<usize>() {
            settings.recent_limit = parsed;
        }
    }
    if let Some(v) = lookup("display_utc_offset_minutes") {
        if let Ok(parsed) = v.trim().parse::<i32>() {
            settings.display_utc_offset_minutes = parsed;
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
