use std::path::PathBuf;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::io;

const CONFIG_DIR_VAR: &str = "WARNING_NOTIFIER_CONFIG_DIR";
const ORIGIN_VAR: &str = "WARNING_NOTIFIER_ORIGIN";
const DEFAULT_ORIGIN: &str = "http://localhost";

/// User alert preferences.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    /// Automatic alerts on new warnings. Only ever true with a granted permission.
    pub enabled: bool,
    /// Tone and vibration alongside the notification
    pub sound_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: false,
            sound_enabled: true,
        }
    }
}

impl Settings {
    /// Decode a stored record field by field. A missing or mistyped field
    /// falls back to its default instead of discarding the whole record.
    pub fn from_value(value: &Value) -> Self {
        let defaults = Self::default();
        Self {
            enabled: value
                .get("enabled")
                .and_then(Value::as_bool)
                .unwrap_or(defaults.enabled),
            sound_enabled: value
                .get("sound_enabled")
                .and_then(Value::as_bool)
                .unwrap_or(defaults.sound_enabled),
        }
    }
}

/// Persists [`Settings`] as `settings.json` in the config directory.
pub struct PreferenceStore {
    config_path: PathBuf,
}

impl PreferenceStore {
    pub fn new(config_dir: PathBuf) -> Self {
        Self {
            config_path: config_dir.join("settings.json"),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.config_path
    }

    pub fn load(&self) -> Settings {
        if self.config_path.exists() {
            if let Ok(content) = fs::read_to_string(&self.config_path) {
                if let Ok(value) = serde_json::from_str::<Value>(&content) {
                    return Settings::from_value(&value);
                }
                log::warn!("Ignoring unreadable settings at {:?}", self.config_path);
            }
        }
        Settings::default()
    }

    pub fn save(&self, settings: &Settings) -> io::Result<()> {
        // Ensure directory exists
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(settings)?;
        fs::write(&self.config_path, content)
    }
}

/// Process configuration taken from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub config_dir: PathBuf,
    /// Origin the monitoring app is served from; decides secure context
    pub origin: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let config_dir = lookup(CONFIG_DIR_VAR)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                let home = lookup("HOME")
                    .or_else(|| lookup("USERPROFILE"))
                    .unwrap_or_else(|| ".".to_string());
                PathBuf::from(home).join(".config/warning-notifier")
            });
        let origin = lookup(ORIGIN_VAR)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_ORIGIN.to_string());
        Self { config_dir, origin }
    }

    /// Scope the background channel is installed under
    pub fn channel_scope(&self) -> String {
        format!("{}/", self.origin.trim_end_matches('/'))
    }
}
