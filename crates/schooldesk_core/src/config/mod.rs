use crate::bucket::Bucket;
use crate::error::AppError;
use crate::query::{Sort, SortDirection, SortKey};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "schooldesk";
const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_ENV_VAR: &str = "SCHOOLDESK_CONFIG_PATH";

#[derive(Debug, Clone)]
pub struct Palette {
    pub accent: &'static str,
    pub alert: &'static str,
    pub muted: &'static str,
    pub reset: &'static str,
}

impl Palette {
    fn paint(&self, color: &str, text: &str) -> String {
        if color.is_empty() {
            text.to_string()
        } else {
            format!("{}{}{}", color, text, self.reset)
        }
    }

    pub fn accentize(&self, text: &str) -> String {
        self.paint(self.accent, text)
    }

    pub fn alertize(&self, text: &str) -> String {
        self.paint(self.alert, text)
    }

    pub fn mutedize(&self, text: &str) -> String {
        self.paint(self.muted, text)
    }

    /// Overdue reads as an alert, due today as the accent, completed as muted.
    pub fn tone(&self, bucket: Bucket, text: &str) -> String {
        match bucket {
            Bucket::Overdue => self.alertize(text),
            Bucket::DueToday => self.accentize(text),
            Bucket::Completed => self.mutedize(text),
            Bucket::Upcoming => text.to_string(),
        }
    }
}

pub fn palette_for_theme(theme: Option<&str>) -> Palette {
    match theme.and_then(canonical_theme_name).as_deref() {
        Some("noir") => Palette {
            accent: "\x1b[38;5;208m",
            alert: "\x1b[38;5;203m",
            muted: "\x1b[38;5;250m",
            reset: "\x1b[0m",
        },
        Some("solarized") => Palette {
            accent: "\x1b[38;5;108m",
            alert: "\x1b[38;5;160m",
            muted: "\x1b[38;5;250m",
            reset: "\x1b[0m",
        },
        _ => Palette {
            accent: "",
            alert: "",
            muted: "",
            reset: "",
        },
    }
}

pub fn canonical_theme_name(raw: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        return Some("default".into());
    }

    match trimmed {
        "vanilla" | "light" => Some("default".to_string()),
        "dark" | "dark_mode" | "darkmode" => Some("noir".to_string()),
        other => Some(other.to_string()),
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub log_level: Option<String>,
    #[serde(default)]
    pub log_dir: Option<String>,
    #[serde(default)]
    pub default_sort: Option<String>,
    #[serde(default)]
    pub default_direction: Option<String>,
}

impl Config {
    /// The list sort configured by `default_sort` and `default_direction`.
    pub fn sort(&self) -> Result<Sort, AppError> {
        let key = match self.default_sort.as_deref() {
            Some(raw) => raw.parse::<SortKey>()?,
            None => SortKey::default(),
        };
        let direction = match self.default_direction.as_deref() {
            Some(raw) => raw.parse::<SortDirection>()?,
            None => SortDirection::default(),
        };
        Ok(Sort::new(key, direction))
    }
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub error: Option<AppError>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub theme: Option<String>,
    pub log_level: Option<String>,
    pub log_dir: Option<String>,
    pub default_sort: Option<String>,
    pub default_direction: Option<String>,
}

impl ConfigOverrides {
    /// Records one `key=value` override. Later values for a key win.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), AppError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(AppError::invalid_input(format!(
                "override value for {key} cannot be empty"
            )));
        }
        let slot = match key.trim().to_ascii_lowercase().as_str() {
            "theme" => &mut self.theme,
            "log_level" => &mut self.log_level,
            "log_dir" => &mut self.log_dir,
            "default_sort" | "sort" => &mut self.default_sort,
            "default_direction" | "direction" => &mut self.default_direction,
            other => {
                return Err(AppError::invalid_input(format!(
                    "unsupported config override key: {other}"
                )));
            }
        };
        *slot = Some(value.to_string());
        Ok(())
    }
}

/// Per-user directory holding the config file and the session snapshot.
pub fn app_dir() -> Result<PathBuf, AppError> {
    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata).join(APP_DIR_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home).join(".config").join(APP_DIR_NAME))
    }
}

pub fn config_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    Ok(app_dir()?.join(CONFIG_FILE_NAME))
}

pub fn load_config_with_fallback() -> ConfigLoad {
    match config_path() {
        Ok(path) => load_config_with_fallback_from_path(&path),
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_with_fallback_from_path(path: &Path) -> ConfigLoad {
    if !path.exists() {
        return ConfigLoad {
            config: Config::default(),
            error: None,
        };
    }

    match load_config_from_path(path) {
        Ok(config) => ConfigLoad {
            config,
            error: None,
        },
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_from_path(path: &Path) -> Result<Config, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    let config: Config = serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })?;
    config.sort().map_err(|err| {
        AppError::invalid_data(format!("{}: {}", path.display(), err.message()))
    })?;
    Ok(normalize_config_theme(config))
}

fn normalize_config_theme(mut config: Config) -> Config {
    config.theme = config.theme.and_then(|name| canonical_theme_name(&name));
    config
}

pub fn merge_overrides(base: &Config, overrides: &ConfigOverrides) -> Config {
    let mut merged = base.clone();
    if let Some(theme) = overrides.theme.as_deref()
        && let Some(normalized) = canonical_theme_name(theme)
    {
        merged.theme = Some(normalized);
    }

    let plain = [
        (&overrides.log_level, &mut merged.log_level),
        (&overrides.log_dir, &mut merged.log_dir),
        (&overrides.default_sort, &mut merged.default_sort),
        (&overrides.default_direction, &mut merged.default_direction),
    ];
    for (value, target) in plain {
        if let Some(value) = value {
            *target = Some(value.clone());
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::{
        Config, ConfigOverrides, canonical_theme_name, load_config_from_path,
        load_config_with_fallback_from_path, merge_overrides, palette_for_theme,
    };
    use crate::bucket::Bucket;
    use crate::query::{Sort, SortDirection, SortKey};
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(file_name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("schooldesk-{nanos}-{file_name}"))
    }

    #[test]
    fn load_config_missing_returns_defaults_without_error() {
        let path = temp_path("missing-config.json");
        let result = load_config_with_fallback_from_path(&path);

        assert_eq!(result.config, Config::default());
        assert!(result.error.is_none());
    }

    #[test]
    fn load_config_invalid_returns_defaults_and_error() {
        let path = temp_path("invalid-config.json");
        fs::write(&path, "{ invalid json ").unwrap();

        let result = load_config_with_fallback_from_path(&path);
        fs::remove_file(&path).ok();

        assert_eq!(result.config, Config::default());
        assert_eq!(result.error.unwrap().code(), "invalid_data");
    }

    #[test]
    fn load_config_rejects_unknown_sort_key() {
        let path = temp_path("bad-sort-config.json");
        fs::write(&path, r#"{ "default_sort": "colour" }"#).unwrap();

        let result = load_config_with_fallback_from_path(&path);
        fs::remove_file(&path).ok();

        assert_eq!(result.config, Config::default());
        assert!(result.error.unwrap().message().contains("colour"));
    }

    #[test]
    fn load_config_reads_valid_file() {
        let path = temp_path("valid-config.json");
        let content = serde_json::json!({
            "theme": "Dark Mode",
            "log_level": "warn",
            "default_sort": "title",
            "default_direction": "desc"
        });
        fs::write(&path, serde_json::to_string(&content).unwrap()).unwrap();

        let loaded = load_config_from_path(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(loaded.theme.as_deref(), Some("noir"));
        assert_eq!(loaded.log_level.as_deref(), Some("warn"));
        assert_eq!(
            loaded.sort().unwrap(),
            Sort::new(SortKey::Title, SortDirection::Desc)
        );
    }

    #[test]
    fn merge_overrides_layers_without_touching_base() {
        let base = Config {
            theme: Some("default".into()),
            log_level: Some("info".into()),
            default_sort: Some("due".into()),
            ..Config::default()
        };
        let mut overrides = ConfigOverrides::default();
        overrides.set("theme", "dark").unwrap();
        overrides.set("sort", "amount").unwrap();

        let merged = merge_overrides(&base, &overrides);

        assert_eq!(merged.theme.as_deref(), Some("noir"));
        assert_eq!(merged.default_sort.as_deref(), Some("amount"));
        assert_eq!(merged.log_level.as_deref(), Some("info"));
        assert_eq!(base.theme.as_deref(), Some("default"));
        assert_eq!(base.default_sort.as_deref(), Some("due"));
    }

    #[test]
    fn merge_overrides_with_empty_overrides_returns_clone() {
        let base = Config {
            theme: Some("solarized".into()),
            log_dir: Some("/var/log/schooldesk".into()),
            ..Config::default()
        };

        assert_eq!(merge_overrides(&base, &ConfigOverrides::default()), base);
    }

    #[test]
    fn overrides_reject_unknown_keys_and_blank_values() {
        let mut overrides = ConfigOverrides::default();
        assert!(overrides.set("aliases", "ls").is_err());
        assert!(overrides.set("theme", "  ").is_err());
        assert_eq!(overrides, ConfigOverrides::default());
    }

    #[test]
    fn default_sort_is_due_ascending() {
        assert_eq!(
            Config::default().sort().unwrap(),
            Sort::new(SortKey::DueAt, SortDirection::Asc)
        );
    }

    #[test]
    fn canonical_theme_name_maps_variants() {
        assert_eq!(canonical_theme_name("Vanilla"), Some("default".into()));
        assert_eq!(canonical_theme_name("Noir"), Some("noir".into()));
        assert_eq!(canonical_theme_name("Solarized"), Some("solarized".into()));
        assert_eq!(canonical_theme_name("dark-mode"), Some("noir".into()));
        assert_eq!(canonical_theme_name("  "), Some("default".into()));
    }

    #[test]
    fn palette_tones_buckets() {
        let plain = palette_for_theme(Some("vanilla"));
        assert_eq!(plain.tone(Bucket::Overdue, "late"), "late");

        let noir = palette_for_theme(Some("noir"));
        assert_eq!(noir.tone(Bucket::Overdue, "late"), "\x1b[38;5;203mlate\x1b[0m");
        assert_eq!(noir.tone(Bucket::DueToday, "now"), "\x1b[38;5;208mnow\x1b[0m");
        assert_eq!(noir.tone(Bucket::Upcoming, "later"), "later");

        assert!(palette_for_theme(Some("oceanic")).accent.is_empty());
    }
}
