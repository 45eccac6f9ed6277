//! Configuration management (TOML)

use crate::error::{GovernorError, Result};
use crate::notifier::NotificationMethod;
use crate::sampler::Counter;
use crate::units::parse_size;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub limit: LimitConfig,
    #[serde(default)]
    pub watch: WatchConfig,
    #[serde(default)]
    pub notification: NotificationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub sample_interval_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

/// A byte count written either as an integer or as `"10 GB"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SizeValue {
    Bytes(u64),
    Readable(String),
}

impl SizeValue {
    pub fn to_bytes(&self) -> Result<u64> {
        match self {
            SizeValue::Bytes(n) => Ok(*n),
            SizeValue::Readable(s) => parse_size(s),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitConfig {
    pub limit: SizeValue,
    pub window_secs: u64,
    pub approach_ratio: f64,
    pub counter: Counter,
    pub include_loopback: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub processes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub method: NotificationMethod,
    pub cooldown_secs: u64,
    pub notify_on_resume: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            sample_interval_secs: 5,
            log_file: None,
        }
    }
}

impl Default for LimitConfig {
    fn default() -> Self {
        LimitConfig {
            limit: SizeValue::Readable("10 GB".to_string()),
            window_secs: 24 * 60 * 60,
            approach_ratio: 0.8,
            counter: Counter::Total,
            include_loopback: false,
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        NotificationConfig {
            method: NotificationMethod::Desktop,
            cooldown_secs: 60,
            notify_on_resume: true,
        }
    }
}

/// Validated runtime settings derived from a [`Config`].
#[derive(Debug, Clone)]
pub struct Settings {
    pub sample_interval: Duration,
    pub limit: u64,
    pub window: Duration,
    pub approach_ratio: f64,
    pub counter: Counter,
    pub include_loopback: bool,
    pub processes: Vec<String>,
    pub notification_method: NotificationMethod,
    pub notification_cooldown: Duration,
    pub notify_on_resume: bool,
    pub log_file: Option<PathBuf>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    /// Defaults plus a placeholder watch-list, written by `--init` so the
    /// file is valid as-is and shows where process names go.
    pub fn template() -> Self {
        let mut config = Config::default();
        config.watch.processes = vec!["replace-with-process-name".to_string()];
        config
    }

    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("", "", "traffic-governor")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Process names lowercased and trimmed, blanks and duplicates removed,
    /// first occurrence order kept.
    pub fn watch_list(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for name in &self.watch.processes {
            let name = name.trim().to_lowercase();
            if !name.is_empty() && !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    pub fn validate(&self) -> Result<Settings> {
        if self.general.sample_interval_secs == 0 {
            return Err(GovernorError::config("sample_interval_secs must be positive"));
        }
        if self.limit.window_secs == 0 {
            return Err(GovernorError::config("window_secs must be positive"));
        }
        if self.general.sample_interval_secs > self.limit.window_secs {
            return Err(GovernorError::config(format!(
                "sample_interval_secs ({}) is longer than window_secs ({})",
                self.general.sample_interval_secs, self.limit.window_secs
            )));
        }
        let limit = self.limit.limit.to_bytes()?;
        if limit == 0 {
            return Err(GovernorError::config("limit must be positive"));
        }
        let ratio = self.limit.approach_ratio;
        if !(ratio > 0.0 && ratio < 1.0) {
            return Err(GovernorError::config(format!(
                "approach_ratio must be between 0 and 1 (exclusive), got {}",
                ratio
            )));
        }
        let processes = self.watch_list();
        if processes.is_empty() {
            return Err(GovernorError::config(
                "no processes to watch; list them under [watch] processes",
            ));
        }

        Ok(Settings {
            sample_interval: Duration::from_secs(self.general.sample_interval_secs),
            limit,
            window: Duration::from_secs(self.limit.window_secs),
            approach_ratio: ratio,
            counter: self.limit.counter,
            include_loopback: self.limit.include_loopback,
            processes,
            notification_method: self.notification.method,
            notification_cooldown: Duration::from_secs(self.notification.cooldown_secs),
            notify_on_resume: self.notification.notify_on_resume,
            log_file: self.general.log_file.clone(),
        })
    }
}
