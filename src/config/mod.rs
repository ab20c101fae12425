use crate::core::reconcile::ReconcileMode;
use crate::core::scan::DEFAULT_COOLDOWN_MS;
use crate::db::storage::DEFAULT_QUOTA_BYTES;
use crate::errors::{AppError, AppResult};
use crate::utils::path::expand_tilde;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

const APP_DIR: &str = ".invigilator";
const CONFIG_FILE: &str = "invigilator.conf";
const DB_FILE: &str = "invigilator.sqlite";

/// Keys a complete configuration file carries, in file order.
pub const CONFIG_KEYS: [&str; 8] = [
    "database",
    "api_base_url",
    "request_timeout_ms",
    "offline_enabled",
    "storage_quota_bytes",
    "scan_cooldown_ms",
    "probe_interval_secs",
    "reconcile_mode",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// When false, writes that cannot reach the server fail instead of
    /// being buffered.
    #[serde(default = "default_offline_enabled")]
    pub offline_enabled: bool,
    #[serde(default = "default_storage_quota_bytes")]
    pub storage_quota_bytes: usize,
    #[serde(default = "default_scan_cooldown_ms")]
    pub scan_cooldown_ms: i64,
    #[serde(default = "default_probe_interval_secs")]
    pub probe_interval_secs: u64,
    #[serde(default)]
    pub reconcile_mode: ReconcileMode,
    /// `--offline` on the command line; never written to the file.
    #[serde(skip)]
    pub force_offline: bool,
}

fn default_database() -> String {
    Config::database_file().to_string_lossy().to_string()
}
fn default_api_base_url() -> String {
    "http://localhost:8080/api".to_string()
}
fn default_request_timeout_ms() -> u64 {
    5000
}
fn default_offline_enabled() -> bool {
    true
}
fn default_storage_quota_bytes() -> usize {
    DEFAULT_QUOTA_BYTES
}
fn default_scan_cooldown_ms() -> i64 {
    DEFAULT_COOLDOWN_MS
}
fn default_probe_interval_secs() -> u64 {
    5
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database(),
            api_base_url: default_api_base_url(),
            request_timeout_ms: default_request_timeout_ms(),
            offline_enabled: default_offline_enabled(),
            storage_quota_bytes: default_storage_quota_bytes(),
            scan_cooldown_ms: default_scan_cooldown_ms(),
            probe_interval_secs: default_probe_interval_secs(),
            reconcile_mode: ReconcileMode::default(),
            force_offline: false,
        }
    }
}

impl Config {
    /// Return the standard configuration directory depending on the platform
    pub fn config_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("invigilator")
        } else {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(APP_DIR)
        }
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join(CONFIG_FILE)
    }

    /// Return the full path of the SQLite database
    pub fn database_file() -> PathBuf {
        Self::config_dir().join(DB_FILE)
    }

    /// Load configuration from file, or return defaults if not found.
    /// Missing keys take their default value.
    pub fn load() -> AppResult<Self> {
        Self::load_from(&Self::config_file())
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path).map_err(|_| AppError::ConfigLoad)?;
        let mut cfg: Config = serde_yaml::from_str(&content)?;
        cfg.database = expand_tilde(&cfg.database).to_string_lossy().to_string();
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject values no command could work with.
    pub fn validate(&self) -> AppResult<()> {
        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://")) {
            return Err(AppError::Config(format!(
                "api_base_url must start with http:// or https:// (got '{}')",
                self.api_base_url
            )));
        }
        if self.request_timeout_ms == 0 {
            return Err(AppError::Config("request_timeout_ms must be greater than 0".into()));
        }
        Ok(())
    }

    /// Keys absent from a configuration file's content.
    pub fn missing_fields(content: &str) -> AppResult<Vec<&'static str>> {
        let value: serde_yaml::Value = serde_yaml::from_str(content)?;
        let Some(map) = value.as_mapping() else {
            return Ok(CONFIG_KEYS.to_vec());
        };

        Ok(CONFIG_KEYS
            .iter()
            .copied()
            .filter(|k| !map.contains_key(serde_yaml::Value::String((*k).to_string())))
            .collect())
    }

    pub fn save(&self, path: &Path) -> AppResult<()> {
        let yaml = serde_yaml::to_string(self)?;
        let mut file = fs::File::create(path).map_err(|_| AppError::ConfigSave)?;
        file.write_all(yaml.as_bytes())
            .map_err(|_| AppError::ConfigSave)?;
        Ok(())
    }

    /// Initialize configuration and database files.
    /// Returns the configuration that was written (or would have been, in
    /// test mode).
    pub fn init_all(custom_db: Option<String>, is_test: bool) -> AppResult<Config> {
        let dir = Self::config_dir();

        // DB name: user provided or default
        let db_path = match custom_db {
            Some(name) => {
                let p = expand_tilde(&name);
                if p.is_absolute() { p } else { dir.join(p) }
            }
            None => dir.join(DB_FILE),
        };

        let config = Config {
            database: db_path.to_string_lossy().to_string(),
            ..Config::default()
        };

        if !is_test {
            fs::create_dir_all(&dir)?;
            config.save(&Self::config_file())?;
            println!("✅ Config file: {:?}", Self::config_file());
        }

        if let Some(parent) = db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        Ok(config)
    }
}
