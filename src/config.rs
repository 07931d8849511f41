//! Application-level configuration loading: admin credentials and upload location.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "BID_BAZAAR_CONFIG_PATH";
/// Environment variable overriding the admin username.
const ADMIN_USER_ENV: &str = "BID_BAZAAR_ADMIN_USER";
/// Environment variable overriding the admin password.
const ADMIN_PASSWORD_ENV: &str = "BID_BAZAAR_ADMIN_PASSWORD";

const DEFAULT_ADMIN_USER: &str = "admin";
const DEFAULT_ADMIN_PASSWORD: &str = "admin";
const DEFAULT_UPLOAD_DIR: &str = "uploads";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    admin_username: String,
    admin_password: String,
    upload_dir: PathBuf,
}

impl AppConfig {
    /// Build a configuration from explicit values.
    pub fn new(
        admin_username: impl Into<String>,
        admin_password: impl Into<String>,
        upload_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            admin_username: admin_username.into(),
            admin_password: admin_password.into(),
            upload_dir: upload_dir.into(),
        }
    }

    /// Load the configuration from disk, falling back to built-in defaults,
    /// then apply the environment overrides.
    pub fn load() -> Self {
        let path = resolve_config_path();
        let config = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    info!(path = %path.display(), "loaded configuration file");
                    raw.into()
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        };

        let config = config.with_overrides(
            env::var(ADMIN_USER_ENV).ok(),
            env::var(ADMIN_PASSWORD_ENV).ok(),
        );
        if config.admin_password == DEFAULT_ADMIN_PASSWORD {
            warn!("admin password is the built-in default; set {ADMIN_PASSWORD_ENV}");
        }
        config
    }

    fn with_overrides(mut self, username: Option<String>, password: Option<String>) -> Self {
        if let Some(username) = username.filter(|value| !value.is_empty()) {
            self.admin_username = username;
        }
        if let Some(password) = password.filter(|value| !value.is_empty()) {
            self.admin_password = password;
        }
        self
    }

    /// Whether the given credentials match the configured admin account.
    pub fn check_admin(&self, username: &str, password: &str) -> bool {
        self.admin_username == username && self.admin_password == password
    }

    /// Directory where uploaded product images are written and served from.
    pub fn upload_dir(&self) -> &PathBuf {
        &self.upload_dir
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ADMIN_USER, DEFAULT_ADMIN_PASSWORD, DEFAULT_UPLOAD_DIR)
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default)]
    admin: Option<RawAdmin>,
    #[serde(default)]
    upload_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct RawAdmin {
    username: String,
    password: String,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = Self::default();
        let (admin_username, admin_password) = match value.admin {
            Some(admin) => (admin.username, admin.password),
            None => (defaults.admin_username, defaults.admin_password),
        };
        Self {
            admin_username,
            admin_password,
            upload_dir: value.upload_dir.unwrap_or(defaults.upload_dir),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
