use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "Promocite";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Settings file looked up in the working directory when none is given.
pub const DEFAULT_SETTINGS_FILE: &str = "promocite.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid rule configuration: {0}")]
    InvalidRules(String),

    #[error("API key file {0} is empty")]
    EmptyApiKey(PathBuf),
}

/// Get the application data directory.
/// Falls back to the working directory when the platform has no data dir.
pub fn app_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("promocite")
}

/// Default log filter when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "promocite=info,promocite_lib=info"
}

/// Roster API connection settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiSettings {
    pub base_url: String,
    /// File whose first line is the bearer token.
    pub api_key_file: PathBuf,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

/// Runtime settings: where rules, templates and fonts live, and where
/// generated citations go.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub rules_path: PathBuf,
    pub templates_dir: PathBuf,
    pub fonts_dir: PathBuf,
    pub output_root: PathBuf,
    pub template_extension: String,
    pub output_extension: String,
    pub jpeg_quality: u8,
    pub api: Option<ApiSettings>,
}

impl Default for Settings {
    fn default() -> Self {
        let base = app_data_dir();
        Self {
            rules_path: base.join("config.json"),
            templates_dir: base.join("templates"),
            fonts_dir: base.join("fonts"),
            output_root: base.join("generatedCitations"),
            template_extension: "jpeg".into(),
            output_extension: "jpeg".into(),
            jpeg_quality: 90,
            api: None,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file. Relative paths inside the file are
    /// resolved against the file's own directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut settings: Settings =
            serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        settings.rules_path = resolve(base, &settings.rules_path);
        settings.templates_dir = resolve(base, &settings.templates_dir);
        settings.fonts_dir = resolve(base, &settings.fonts_dir);
        settings.output_root = resolve(base, &settings.output_root);
        if let Some(api) = settings.api.as_mut() {
            api.api_key_file = resolve(base, &api.api_key_file);
        }

        tracing::debug!(path = %path.display(), "Settings loaded");
        Ok(settings)
    }
}

impl ApiSettings {
    /// Read the bearer token (first line of the key file).
    pub fn read_api_key(&self) -> Result<String, ConfigError> {
        let raw = fs::read_to_string(&self.api_key_file).map_err(|source| ConfigError::Io {
            path: self.api_key_file.clone(),
            source,
        })?;
        let key = raw.lines().next().unwrap_or("").trim().to_string();
        if key.is_empty() {
            return Err(ConfigError::EmptyApiKey(self.api_key_file.clone()));
        }
        Ok(key)
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
