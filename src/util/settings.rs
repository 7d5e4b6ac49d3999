use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;

const APP_QUALIFIER: &str = "ar";
const APP_ORG: &str = "TransporteRioLavayen";
const APP_NAME: &str = "Cotizador";

const DEFAULT_ROUTING_BASE_URL: &str = "https://api.openrouteservice.org";
const DEFAULT_BUCKET: &str = "quotes";

/// Operator settings: routing API credentials and the delivery backend.
/// Loaded from `settings.toml` in the config directory (or an explicit path),
/// then overridden by `COTIZADOR_*` environment variables. A missing file is
/// not an error; commands that need a credential complain when they run.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub routing: RoutingSettings,
    #[serde(default)]
    pub backend: BackendSettings,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct RoutingSettings {
    pub base_url: String,
    pub api_key: Option<String>,
}

impl Default for RoutingSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_ROUTING_BASE_URL.to_string(),
            api_key: None,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub bucket: String,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            bucket: DEFAULT_BUCKET.to_string(),
        }
    }
}

fn settings_file() -> Option<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .map(|dirs| dirs.config_dir().join("settings.toml"))
}

impl Settings {
    /// Load settings from `path`, or from the default config location when
    /// `path` is `None`. Absent files yield defaults; unreadable or invalid
    /// TOML is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let file = match path {
            Some(explicit) => Some(explicit.to_path_buf()),
            None => settings_file(),
        };

        let mut settings = match file {
            Some(file) if file.exists() => {
                let raw = fs::read_to_string(&file)?;
                toml::from_str(&raw)?
            }
            _ => Settings::default(),
        };
        settings.apply_env();
        Ok(settings)
    }

    fn apply_env(&mut self) {
        if let Ok(value) = env::var("COTIZADOR_ROUTING_URL") {
            self.routing.base_url = value;
        }
        if let Ok(value) = env::var("COTIZADOR_ROUTING_API_KEY") {
            self.routing.api_key = Some(value);
        }
        if let Ok(value) = env::var("COTIZADOR_BACKEND_URL") {
            self.backend.base_url = Some(value);
        }
        if let Ok(value) = env::var("COTIZADOR_BACKEND_API_KEY") {
            self.backend.api_key = Some(value);
        }
        if let Ok(value) = env::var("COTIZADOR_BACKEND_BUCKET") {
            self.backend.bucket = value;
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("invalid settings file: {0}")]
    Parse(#[from] toml::de::Error),
}
