//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/natalis/natalis.toml`
//! 3. Environment variables: `NATALIS_*` prefix

use std::path::PathBuf;

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::application::services::DEFAULT_CUSP_EPSILON;
use crate::domain::Language;

pub const DEFAULT_API_BASE: &str = "http://localhost:8000/api/v4";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the chart service API.
    pub api_base: String,
    /// Label language code (`ES` / `EN`).
    pub language: String,
    /// Wheel rendering theme.
    pub theme: String,
    /// House system code forwarded upstream (Placidus).
    pub house_system: String,
    /// Zodiac type forwarded upstream.
    pub zodiac_type: String,
    /// Geonames account for upstream timezone lookups.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geonames_username: Option<String>,
    /// House-boundary tie-break width, in degrees.
    pub cusp_epsilon: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.into(),
            language: "ES".into(),
            theme: "light".into(),
            house_system: "P".into(),
            zodiac_type: "Tropic".into(),
            geonames_username: None,
            cusp_epsilon: DEFAULT_CUSP_EPSILON,
        }
    }
}

/// Get the global config directory for natalis.
fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "natalis").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("natalis.toml"))
}

impl Settings {
    /// Load settings with the full layering applied.
    pub fn load() -> Result<Self, ApplicationError> {
        let mut builder = Config::builder();
        if let Some(path) = global_config_path() {
            if path.exists() {
                builder = builder.add_source(File::from(path));
            }
        }
        builder = builder.add_source(Environment::with_prefix("NATALIS").try_parsing(true));
        let config = builder.build().map_err(config_err)?;
        config.try_deserialize().map_err(config_err)
    }

    pub fn language(&self) -> Language {
        Language::from_code(&self.language)
    }
}

fn config_err(e: config::ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let s = Settings::default();
        assert_eq!(s.api_base, DEFAULT_API_BASE);
        assert_eq!(s.language(), Language::Es);
        assert_eq!(s.house_system, "P");
        assert!(s.geonames_username.is_none());
        assert!((s.cusp_epsilon - 1.0 / 60.0).abs() < 1e-12);
    }

    #[test]
    fn partial_toml_fills_from_defaults() {
        let s: Settings = toml::from_str("language = \"EN\"\ntheme = \"dark\"").unwrap();
        assert_eq!(s.language(), Language::En);
        assert_eq!(s.theme, "dark");
        assert_eq!(s.api_base, DEFAULT_API_BASE);
    }
}
