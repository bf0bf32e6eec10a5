use std::path::PathBuf;

use directories::ProjectDirs;
use serde::Deserialize;

use crate::client::API_ENDPOINT;
use crate::error::{LinearError, Result};

#[derive(Deserialize, Default, Debug)]
pub struct Config {
    pub api_key: Option<String>,
    pub api_url: Option<String>,
    pub default_team: Option<String>,
    pub cursor_file: Option<PathBuf>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(Config::default());
        }

        let contents =
            std::fs::read_to_string(&config_path).map_err(|e| LinearError::ConfigRead {
                path: config_path.clone(),
                source: e,
            })?;

        Self::parse(&contents).map_err(|e| LinearError::ConfigParse {
            path: config_path,
            source: e,
        })
    }

    fn parse(contents: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    pub fn config_path() -> Result<PathBuf> {
        ProjectDirs::from("", "", "linear-triggers")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .ok_or(LinearError::NoConfigDir)
    }

    /// Get API key with env var taking precedence over config file
    pub fn api_key(&self) -> Result<String> {
        if let Ok(key) = std::env::var("LINEAR_API_KEY") {
            return Ok(key);
        }

        self.api_key.clone().ok_or(LinearError::MissingApiKey)
    }

    pub fn api_url(&self) -> String {
        std::env::var("LINEAR_API_URL")
            .ok()
            .or_else(|| self.api_url.clone())
            .unwrap_or_else(|| API_ENDPOINT.to_string())
    }

    /// Cursor file, defaulting to `cursors.json` beside the config file.
    pub fn cursor_path(&self) -> Result<PathBuf> {
        match &self.cursor_file {
            Some(path) => Ok(path.clone()),
            None => Self::config_path().map(|p| p.with_file_name("cursors.json")),
        }
    }

    /// Get team, preferring explicit argument over default
    pub fn resolve_team(&self, explicit: Option<&str>) -> Option<String> {
        explicit
            .map(String::from)
            .or_else(|| self.default_team.clone())
    }
}
