//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::PathBuf;

/// Default API base URL when nothing else is configured
const DEFAULT_API_URL: &str = "http://localhost:5000/api";

/// crmkit configuration with layered hierarchy
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the CRM REST API
    pub api_url: Option<String>,

    /// Bearer token sent with every gateway request
    pub api_key: Option<String>,

    /// Directory for the local store database
    pub data_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/crmkit/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                if let Ok(contents) = std::fs::read_to_string(&global_path) {
                    if let Ok(global) = serde_yml::from_str::<Config>(&contents) {
                        config.merge(global);
                    }
                }
            }
        }

        // 3. Environment variables
        if let Ok(url) = std::env::var("CRMKIT_API_URL") {
            config.api_url = Some(url);
        }
        if let Ok(key) = std::env::var("CRMKIT_API_KEY") {
            config.api_key = Some(key);
        }
        if let Ok(dir) = std::env::var("CRMKIT_DATA_DIR") {
            config.data_dir = Some(PathBuf::from(dir));
        }

        config
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "crmkit")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.api_url.is_some() {
            self.api_url = other.api_url;
        }
        if other.api_key.is_some() {
            self.api_key = other.api_key;
        }
        if other.data_dir.is_some() {
            self.data_dir = other.data_dir;
        }
    }

    /// API base URL, falling back to the localhost default
    pub fn api_url(&self) -> String {
        self.api_url
            .clone()
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    /// Path of the local store database file
    pub fn local_db_path(&self) -> PathBuf {
        if let Some(dir) = &self.data_dir {
            return dir.join("local.db");
        }
        directories::ProjectDirs::from("", "", "crmkit")
            .map(|dirs| dirs.data_dir().join("local.db"))
            .unwrap_or_else(|| PathBuf::from(".crmkit-local.db"))
    }
}
