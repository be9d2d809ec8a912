//! Handles settings for the application. Configuration is read from an
//! optional `settings.toml` and from environment variables such as
//! `TABSHARE_APP__LEVEL`, the latter taking precedence.
use std::path::Path;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::Result;

pub const DEFAULT_CONFIG_PATH: &str = "settings";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Book {
    pub path: String,
}

impl Default for Book {
    fn default() -> Self {
        Self {
            path: "activities.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub book: Book,
}

impl Settings {
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let file = match config_path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_PATH).required(false),
        };
        let settings = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix("TABSHARE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
