use crate::error::{AppError, Result};
use crate::models::{Credentials, Projection, SpreadsheetRef, Visibility};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

const CONFIG_DIR_PREFIX: &str = "sheetfeed";

pub const SPREADSHEET_FEED_URL: &str = "https://spreadsheets.google.com/feeds/spreadsheets";
pub const WORKSHEET_FEED_URL: &str = "https://spreadsheets.google.com/feeds/worksheets";

// Courtesy pause between row inserts; never shorter than this.
pub const MIN_ROW_DELAY: Duration = Duration::from_millis(1);

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    pub spreadsheet: SpreadsheetConfig,
    #[serde(default)]
    pub credentials: CredentialsConfig,
    #[serde(default)]
    pub endpoints: Endpoints,
    #[serde(default)]
    pub write: WriteConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct SpreadsheetConfig {
    pub key: String,
    pub title: String,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub projection: Projection,
}

impl SpreadsheetConfig {
    pub fn spreadsheet_ref(&self) -> SpreadsheetRef {
        SpreadsheetRef::with_access(
            self.key.clone(),
            self.title.clone(),
            self.visibility,
            self.projection,
        )
    }
}

#[derive(Serialize, Deserialize, Clone, Default)]
pub struct CredentialsConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub token: Option<String>,
}

impl CredentialsConfig {
    pub fn credentials(&self) -> Credentials {
        Credentials::resolve(
            self.username.clone(),
            self.password.clone(),
            self.token.clone(),
        )
    }
}

impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(&self.credentials(), f)
    }
}

/// Feed scopes the client builds its URLs from.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Endpoints {
    pub spreadsheets: String,
    pub worksheets: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            spreadsheets: SPREADSHEET_FEED_URL.to_string(),
            worksheets: WORKSHEET_FEED_URL.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct WriteConfig {
    pub row_delay_ms: u64,
}

impl Default for WriteConfig {
    fn default() -> Self {
        Self { row_delay_ms: 1 }
    }
}

impl WriteConfig {
    pub fn row_delay(&self) -> Duration {
        Duration::from_millis(self.row_delay_ms).max(MIN_ROW_DELAY)
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_file()?;

        if !config_path.exists() {
            return Err(AppError::Config(format!(
                "Config file not found at {:?}. Please create one.",
                config_path
            )));
        }

        let contents = fs::read_to_string(&config_path)?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {}", e)))?;

        if config.spreadsheet.key.is_empty() || config.spreadsheet.title.is_empty() {
            return Err(AppError::Config(
                "Spreadsheet key and title must be set in config file".to_string(),
            ));
        }

        Ok(config)
    }

    fn xdg_dirs() -> xdg::BaseDirectories {
        xdg::BaseDirectories::with_prefix(CONFIG_DIR_PREFIX)
    }

    /// Get the config file path
    pub fn config_file() -> Result<PathBuf> {
        let xdg_dirs = Self::xdg_dirs();
        xdg_dirs
            .place_config_file("config.toml")
            .map_err(|e| AppError::Config(format!("Failed to create config directory: {}", e)))
    }
}
