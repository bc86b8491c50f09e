use crate::services::google_calendar::DEFAULT_API_BASE;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable holding the destination bearer token.
pub const TOKEN_ENV: &str = "GOOGLE_CALENDAR_TOKEN";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub import: ImportConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Destination calendar events are imported into.
    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self { calendar_id: default_calendar_id() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Overrides the guessed local timezone (IANA name).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self { time_zone: None, api_base: default_api_base() }
    }
}

fn default_calendar_id() -> String {
    "primary".to_string()
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&get_config_path()?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&get_config_path()?)
    }

    /// Read the config at `path`, writing the defaults there first if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let default_config = Config::default();
            default_config.save_to(path)?;
            return Ok(default_config);
        }

        let content = fs::read_to_string(path).context("Failed to read config file")?;
        toml::from_str(&content).context("Failed to parse config file")
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Validate and store the timezone override.
    pub fn set_time_zone(&mut self, name: &str) -> Result<()> {
        name.parse::<chrono_tz::Tz>()
            .map_err(|_| anyhow::anyhow!("Unknown timezone '{}'", name))?;
        self.import.time_zone = Some(name.to_string());
        Ok(())
    }
}

pub fn get_config_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("com", "ics-importer", "ics-importer")
        .context("Failed to determine config directory")?;

    Ok(proj_dirs.config_dir().join("config.toml"))
}

/// Bearer token from the environment (a `.env` file is loaded by the binary).
pub fn load_token() -> Result<SecretString> {
    let token = std::env::var(TOKEN_ENV)
        .with_context(|| format!("{} environment variable not set", TOKEN_ENV))?;
    if token.trim().is_empty() {
        anyhow::bail!("{} is empty", TOKEN_ENV);
    }
    Ok(SecretString::from(token.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.calendar.calendar_id, "primary");
        assert_eq!(config.import.time_zone, None);
        assert_eq!(config.import.api_base, "https://www.googleapis.com/calendar/v3");
    }

    #[test]
    fn test_config_save_load() -> Result<()> {
        let temp_dir = tempdir()?;
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.calendar.calendar_id = "team@group.calendar.google.com".to_string();
        config.set_time_zone("Europe/Berlin")?;
        config.save_to(&config_path)?;

        let loaded = Config::load_from(&config_path)?;
        assert_eq!(loaded, config);

        Ok(())
    }

    #[test]
    fn test_missing_config_is_created() -> Result<()> {
        let temp_dir = tempdir()?;
        let config_path = temp_dir.path().join("config.toml");

        let loaded = Config::load_from(&config_path)?;
        assert_eq!(loaded, Config::default());
        assert!(config_path.exists());

        Ok(())
    }

    #[test]
    fn test_partial_config_uses_defaults() -> Result<()> {
        let temp_dir = tempdir()?;
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "[import]\ntime_zone = \"Asia/Tokyo\"\n")?;

        let loaded = Config::load_from(&config_path)?;
        assert_eq!(loaded.calendar.calendar_id, "primary");
        assert_eq!(loaded.import.time_zone.as_deref(), Some("Asia/Tokyo"));
        assert_eq!(loaded.import.api_base, DEFAULT_API_BASE);

        Ok(())
    }

    #[test]
    fn test_rejects_unknown_timezone() {
        let mut config = Config::default();
        assert!(config.set_time_zone("Mars/Olympus_Mons").is_err());
        assert_eq!(config.import.time_zone, None);
    }
}
