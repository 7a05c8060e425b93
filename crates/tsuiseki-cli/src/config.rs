use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::CliError;

const DEFAULT_CONFIG: &str = include_str!("../../../config/default.toml");

/// Top-level CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub anilist: AniListConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AniListConfig {
    pub endpoint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default)]
    pub strict_graphql_errors: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    pub filter: String,
}

impl Config {
    /// Load config from `path`, or from the user config file if it exists,
    /// or fall back to built-in defaults.
    ///
    /// An explicitly given path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, CliError> {
        match path {
            Some(path) => Self::read(path),
            None => {
                let user_path = Self::config_path();
                if user_path.exists() {
                    Self::read(&user_path)
                } else {
                    Self::defaults()
                }
            }
        }
    }

    fn read(path: &Path) -> Result<Self, CliError> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::Config(format!("{}: {e}", path.display())))
    }

    fn defaults() -> Result<Self, CliError> {
        toml::from_str(DEFAULT_CONFIG).map_err(|e| CliError::Config(e.to_string()))
    }

    /// Write this config to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), CliError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| CliError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Path to user config file (XDG on Linux, AppData on Windows).
    pub fn config_path() -> PathBuf {
        ProjectDirs::from("", "", "tsuiseki")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }
}

impl Default for Config {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("built-in default config is valid TOML")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses() {
        let config = Config::default();
        assert_eq!(config.anilist.endpoint, "https://graphql.anilist.co");
        assert!(config.anilist.access_token.is_none());
        assert!(!config.anilist.strict_graphql_errors);
        assert_eq!(config.log.filter, "tsuiseki=info,tsuiseki_api=warn");
    }

    #[test]
    fn test_roundtrip() {
        let mut config = Config::default();
        config.anilist.access_token = Some("token".into());
        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(deserialized.anilist.access_token.as_deref(), Some("token"));
        assert_eq!(deserialized.anilist.endpoint, config.anilist.endpoint);
    }

    #[test]
    fn test_missing_optional_keys_use_defaults() {
        let config: Config = toml::from_str(
            r#"
            [anilist]
            endpoint = "http://localhost:4000/graphql"

            [log]
            filter = "debug"
            "#,
        )
        .unwrap();
        assert!(config.anilist.access_token.is_none());
        assert!(!config.anilist.strict_graphql_errors);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.anilist.strict_graphql_errors = true;
        config.save(&path).unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert!(loaded.anilist.strict_graphql_errors);
    }

    #[test]
    fn test_explicit_missing_path_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, CliError::Io(_)));
    }
}
