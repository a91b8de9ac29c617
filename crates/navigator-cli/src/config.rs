use navigator_core::error::NavigatorError;
use navigator_core::host::TrashOption;
use navigator_core::settings::NavigatorSettings;
use std::path::{Path, PathBuf};

/// File name of the settings document inside the vault.
pub const SETTINGS_FILE: &str = ".note-navigator.json";

/// Resolved command-line configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Vault root directory
    pub vault_path: PathBuf,
    /// Where plugin settings and statistics are stored
    pub settings_path: PathBuf,
    /// Explorer sort order to emulate (raw host value)
    pub sort_order: Option<String>,
    pub trash_option: TrashOption,
}

impl Config {
    /// Resolve paths (supports ~ for the home directory) and parse the trash option.
    pub fn new(
        vault: &str,
        settings: Option<&str>,
        sort_order: Option<String>,
        trash: &str,
    ) -> Result<Self, ConfigError> {
        let vault_path = expand_tilde(vault);
        if !vault_path.is_dir() {
            return Err(ConfigError::VaultNotFound(vault_path));
        }

        let settings_path = match settings {
            Some(path) => expand_tilde(path),
            None => vault_path.join(SETTINGS_FILE),
        };

        let trash_option = trash
            .parse::<TrashOption>()
            .map_err(|_| ConfigError::InvalidTrashOption(trash.to_string()))?;

        Ok(Self {
            vault_path,
            settings_path,
            sort_order,
            trash_option,
        })
    }

    /// Load settings, falling back to defaults when the file doesn't exist yet.
    pub async fn load_settings(&self) -> Result<NavigatorSettings, ConfigError> {
        load_settings(&self.settings_path).await
    }
}

pub async fn load_settings(path: &Path) -> Result<NavigatorSettings, ConfigError> {
    match tokio::fs::read_to_string(path).await {
        Ok(json) => NavigatorSettings::from_json(&json).map_err(|source| ConfigError::ParseSettings {
            path: path.to_path_buf(),
            source,
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No settings at {}, using defaults", path.display());
            Ok(NavigatorSettings::default())
        }
        Err(source) => Err(ConfigError::ReadSettings {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Expand ~ or ~/ prefix to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if path == "~" {
        dirs::home_dir().unwrap_or_else(|| PathBuf::from("~"))
    } else if let Some(rest) = path.strip_prefix("~/") {
        dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(path))
    } else {
        PathBuf::from(path)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Vault directory not found: {}", .0.display())]
    VaultNotFound(PathBuf),

    #[error("Unknown trash option {0:?} (expected local, system or none)")]
    InvalidTrashOption(String),

    #[error("Failed to read settings from {}: {source}", .path.display())]
    ReadSettings {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid settings in {}: {source}", .path.display())]
    ParseSettings {
        path: PathBuf,
        source: NavigatorError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn settings_default_to_the_vault() {
        let dir = TempDir::new().unwrap();
        let vault = dir.path().to_str().unwrap();

        let config = Config::new(vault, None, None, "local").unwrap();
        assert_eq!(config.settings_path, dir.path().join(SETTINGS_FILE));
        assert_eq!(config.trash_option, TrashOption::Local);
    }

    #[test]
    fn rejects_missing_vault_and_bad_trash_option() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");

        assert!(matches!(
            Config::new(missing.to_str().unwrap(), None, None, "local"),
            Err(ConfigError::VaultNotFound(_))
        ));
        assert!(matches!(
            Config::new(dir.path().to_str().unwrap(), None, None, "shred"),
            Err(ConfigError::InvalidTrashOption(_))
        ));
    }

    #[test]
    fn expands_home_prefix() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde("~"), home);
            assert_eq!(expand_tilde("~/vault"), home.join("vault"));
        }
        assert_eq!(expand_tilde("/abs/vault"), PathBuf::from("/abs/vault"));
    }

    #[tokio::test]
    async fn missing_settings_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = load_settings(&dir.path().join("none.json")).await.unwrap();
        assert_eq!(settings, NavigatorSettings::default());
    }

    #[tokio::test]
    async fn malformed_settings_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{oops").unwrap();

        assert!(matches!(
            load_settings(&path).await,
            Err(ConfigError::ParseSettings { .. })
        ));
    }
}
