use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;

use crate::view::DisplayDensity;

/// Settings read from `config.toml`. The file is optional and every field
/// falls back to a default.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    /// SQLite file holding the song library.
    pub db_path: Option<PathBuf>,
    /// File the logger appends to while the terminal UI is running.
    pub log_path: Option<PathBuf>,
    /// Argon2 PHC string produced by `arise-worship hash-password`.
    pub admin_password_hash: Option<String>,
    /// Insert the bundled sample songs into an empty library on startup.
    pub seed_samples: bool,
    /// Rows shown in the Latest and Popular lists.
    pub highlight_limit: usize,
    pub default_density: DisplayDensity,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            log_path: None,
            admin_password_hash: None,
            seed_samples: true,
            highlight_limit: 5,
            default_density: DisplayDensity::Normal,
        }
    }
}

impl AppConfig {
    /// Load from `path`, or from the platform config directory when `None`.
    /// A missing file yields defaults; an unreadable or malformed one is
    /// logged and also yields defaults.
    pub fn load(path: Option<&Path>) -> Self {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match config_path() {
                Some(path) => path,
                None => {
                    log::debug!("No config directory available, using defaults");
                    return Self::default();
                }
            },
        };

        if !path.exists() {
            log::debug!("No config file at {}, using defaults", path.display());
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(contents) => match Self::parse(&contents) {
                Ok(config) => {
                    log::info!("Loaded config from {}", path.display());
                    config
                }
                Err(err) => {
                    log::warn!("Failed to parse {}: {}. Using defaults.", path.display(), err);
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!("Failed to read {}: {}. Using defaults.", path.display(), err);
                Self::default()
            }
        }
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    pub fn resolve_db_path(&self) -> PathBuf {
        self.db_path.clone().unwrap_or_else(default_db_path)
    }

    pub fn resolve_log_path(&self) -> PathBuf {
        self.log_path.clone().unwrap_or_else(default_log_path)
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", crate::APP_NAME)
}

fn config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
}

fn data_file(name: &str) -> PathBuf {
    match project_dirs() {
        Some(dirs) => dirs.data_dir().join(name),
        None => PathBuf::from(name),
    }
}

/// Default SQLite location under the platform data directory.
pub fn default_db_path() -> PathBuf {
    data_file("songs.sqlite")
}

pub fn default_log_path() -> PathBuf {
    data_file("arise-worship.log")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = AppConfig::parse("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(config.seed_samples);
        assert_eq!(config.highlight_limit, 5);
        assert_eq!(config.default_density, DisplayDensity::Normal);
    }

    #[test]
    fn parses_every_field() {
        let config = AppConfig::parse(
            r#"
            db_path = "/srv/worship/songs.sqlite"
            log_path = "/tmp/worship.log"
            admin_password_hash = "$argon2id$v=19$m=19456,t=2,p=1$abc$def"
            seed_samples = false
            highlight_limit = 8
            default_density = "compact"
            "#,
        )
        .unwrap();
        assert_eq!(config.resolve_db_path(), PathBuf::from("/srv/worship/songs.sqlite"));
        assert_eq!(config.resolve_log_path(), PathBuf::from("/tmp/worship.log"));
        assert!(config.admin_password_hash.is_some());
        assert!(!config.seed_samples);
        assert_eq!(config.highlight_limit, 8);
        assert_eq!(config.default_density, DisplayDensity::Compact);
    }

    #[test]
    fn rejects_unknown_density() {
        assert!(AppConfig::parse("default_density = \"huge\"").is_err());
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "highlight_limit = \"many\"").unwrap();
        assert_eq!(AppConfig::load(Some(&path)), AppConfig::default());

        fs::write(&path, "seed_samples = false").unwrap();
        assert!(!AppConfig::load(Some(&path)).seed_samples);
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(Some(&dir.path().join("absent.toml")));
        assert_eq!(config, AppConfig::default());
    }
}
