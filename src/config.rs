/// Application configuration
///
/// Where the comment database and saved photos live. Resolution order:
/// an explicit directory (command line), then `SIGHTINGS_DATA_DIR`, then
/// the user's data directory:
/// - Linux: ~/.local/share/wildlife-sightings
/// - macOS: ~/Library/Application Support/wildlife-sightings
/// - Windows: %APPDATA%\wildlife-sightings

use std::path::{Path, PathBuf};

use thiserror::Error;

pub const DATA_DIR_ENV: &str = "SIGHTINGS_DATA_DIR";

const APP_DIR: &str = "wildlife-sightings";
const DB_FILE: &str = "sightings.db";
const MEDIA_DIR: &str = "media";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine user data directory")]
    NoDataDir,

    #[error("failed to create {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub database_path: PathBuf,
    pub media_dir: PathBuf,
}

impl Config {
    /// Lay out all paths under `data_dir`
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            database_path: data_dir.join(DB_FILE),
            media_dir: data_dir.join(MEDIA_DIR),
            data_dir,
        }
    }

    /// Resolve the data directory from `explicit`, the environment, or the platform default
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(dir) = explicit {
            return Ok(Self::with_data_dir(anchored(dir)));
        }
        if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self::with_data_dir(anchored(Path::new(&dir))));
        }
        let mut path = dirs::data_dir()
            .or_else(dirs::home_dir)
            .ok_or(ConfigError::NoDataDir)?;
        path.push(APP_DIR);
        Ok(Self::with_data_dir(path))
    }

    /// Create the data and media directories if missing
    pub fn ensure_dirs(&self) -> Result<(), ConfigError> {
        for dir in [&self.data_dir, &self.media_dir] {
            std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(())
    }
}

/// Relative directories are taken from the current directory
fn anchored(dir: &Path) -> PathBuf {
    std::path::absolute(dir).unwrap_or_else(|_| dir.to_path_buf())
}
