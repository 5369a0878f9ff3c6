//! # Config Loader
//!
//! Loads the global `config.toml`, the root of every settings cascade. A missing
//! file is not an error: it yields an empty configuration.
use crate::{core::paths, models::GlobalConfig};
use std::{fs, io::ErrorKind, path::Path};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Filesystem Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Path error: {0}")]
    Path(#[from] paths::PathError),
    #[error("Error parsing TOML in '{path}': {source}")]
    TomlParse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Loads the global configuration from the default location.
pub fn load_global_config() -> Result<GlobalConfig, ConfigError> {
    let path = paths::get_global_config_path()?;
    load_global_config_from(&path)
}

/// Loads the global configuration from `path`.
pub fn load_global_config_from(path: &Path) -> Result<GlobalConfig, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log::debug!(
                "No global config at '{}'. Using defaults.",
                path.display()
            );
            return Ok(GlobalConfig::default());
        }
        Err(e) => return Err(e.into()),
    };

    toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
        path: path.display().to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_missing_config_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_global_config_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, GlobalConfig::default());
    }

    #[test]
    fn test_config_with_store_path_and_theme() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"theme = \"tokyonight\"\nstore_path = \"~/devtree/store.bin\"\n")
            .unwrap();
        file.flush().unwrap();

        let config = load_global_config_from(file.path()).unwrap();
        assert_eq!(config.theme.as_deref(), Some("tokyonight"));
        assert_eq!(config.store_path.as_deref(), Some("~/devtree/store.bin"));
        assert!(config.credentials.is_empty());
    }

    #[test]
    fn test_invalid_toml_reports_path() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"theme = [unclosed").unwrap();
        file.flush().unwrap();

        let err = load_global_config_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse { .. }));
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }
}
