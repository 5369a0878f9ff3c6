// src/core/paths.rs

use crate::constants::{CONFIG_DIR_ENV, CONFIG_DIR_NAME, GLOBAL_CONFIG_FILENAME, STORE_FILENAME};
use lazy_static::lazy_static;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

lazy_static! {
    static ref CONFIG_DIR: Mutex<Option<PathBuf>> = Mutex::new(None);
}

#[derive(Error, Debug)]
pub enum PathError {
    #[error("Could not find system config directory.")]
    ConfigDirNotFound,
    #[error("Could not create config directory at '{path}': {source}")]
    ConfigDirCreation {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to expand path template '{template}': {reason}")]
    Expansion { template: String, reason: String },
}

/// Returns the path to the devtree configuration directory (`~/.config/devtree`),
/// or `$DEVTREE_CONFIG_DIR` when set. Creates it if it doesn't exist.
///
/// The first call computes and caches the path; subsequent calls return the cached value.
pub fn get_config_dir() -> Result<PathBuf, PathError> {
    let mut cached_path_guard = CONFIG_DIR.lock().unwrap_or_else(|e| e.into_inner());

    if let Some(path) = &*cached_path_guard {
        return Ok(path.clone());
    }

    let config_path = match std::env::var_os(CONFIG_DIR_ENV) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => dirs::config_dir()
            .ok_or(PathError::ConfigDirNotFound)?
            .join(CONFIG_DIR_NAME),
    };

    ensure_dir(&config_path)?;
    log::debug!("Using config directory '{}'.", config_path.display());

    *cached_path_guard = Some(config_path.clone());
    Ok(config_path)
}

/// Returns the path to the global `config.toml` file.
pub fn get_global_config_path() -> Result<PathBuf, PathError> {
    get_config_dir().map(|dir| dir.join(GLOBAL_CONFIG_FILENAME))
}

/// Resolves the store file location: the configured template if any, else
/// `<config dir>/store.bin`.
pub fn resolve_store_path(template: Option<&str>) -> Result<PathBuf, PathError> {
    match template {
        Some(t) => expand_path_template(t),
        None => get_config_dir().map(|dir| dir.join(STORE_FILENAME)),
    }
}

/// Expands `~` and environment variables (`$VAR`) in a path template.
pub fn expand_path_template(template: &str) -> Result<PathBuf, PathError> {
    let expanded = shellexpand::full(template).map_err(|e| PathError::Expansion {
        template: template.to_string(),
        reason: e.to_string(),
    })?;
    Ok(PathBuf::from(expanded.into_owned()))
}

/// Canonicalizes `path` if it exists, leaving it untouched otherwise.
pub fn normalize_source_path(path: &Path) -> PathBuf {
    dunce::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

fn ensure_dir(path: &Path) -> Result<(), PathError> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(|e| PathError::ConfigDirCreation {
            path: path.display().to_string(),
            source: e,
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_path_template_plain_path_is_unchanged() {
        let path = expand_path_template("/var/lib/devtree/store.bin").unwrap();
        assert_eq!(path, PathBuf::from("/var/lib/devtree/store.bin"));
    }

    #[test]
    fn test_expand_path_template_rejects_undefined_variable() {
        let result = expand_path_template("$DEVTREE_SURELY_UNDEFINED_VAR_42/store.bin");
        assert!(matches!(result, Err(PathError::Expansion { .. })));
    }

    #[test]
    fn test_normalize_source_path_keeps_missing_paths() {
        let missing = Path::new("/definitely/not/here/src");
        assert_eq!(normalize_source_path(missing), missing.to_path_buf());
    }

    #[test]
    fn test_normalize_source_path_canonicalizes_existing_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let dotted = dir.path().join(".");
        let normalized = normalize_source_path(&dotted);
        assert_eq!(normalized, dunce::canonicalize(dir.path()).unwrap());
    }
}
