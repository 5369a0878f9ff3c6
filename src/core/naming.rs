// src/core/naming.rs

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

/// Longest name accepted for any entity.
pub const MAX_NAME_LEN: usize = 64;

lazy_static! {
    static ref NAME_RE: Regex = Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").unwrap();
    static ref CREDENTIAL_RE: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum NameError {
    #[error("Names cannot be empty.")]
    Empty,
    #[error("'{name}' is longer than {max} characters.")]
    TooLong { name: String, max: usize },
    #[error(
        "'{name}' is not a valid name. Use letters, digits, '.', '_' or '-', starting with a letter or digit."
    )]
    Invalid { name: String },
    #[error("'{name}' is not a valid credential name. Use an environment variable name, e.g. 'API_KEY'.")]
    InvalidCredential { name: String },
}

/// Checks an entity name and returns it trimmed.
pub fn validate_entity_name(raw: &str) -> Result<String, NameError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(NameError::Empty);
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(NameError::TooLong {
            name: name.to_string(),
            max: MAX_NAME_LEN,
        });
    }
    if !NAME_RE.is_match(name) {
        return Err(NameError::Invalid {
            name: name.to_string(),
        });
    }
    Ok(name.to_string())
}

/// Credential names double as environment variable names.
pub fn validate_credential_name(raw: &str) -> Result<String, NameError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(NameError::Empty);
    }
    if !CREDENTIAL_RE.is_match(name) {
        return Err(NameError::InvalidCredential {
            name: name.to_string(),
        });
    }
    Ok(name.to_string())
}
