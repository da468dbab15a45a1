//! CLI argument validation functions
//!
//! Custom value parsers for arguments clap cannot check on its own.

use std::fs;
use std::path::PathBuf;

/// Longest per-message timeout accepted on the command line
const MAX_TIMEOUT_SECS: u64 = 3600;

/// Validate the per-message timeout is a whole number of seconds in 1..=3600
pub fn validate_timeout(timeout_str: &str) -> Result<u64, String> {
    let timeout: u64 = timeout_str.parse().map_err(|_| {
        format!(
            "Timeout must be a whole number of seconds, got: '{}'",
            timeout_str
        )
    })?;

    if timeout == 0 {
        return Err("Timeout must be greater than 0 seconds".to_string());
    }

    if timeout > MAX_TIMEOUT_SECS {
        return Err(format!(
            "Timeout cannot exceed {} seconds",
            MAX_TIMEOUT_SECS
        ));
    }

    Ok(timeout)
}

/// Validate a NATS subject: non-empty, no whitespace, no empty tokens
pub fn validate_subject(subject_str: &str) -> Result<String, String> {
    if subject_str.trim().is_empty() {
        return Err("Subject cannot be empty".to_string());
    }

    if subject_str.chars().any(char::is_whitespace) {
        return Err(format!("Subject cannot contain whitespace: '{}'", subject_str));
    }

    if subject_str.split('.').any(str::is_empty) {
        return Err(format!("Subject cannot contain empty tokens: '{}'", subject_str));
    }

    Ok(subject_str.to_string())
}

/// Validate that a file path is accessible (exists and is readable)
pub fn validate_config_file_path(path_str: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(path_str);

    if !path.exists() {
        return Err(format!("Configuration file does not exist: '{}'", path_str));
    }

    if !path.is_file() {
        return Err(format!("Configuration path is not a file: '{}'", path_str));
    }

    match fs::File::open(&path) {
        Ok(_) => Ok(path),
        Err(e) => Err(format!(
            "Cannot read configuration file '{}': {}",
            path_str, e
        )),
    }
}
