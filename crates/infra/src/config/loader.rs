//! Configuration loader
//!
//! Loads client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If `CONFLUENCE_BASE_URL` is not set, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `CONFLUENCE_BASE_URL`: Instance root (required)
//! - `CONFLUENCE_USERNAME`: Basic auth user; unset selects bearer auth
//! - `CONFLUENCE_PASSWORD`: Password, API token or personal access token
//! - `CONFLUENCE_TIMEOUT_SECS`: Per-attempt request timeout
//! - `CONFLUENCE_RETRY_ATTEMPTS`: Attempts per round while rate limited
//! - `CONFLUENCE_RETRY_BASE_DELAY_MS`: First backoff delay
//! - `CONFLUENCE_RETRY_COOL_DOWN_MS`: Wait between retry rounds
//! - `CONFLUENCE_RETRY_MAX_ROUNDS`: Round limit (unbounded when unset)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./confluence.json` or `./confluence.toml` (current working directory)
//! 2. `./config.json` or `./config.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. `../../config.json` or `../../config.toml` (grandparent directory)
//! 5. Relative to executable location

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use confluence_domain::{ClientConfig, ConfluenceError, Result};

use crate::errors::InfraError;

pub const ENV_BASE_URL: &str = "CONFLUENCE_BASE_URL";
pub const ENV_USERNAME: &str = "CONFLUENCE_USERNAME";
pub const ENV_PASSWORD: &str = "CONFLUENCE_PASSWORD";
pub const ENV_TIMEOUT_SECS: &str = "CONFLUENCE_TIMEOUT_SECS";
pub const ENV_RETRY_ATTEMPTS: &str = "CONFLUENCE_RETRY_ATTEMPTS";
pub const ENV_RETRY_BASE_DELAY_MS: &str = "CONFLUENCE_RETRY_BASE_DELAY_MS";
pub const ENV_RETRY_COOL_DOWN_MS: &str = "CONFLUENCE_RETRY_COOL_DOWN_MS";
pub const ENV_RETRY_MAX_ROUNDS: &str = "CONFLUENCE_RETRY_MAX_ROUNDS";

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If the base URL is
/// missing there, falls back to loading from a config file.
///
/// # Errors
/// Returns `ConfluenceError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Required fields are missing
pub fn load() -> Result<ClientConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// Only `CONFLUENCE_BASE_URL` is required; every other setting keeps its
/// default when unset.
///
/// # Errors
/// Returns `ConfluenceError::Config` if the base URL is missing or a
/// numeric variable does not parse.
pub fn load_from_env() -> Result<ClientConfig> {
    let mut config = ClientConfig::new(env_var(ENV_BASE_URL)?);

    if let Ok(username) = std::env::var(ENV_USERNAME) {
        config.username = username;
    }
    if let Ok(password) = std::env::var(ENV_PASSWORD) {
        config.password = password;
    }
    if let Some(timeout) = env_parse(ENV_TIMEOUT_SECS, "timeout")? {
        config.timeout_secs = timeout;
    }
    if let Some(attempts) = env_parse(ENV_RETRY_ATTEMPTS, "retry attempts")? {
        config.retry.attempts = attempts;
    }
    if let Some(delay) = env_parse(ENV_RETRY_BASE_DELAY_MS, "retry base delay")? {
        config.retry.base_delay_ms = delay;
    }
    if let Some(cool_down) = env_parse(ENV_RETRY_COOL_DOWN_MS, "retry cool-down")? {
        config.retry.cool_down_ms = cool_down;
    }
    config.retry.max_rounds = env_parse(ENV_RETRY_MAX_ROUNDS, "retry max rounds")?;

    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `ConfluenceError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ConfluenceError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            ConfluenceError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| ConfluenceError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<ClientConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents).map_err(|e| InfraError::from(e).into()),
        "json" => serde_json::from_str(contents).map_err(|e| InfraError::from(e).into()),
        _ => Err(ConfluenceError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe multiple paths for configuration files
///
/// Searches for config files in the following locations (in order):
/// 1. Current working directory (`./confluence.{json,toml}`,
///    `./config.{json,toml}`)
/// 2. Parent directories (up to 2 levels)
/// 3. Relative to executable location
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(candidates_in(&cwd));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(candidates_in(exe_dir));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn candidates_in(dir: &Path) -> Vec<PathBuf> {
    vec![
        dir.join("confluence.json"),
        dir.join("confluence.toml"),
        dir.join("config.json"),
        dir.join("config.toml"),
        dir.join("../config.json"),
        dir.join("../config.toml"),
        dir.join("../../config.json"),
        dir.join("../../config.toml"),
    ]
}

/// Get required environment variable
///
/// # Errors
/// Returns `ConfluenceError::Config` if the variable is not set or empty.
fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| {
            ConfluenceError::Config(format!("Missing required environment variable: {}", key))
        })
}

/// Parse an optional environment variable
///
/// # Errors
/// Returns `ConfluenceError::Config` if the variable is set but invalid.
fn env_parse<T>(key: &str, what: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfluenceError::Config(format!("Invalid {what} in {key}: {e}"))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use once_cell::sync::Lazy;
    use tempfile::NamedTempFile;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const ALL_VARS: [&str; 8] = [
        ENV_BASE_URL,
        ENV_USERNAME,
        ENV_PASSWORD,
        ENV_TIMEOUT_SECS,
        ENV_RETRY_ATTEMPTS,
        ENV_RETRY_BASE_DELAY_MS,
        ENV_RETRY_COOL_DOWN_MS,
        ENV_RETRY_MAX_ROUNDS,
    ];

    fn clear_env() {
        for key in ALL_VARS {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn test_load_from_env_all_vars_set() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var(ENV_BASE_URL, "https://acme.atlassian.net/wiki");
        std::env::set_var(ENV_USERNAME, "jane@acme.com");
        std::env::set_var(ENV_PASSWORD, "api-token");
        std::env::set_var(ENV_TIMEOUT_SECS, "10");
        std::env::set_var(ENV_RETRY_ATTEMPTS, "3");
        std::env::set_var(ENV_RETRY_BASE_DELAY_MS, "250");
        std::env::set_var(ENV_RETRY_COOL_DOWN_MS, "2000");
        std::env::set_var(ENV_RETRY_MAX_ROUNDS, "4");

        let result = load_from_env();
        clear_env();

        let config = result.expect("config from env");
        assert_eq!(config.base_url, "https://acme.atlassian.net/wiki");
        assert_eq!(config.username, "jane@acme.com");
        assert_eq!(config.password, "api-token");
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.retry.attempts, 3);
        assert_eq!(config.retry.base_delay_ms, 250);
        assert_eq!(config.retry.cool_down_ms, 2000);
        assert_eq!(config.retry.max_rounds, Some(4));
    }

    #[test]
    fn test_load_from_env_defaults() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var(ENV_BASE_URL, "https://wiki.example.com");
        let result = load_from_env();
        clear_env();

        let config = result.expect("config from env");
        assert!(config.username.is_empty());
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.retry.attempts, 5);
        assert_eq!(config.retry.max_rounds, None);
    }

    #[test]
    fn test_load_from_env_missing_base_url() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        let err = load_from_env().unwrap_err();
        assert!(matches!(err, ConfluenceError::Config(msg) if msg.contains(ENV_BASE_URL)));
    }

    #[test]
    fn test_load_from_env_invalid_number() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var(ENV_BASE_URL, "https://wiki.example.com");
        std::env::set_var(ENV_RETRY_ATTEMPTS, "many");
        let result = load_from_env();
        clear_env();

        let err = result.unwrap_err();
        assert!(matches!(err, ConfluenceError::Config(msg) if msg.contains(ENV_RETRY_ATTEMPTS)));
    }

    #[test]
    fn test_load_from_file_json() {
        let json_content = r#"{
            "base_url": "https://wiki.example.com",
            "username": "jdoe",
            "password": "secret",
            "retry": { "attempts": 2, "max_rounds": 3 }
        }"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(json_content.as_bytes()).unwrap();
        let path = temp_file.path().with_extension("json");
        std::fs::copy(temp_file.path(), &path).unwrap();

        let result = load_from_file(Some(path.clone()));
        std::fs::remove_file(path).ok();

        let config = result.expect("config from JSON file");
        assert_eq!(config.base_url, "https://wiki.example.com");
        assert_eq!(config.username, "jdoe");
        assert_eq!(config.retry.attempts, 2);
        assert_eq!(config.retry.base_delay_ms, 1000);
        assert_eq!(config.retry.max_rounds, Some(3));
    }

    #[test]
    fn test_load_from_file_toml() {
        let toml_content = r#"
base_url = "https://acme.atlassian.net/wiki"
password = "pat-123"
timeout_secs = 5

[retry]
cool_down_ms = 500
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        let path = temp_file.path().with_extension("toml");
        std::fs::copy(temp_file.path(), &path).unwrap();

        let result = load_from_file(Some(path.clone()));
        std::fs::remove_file(path).ok();

        let config = result.expect("config from TOML file");
        assert_eq!(config.password, "pat-123");
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.retry.cool_down_ms, 500);
        assert_eq!(config.retry.attempts, 5);
    }

    #[test]
    fn test_load_from_file_not_found() {
        let result = load_from_file(Some(PathBuf::from("/nonexistent/confluence.json")));
        assert!(matches!(result, Err(ConfluenceError::Config(_))));
    }

    #[test]
    fn test_parse_config_invalid_json() {
        let err = parse_config(r#"{ "base_url": "#, Path::new("confluence.json")).unwrap_err();
        assert!(matches!(err, ConfluenceError::Config(msg) if msg.contains("Invalid JSON format")));
    }

    #[test]
    fn test_parse_config_missing_base_url() {
        let err = parse_config("timeout_secs = 5", Path::new("confluence.toml")).unwrap_err();
        assert!(matches!(err, ConfluenceError::Config(msg) if msg.contains("Invalid TOML format")));
    }

    #[test]
    fn test_parse_config_unsupported_format() {
        let result = parse_config("base_url: x", Path::new("confluence.yaml"));
        assert!(result.is_err(), "Should fail with unsupported format");
    }

    #[test]
    fn test_candidates_prefer_confluence_file() {
        let dir = Path::new("/srv/app");
        let candidates = candidates_in(dir);
        assert_eq!(candidates[0], dir.join("confluence.json"));
        assert_eq!(candidates.len(), 8);
    }
}
