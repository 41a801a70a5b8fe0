//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `FINSYNC_SOURCE_DB_PATH`: Source ledger database path
//! - `FINSYNC_SOURCE_POOL_SIZE`: Source pool size (optional, default 4)
//! - `FINSYNC_TARGET_DB_PATH`: Target entry database path
//! - `FINSYNC_TARGET_POOL_SIZE`: Target pool size (optional, default 4)
//! - `FINSYNC_AUTH_URL`: Identity endpoint URL
//! - `FINSYNC_UPSERT_URL`: Financial upsert endpoint URL
//! - `FINSYNC_CLIENT_ID`: Gateway client id
//! - `FINSYNC_CLIENT_SECRET`: Gateway client secret
//! - `FINSYNC_GATEWAY_TOKEN`: Fixed secondary token for the identity call
//! - `FINSYNC_HTTP_TIMEOUT_SECS`: Request timeout (optional, default 30)
//! - `FINSYNC_CHUNK_SIZE`: Rows per store round trip (optional, default 5000)
//! - `FINSYNC_WINDOW_DAYS`: Default extraction window (optional, default 1)
//!
//! ## File Locations
//! The loader probes `config.{json,toml}` and `finsync.{json,toml}` in the
//! working directory, its first two ancestors, and next to the executable.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use finsync_domain::{
    Config, ExtractionConfig, GatewayConfig, Result, StoreConfig, SyncError,
};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `SyncError::Config` if configuration cannot be loaded from
/// either source, or the file format is invalid.
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "environment incomplete, trying config file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// All required environment variables must be present; optional tuning
/// variables fall back to their defaults.
///
/// # Errors
/// Returns `SyncError::Config` if required variables are missing or have
/// invalid values.
pub fn load_from_env() -> Result<Config> {
    Ok(Config {
        source: StoreConfig {
            path: env_var("FINSYNC_SOURCE_DB_PATH")?,
            pool_size: env_parse("FINSYNC_SOURCE_POOL_SIZE", 4)?,
        },
        target: StoreConfig {
            path: env_var("FINSYNC_TARGET_DB_PATH")?,
            pool_size: env_parse("FINSYNC_TARGET_POOL_SIZE", 4)?,
        },
        gateway: GatewayConfig {
            auth_url: env_var("FINSYNC_AUTH_URL")?,
            upsert_url: env_var("FINSYNC_UPSERT_URL")?,
            client_id: env_var("FINSYNC_CLIENT_ID")?,
            client_secret: env_var("FINSYNC_CLIENT_SECRET")?,
            gateway_token: env_var("FINSYNC_GATEWAY_TOKEN")?,
            timeout_secs: env_parse("FINSYNC_HTTP_TIMEOUT_SECS", 30)?,
        },
        extraction: ExtractionConfig {
            chunk_size: env_parse("FINSYNC_CHUNK_SIZE", ExtractionConfig::default().chunk_size)?,
            window_days: env_parse("FINSYNC_WINDOW_DAYS", 1)?,
        },
    })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `SyncError::Config` if no file is found or parsing fails.
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(SyncError::Config(format!("config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            SyncError::Config("no config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| SyncError::Config(format!("failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content, with format detected by file
/// extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| SyncError::Config(format!("invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| SyncError::Config(format!("invalid JSON format: {e}"))),
        _ => Err(SyncError::Config(format!("unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        for base in [cwd.clone(), cwd.join(".."), cwd.join("../..")] {
            push_candidates(&mut candidates, &base);
        }
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            push_candidates(&mut candidates, exe_dir);
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn push_candidates(candidates: &mut Vec<PathBuf>, base: &Path) {
    for name in ["config.json", "config.toml", "finsync.json", "finsync.toml"] {
        candidates.push(base.join(name));
    }
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| SyncError::Config(format!("missing required environment variable: {key}")))
}

/// Parse an optional environment variable, falling back to `default`.
fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| SyncError::Config(format!("invalid value for {key}: {e}"))),
        Err(_) => Ok(default),
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

    const REQUIRED_VARS: &[&str] = &[
        "FINSYNC_SOURCE_DB_PATH",
        "FINSYNC_TARGET_DB_PATH",
        "FINSYNC_AUTH_URL",
        "FINSYNC_UPSERT_URL",
        "FINSYNC_CLIENT_ID",
        "FINSYNC_CLIENT_SECRET",
        "FINSYNC_GATEWAY_TOKEN",
    ];

    fn clear_env() {
        for key in REQUIRED_VARS {
            std::env::remove_var(key);
        }
        for key in [
            "FINSYNC_SOURCE_POOL_SIZE",
            "FINSYNC_TARGET_POOL_SIZE",
            "FINSYNC_HTTP_TIMEOUT_SECS",
            "FINSYNC_CHUNK_SIZE",
            "FINSYNC_WINDOW_DAYS",
        ] {
            std::env::remove_var(key);
        }
    }

    fn set_required_env() {
        std::env::set_var("FINSYNC_SOURCE_DB_PATH", "/tmp/source.db");
        std::env::set_var("FINSYNC_TARGET_DB_PATH", "/tmp/target.db");
        std::env::set_var("FINSYNC_AUTH_URL", "https://gateway.example.com/oauth/token");
        std::env::set_var("FINSYNC_UPSERT_URL", "https://gateway.example.com/upsert");
        std::env::set_var("FINSYNC_CLIENT_ID", "client-1");
        std::env::set_var("FINSYNC_CLIENT_SECRET", "secret-1");
        std::env::set_var("FINSYNC_GATEWAY_TOKEN", "xtoken-1");
    }

    #[test]
    fn loads_from_env_with_defaults_for_optional_vars() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        set_required_env();

        let config = load_from_env().expect("config loads from env");
        assert_eq!(config.source.path, "/tmp/source.db");
        assert_eq!(config.source.pool_size, 4);
        assert_eq!(config.gateway.client_id, "client-1");
        assert_eq!(config.gateway.timeout_secs, 30);
        assert_eq!(config.extraction.chunk_size, 5000);
        assert_eq!(config.extraction.window_days, 1);

        clear_env();
    }

    #[test]
    fn optional_vars_override_defaults() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        set_required_env();
        std::env::set_var("FINSYNC_CHUNK_SIZE", "250");
        std::env::set_var("FINSYNC_WINDOW_DAYS", "3");
        std::env::set_var("FINSYNC_HTTP_TIMEOUT_SECS", "10");

        let config = load_from_env().expect("config loads from env");
        assert_eq!(config.extraction.chunk_size, 250);
        assert_eq!(config.extraction.window_days, 3);
        assert_eq!(config.gateway.timeout_secs, 10);

        clear_env();
    }

    #[test]
    fn missing_required_var_is_a_config_error() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        set_required_env();
        std::env::remove_var("FINSYNC_CLIENT_SECRET");

        let result = load_from_env();
        match result {
            Err(SyncError::Config(msg)) => assert!(msg.contains("FINSYNC_CLIENT_SECRET")),
            other => panic!("expected config error, got {other:?}"),
        }

        clear_env();
    }

    #[test]
    fn invalid_numeric_var_is_a_config_error() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        set_required_env();
        std::env::set_var("FINSYNC_CHUNK_SIZE", "not-a-number");

        let result = load_from_env();
        assert!(matches!(result, Err(SyncError::Config(_))));

        clear_env();
    }

    #[test]
    fn loads_from_json_file() {
        let json_content = r#"{
            "source": { "path": "source.db", "pool_size": 2 },
            "target": { "path": "target.db" },
            "gateway": {
                "auth_url": "https://gateway.example.com/oauth/token",
                "upsert_url": "https://gateway.example.com/upsert",
                "client_id": "id",
                "client_secret": "secret",
                "gateway_token": "xtoken"
            }
        }"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(json_content.as_bytes()).unwrap();
        let path = temp_file.path().with_extension("json");
        std::fs::copy(temp_file.path(), &path).unwrap();

        let config = load_from_file(Some(path.clone())).expect("config loads from JSON");
        assert_eq!(config.source.path, "source.db");
        assert_eq!(config.source.pool_size, 2);
        assert_eq!(config.target.pool_size, 4);
        assert_eq!(config.extraction.chunk_size, 5000);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn loads_from_toml_file() {
        let toml_content = r#"
[source]
path = "source.db"

[target]
path = "target.db"
pool_size = 8

[gateway]
auth_url = "https://gateway.example.com/oauth/token"
upsert_url = "https://gateway.example.com/upsert"
client_id = "id"
client_secret = "secret"
gateway_token = "xtoken"

[extraction]
chunk_size = 100
window_days = 2
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        let path = temp_file.path().with_extension("toml");
        std::fs::copy(temp_file.path(), &path).unwrap();

        let config = load_from_file(Some(path.clone())).expect("config loads from TOML");
        assert_eq!(config.target.pool_size, 8);
        assert_eq!(config.extraction.chunk_size, 100);
        assert_eq!(config.extraction.window_days, 2);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn file_not_found_is_a_config_error() {
        let result = load_from_file(Some(PathBuf::from("/nonexistent/config.json")));
        assert!(matches!(result, Err(SyncError::Config(_))));
    }

    #[test]
    fn invalid_json_is_a_config_error() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(br#"{ "this is": "not valid json" "#).unwrap();
        let path = temp_file.path().with_extension("json");
        std::fs::copy(temp_file.path(), &path).unwrap();

        let result = load_from_file(Some(path.clone()));
        assert!(matches!(result, Err(SyncError::Config(_))));

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn unsupported_extension_is_a_config_error() {
        let result = parse_config("some content", &PathBuf::from("test.yaml"));
        assert!(matches!(result, Err(SyncError::Config(_))));
    }
}
