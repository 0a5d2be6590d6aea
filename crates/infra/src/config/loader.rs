//! Configuration loader
//!
//! Loads `AuthConfig` from environment variables or files.
//!
//! ## Loading Strategy
//! 1. `.env` in the working directory is applied (existing variables win)
//! 2. Environment variables are tried first
//! 3. If a required variable is missing, falls back to a config file
//! 4. Supports JSON and TOML formats
//!
//! Whatever the source, the result is validated before it is returned.
//!
//! ## Environment Variables
//! Required:
//! - `TABAUTH_ISSUER`: Issuer base URL
//! - `TABAUTH_CLIENT_ID`: Public client id
//! - `TABAUTH_REDIRECT_URI`: Registered redirect URI
//!
//! Optional:
//! - `TABAUTH_SCOPES`: Space or comma separated scopes
//! - `TABAUTH_AUDIENCE`
//! - `TABAUTH_ENDPOINT_PREFIX`: `/oidc` by default
//! - `TABAUTH_AUTHORIZE_ENDPOINT`, `TABAUTH_TOKEN_ENDPOINT`,
//!   `TABAUTH_USERINFO_ENDPOINT`, `TABAUTH_END_SESSION_ENDPOINT`
//! - `TABAUTH_POST_LOGOUT_REDIRECT_URI`
//! - `TABAUTH_EXTRA_AUTHORIZE_PARAMS`: form encoded, e.g. `prompt=login&ui_locales=fr`
//! - `TABAUTH_USE_REFRESH_TOKEN`: true/false
//! - `TABAUTH_DEFAULT_APP_REDIRECT`
//! - `TABAUTH_STORAGE`: `durable`/`local`, `session` or `memory`
//! - `TABAUTH_STORAGE_DIR`
//! - `TABAUTH_CLOCK_SKEW_SECONDS`, `TABAUTH_REFRESH_LEEWAY_SECONDS`
//! - `TABAUTH_REFRESH_LOCK_KEY`, `TABAUTH_REFRESH_LOCK_TTL_MS`,
//!   `TABAUTH_REFRESH_WAIT_TIMEOUT_MS`
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./tabauth.json` or `./tabauth.toml` (current working directory)
//! 2. `./config.json` or `./config.toml` (current working directory)
//! 3. The same names in the parent and grandparent directories
//! 4. The same names next to the executable

use std::path::{Path, PathBuf};
use std::str::FromStr;

use tabauth_domain::{AuthConfig, AuthError, Result, StorageKind};
use url::form_urlencoded;

use crate::errors::into_auth;

const ENV_PREFIX: &str = "TABAUTH_";
const FILE_STEMS: [&str; 2] = ["tabauth", "config"];
const FILE_EXTENSIONS: [&str; 2] = ["json", "toml"];

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `AuthError::Config` if neither source yields a valid
/// configuration.
pub fn load() -> Result<AuthConfig> {
    dotenvy::dotenv().ok();

    match load_from_env() {
        Ok(config) => {
            tracing::info!(issuer = %config.issuer, "config.loaded_from_env");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = %e, "config.env_incomplete");
            load_from_file(None)
        }
    }
}

/// Load configuration from `TABAUTH_*` environment variables
///
/// # Errors
/// Returns `AuthError::Config` if a required variable is missing, a value
/// does not parse, or the result fails validation.
pub fn load_from_env() -> Result<AuthConfig> {
    let mut config = AuthConfig::new(
        env_var("ISSUER")?,
        env_var("CLIENT_ID")?,
        env_var("REDIRECT_URI")?,
    );

    if let Some(scopes) = env_opt("SCOPES") {
        config = config.with_scopes(split_scopes(&scopes));
    }
    if let Some(audience) = env_opt("AUDIENCE") {
        config = config.with_audience(audience);
    }
    if let Some(prefix) = env_opt("ENDPOINT_PREFIX") {
        config.endpoint_prefix = prefix;
    }
    config.authorize_endpoint = env_opt("AUTHORIZE_ENDPOINT");
    config.token_endpoint = env_opt("TOKEN_ENDPOINT");
    config.userinfo_endpoint = env_opt("USERINFO_ENDPOINT");
    config.end_session_endpoint = env_opt("END_SESSION_ENDPOINT");
    config.post_logout_redirect_uri = env_opt("POST_LOGOUT_REDIRECT_URI");
    config.default_app_redirect = env_opt("DEFAULT_APP_REDIRECT");
    config.storage_dir = env_opt("STORAGE_DIR").map(PathBuf::from);

    if let Some(raw) = env_opt("EXTRA_AUTHORIZE_PARAMS") {
        for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
            config = config.with_extra_param(key, value);
        }
    }

    config.use_refresh_token = env_bool("USE_REFRESH_TOKEN", config.use_refresh_token);
    if let Some(storage) = env_opt("STORAGE") {
        config.storage = StorageKind::from_str(&storage).map_err(AuthError::Config)?;
    }
    if let Some(key) = env_opt("REFRESH_LOCK_KEY") {
        config.refresh_lock_key = key;
    }
    config.clock_skew_seconds = env_parse("CLOCK_SKEW_SECONDS", config.clock_skew_seconds)?;
    config.refresh_leeway_seconds =
        env_parse("REFRESH_LEEWAY_SECONDS", config.refresh_leeway_seconds)?;
    config.refresh_lock_ttl_ms = env_parse("REFRESH_LOCK_TTL_MS", config.refresh_lock_ttl_ms)?;
    config.refresh_wait_timeout_ms =
        env_parse("REFRESH_WAIT_TIMEOUT_MS", config.refresh_wait_timeout_ms)?;

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations.
///
/// # Errors
/// Returns `AuthError::Config` if the file is missing or unreadable, its
/// format is invalid, or the result fails validation.
pub fn load_from_file(path: Option<PathBuf>) -> Result<AuthConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(AuthError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            AuthError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "config.loading_file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| AuthError::Config(format!("Failed to read config file: {e}")))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Parse configuration by file extension (`.json` or `.toml`)
fn parse_config(contents: &str, path: &Path) -> Result<AuthConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents).map_err(into_auth),
        "json" => serde_json::from_str(contents)
            .map_err(|e| AuthError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(AuthError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// First existing config file among the standard locations
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.extend([cwd.clone(), cwd.join(".."), cwd.join("../..")]);
    }
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            dirs.push(exe_dir.to_path_buf());
        }
    }

    dirs.iter()
        .flat_map(|dir| candidates_in(dir))
        .find(|path| path.exists())
}

fn candidates_in(dir: &Path) -> Vec<PathBuf> {
    FILE_STEMS
        .iter()
        .flat_map(|stem| FILE_EXTENSIONS.iter().map(move |ext| dir.join(format!("{stem}.{ext}"))))
        .collect()
}

fn split_scopes(raw: &str) -> Vec<String> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Required `TABAUTH_<name>` variable
fn env_var(name: &str) -> Result<String> {
    env_opt(name).ok_or_else(|| {
        AuthError::Config(format!("Missing required environment variable: {ENV_PREFIX}{name}"))
    })
}

/// Optional `TABAUTH_<name>` variable; blank counts as unset
fn env_opt(name: &str) -> Option<String> {
    std::env::var(format!("{ENV_PREFIX}{name}"))
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env_opt(name) {
        Some(raw) => raw
            .parse()
            .map_err(|e| AuthError::Config(format!("Invalid {ENV_PREFIX}{name} ({raw}): {e}"))),
        None => Ok(default),
    }
}

/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(name: &str, default: bool) -> bool {
    env_opt(name)
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
