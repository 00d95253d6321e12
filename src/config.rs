//! Configuration management for Sonic Sync.
//!
//! Configuration is read once at start-up from environment variables and an
//! optional `.env` file, and collected into a [`Config`] value. That value is
//! handed to every component that talks to Spotify; nothing reads the
//! environment afterwards.
//!
//! The lookup order is:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (where applicable)

use std::{env, fmt, path::PathBuf};

pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:8888/callback";
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8888";
pub const DEFAULT_SCOPE: &str =
    "user-top-read user-read-private user-read-email user-read-recently-played";

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Io(std::io::Error),
    Dotenv(dotenv::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} must be set", key),
            ConfigError::Io(e) => write!(f, "{}", e),
            ConfigError::Dotenv(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err)
    }
}

/// Runtime settings for the Spotify collaborators and the callback server.
#[derive(Debug, Clone)]
pub struct Config {
    pub client_id: String,
    /// When absent the PKCE public-client flow is used for token requests.
    pub client_secret: Option<String>,
    pub redirect_uri: String,
    pub scope: String,
    pub auth_url: String,
    pub token_url: String,
    pub api_url: String,
    pub server_address: String,
}

impl Config {
    /// Builds the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] when `SPOTIFY_CLIENT_ID` is not set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Empty values
    /// are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let or_default = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        Ok(Config {
            client_id: get("SPOTIFY_CLIENT_ID").ok_or(ConfigError::Missing("SPOTIFY_CLIENT_ID"))?,
            client_secret: get("SPOTIFY_CLIENT_SECRET"),
            redirect_uri: or_default("SPOTIFY_REDIRECT_URI", DEFAULT_REDIRECT_URI),
            scope: or_default("SPOTIFY_API_AUTH_SCOPE", DEFAULT_SCOPE),
            auth_url: or_default("SPOTIFY_API_AUTH_URL", DEFAULT_AUTH_URL),
            token_url: or_default("SPOTIFY_API_TOKEN_URL", DEFAULT_TOKEN_URL),
            api_url: or_default("SPOTIFY_API_URL", DEFAULT_API_URL)
                .trim_end_matches('/')
                .to_string(),
            server_address: or_default("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS),
        })
    }
}

/// Returns the application's directory below the platform data dir.
///
/// - Linux: `~/.local/share/sonicsync`
/// - macOS: `~/Library/Application Support/sonicsync`
/// - Windows: `%LOCALAPPDATA%/sonicsync`
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("sonicsync");
    path
}

/// Loads environment variables from `.env` in the local data directory.
///
/// Creates the directory when it is missing. A missing `.env` file is not an
/// error, since every value can also come from the process environment.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the `.env` file
/// exists but cannot be parsed.
///
/// # Example
///
/// ```no_run
/// use sonicsync::config;
///
/// #[tokio::main]
/// async fn main() {
///     if let Err(e) = config::load_env().await {
///         eprintln!("Configuration error: {}", e);
///     }
/// }
/// ```
pub async fn load_env() -> Result<(), ConfigError> {
    let dir = data_dir();
    async_fs::create_dir_all(&dir).await?;

    let path = dir.join(".env");
    if !path.is_file() {
        return Ok(());
    }

    dotenv::from_path(path).map_err(ConfigError::Dotenv)
}
