use std::{
    fmt,
    io::{Error, ErrorKind},
    path::{Path, PathBuf},
};

use chrono::{Duration, Utc};

use crate::{
    config::{self, Config},
    spotify::{self, SpotifyError},
    types::Token,
};

/// Refresh this many seconds before the credential actually expires.
pub const EXPIRY_MARGIN_SECS: i64 = 240;

#[derive(Debug)]
pub enum TokenError {
    IoError(Error),
    SerdeError(serde_json::Error),
    MissingRefreshToken,
    RefreshError(SpotifyError),
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenError::IoError(e) => write!(f, "{}", e),
            TokenError::SerdeError(e) => write!(f, "{}", e),
            TokenError::MissingRefreshToken => {
                write!(f, "token expired and no refresh token is available")
            }
            TokenError::RefreshError(e) => write!(f, "token refresh failed: {}", e),
        }
    }
}

impl std::error::Error for TokenError {}

impl From<Error> for TokenError {
    fn from(err: Error) -> Self {
        TokenError::IoError(err)
    }
}

impl From<serde_json::Error> for TokenError {
    fn from(err: serde_json::Error) -> Self {
        TokenError::SerdeError(err)
    }
}

impl From<SpotifyError> for TokenError {
    fn from(err: SpotifyError) -> Self {
        TokenError::RefreshError(err)
    }
}

/// Keeps the signed-in user's credential between invocations.
pub struct TokenManager {
    token: Token,
    path: PathBuf,
}

impl TokenManager {
    pub fn new(token: Token) -> Self {
        Self::with_path(token, Self::token_path())
    }

    pub fn with_path(token: Token, path: PathBuf) -> Self {
        TokenManager { token, path }
    }

    pub async fn load() -> Result<Self, TokenError> {
        Self::load_from(Self::token_path()).await
    }

    pub async fn load_from(path: PathBuf) -> Result<Self, TokenError> {
        let content = async_fs::read_to_string(&path).await?;
        let token: Token = serde_json::from_str(&content)?;
        Ok(Self { token, path })
    }

    pub async fn persist(&self) -> Result<(), TokenError> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(&self.token)?;
        async_fs::write(&self.path, json).await?;
        Ok(())
    }

    /// Removes the stored credential. Returns `false` if none was stored.
    pub async fn clear() -> Result<bool, TokenError> {
        Self::clear_at(&Self::token_path()).await
    }

    pub async fn clear_at(path: &Path) -> Result<bool, TokenError> {
        match async_fs::remove_file(path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Returns an access token that is valid for at least the expiry margin,
    /// refreshing and persisting the credential first when needed.
    pub async fn get_valid_token(&mut self, config: &Config) -> Result<String, TokenError> {
        if self.needs_refresh() {
            let refresh_token = self
                .token
                .refresh_token
                .clone()
                .ok_or(TokenError::MissingRefreshToken)?;

            let fresh = spotify::auth::refresh_token(config, &refresh_token)
                .await?
                .retain_refresh_token(&self.token);
            self.token = fresh;
            self.persist().await?;
        }

        Ok(self.token.access_token.clone())
    }

    pub fn needs_refresh(&self) -> bool {
        self.token
            .is_expired(Utc::now() + Duration::seconds(EXPIRY_MARGIN_SECS))
    }

    fn token_path() -> PathBuf {
        config::data_dir().join("cache/token.json")
    }

    pub fn current_token(&self) -> &Token {
        &self.token
    }
}
