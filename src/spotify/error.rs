use std::fmt;

/// Failure of a call to one of the Spotify endpoints.
///
/// Any of these aborts the request that triggered it. Nothing is retried.
#[derive(Debug)]
pub enum SpotifyError {
    /// Network failure, non-success status or undecodable body.
    Http(reqwest::Error),
    /// The accounts service rejected a token request.
    Auth(String),
    /// A configured endpoint could not be turned into a URL.
    InvalidUrl(String),
}

impl fmt::Display for SpotifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpotifyError::Http(e) => write!(f, "Spotify request failed: {}", e),
            SpotifyError::Auth(msg) => write!(f, "Spotify auth error: {}", msg),
            SpotifyError::InvalidUrl(msg) => write!(f, "Invalid URL: {}", msg),
        }
    }
}

impl std::error::Error for SpotifyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SpotifyError::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for SpotifyError {
    fn from(err: reqwest::Error) -> Self {
        SpotifyError::Http(err)
    }
}
