//! # Spotify Integration Module
//!
//! The transport layer between Sonic Sync and the Spotify Web API. It covers
//! the OAuth flow and the handful of read endpoints the mood analysis needs.
//!
//! ```text
//! CLI / mood analysis
//!          ↓
//! Spotify Integration Layer
//!     ├── Authentication (authorization code + PKCE, refresh)
//!     └── Listening data (profile, top tracks, recently played, audio features)
//!          ↓
//! HTTP Layer (reqwest, JSON)
//!          ↓
//! Spotify Web API
//! ```
//!
//! ## API Coverage
//!
//! - `GET /me` - Current user's profile
//! - `GET /me/top/tracks` - Top tracks for a time range
//! - `GET /me/player/recently-played` - Last 50 play events
//! - `GET /audio-features` - Audio features, batched by 100 ids
//! - `POST /api/token` - Code exchange and refresh
//!
//! ## Error Handling
//!
//! Every call returns [`SpotifyError`]. There is no retry or rate limit
//! handling; a failing call fails the operation that issued it. An expired
//! access token is not detected here, the API simply answers 401.
//!
//! ## Configuration
//!
//! All endpoints and credentials come from the [`Config`] value handed to
//! [`SpotifyClient::new`] or to the [`auth`] functions.

pub mod auth;
mod error;
mod tracks;

pub use error::SpotifyError;
pub use tracks::AUDIO_FEATURES_BATCH;

use reqwest::Client;

use crate::config::Config;

/// Client for the Spotify Web API endpoints used by Sonic Sync.
///
/// Holds the configuration and a reusable HTTP client. The access token is
/// passed per call; the client never refreshes or stores credentials.
#[derive(Debug, Clone)]
pub struct SpotifyClient {
    config: Config,
    http: Client,
}

impl SpotifyClient {
    pub fn new(config: Config) -> Self {
        SpotifyClient {
            config,
            http: Client::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
