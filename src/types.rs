use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tabled::Tabled;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
    pub scope: String,
    pub expires_in: u64,
    pub refresh_token: Option<String>,
    pub obtained_at: i64,
}

impl Token {
    /// Builds a credential from a token endpoint response, stamping it with the
    /// instant the response was received.
    pub fn from_response(response: TokenResponse, received_at: DateTime<Utc>) -> Self {
        Token {
            access_token: response.access_token,
            token_type: response.token_type,
            scope: response.scope,
            expires_in: response.expires_in,
            refresh_token: response.refresh_token,
            obtained_at: received_at.timestamp(),
        }
    }

    pub fn expires_at(&self) -> i64 {
        self.obtained_at
            .saturating_add(i64::try_from(self.expires_in).unwrap_or(i64::MAX))
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at() <= now.timestamp()
    }

    /// Seconds left until expiry, zero once expired.
    pub fn remaining(&self, now: DateTime<Utc>) -> u64 {
        self.expires_at().saturating_sub(now.timestamp()).max(0) as u64
    }

    /// A refresh response may omit the refresh token, in which case the
    /// previous one stays valid and has to be carried over.
    pub fn retain_refresh_token(mut self, previous: &Token) -> Self {
        if self.refresh_token.is_none() {
            self.refresh_token = previous.refresh_token.clone();
        }
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub scope: String,
    #[serde(default = "default_expires_in")]
    pub expires_in: u64,
    pub refresh_token: Option<String>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

fn default_expires_in() -> u64 {
    3600
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenErrorResponse {
    pub error: String,
    pub error_description: Option<String>,
}

/// State shared between the auth flow and the callback handler.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub state: String,
    pub code_verifier: String,
    pub token: Option<Token>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub country: Option<String>,
    pub product: Option<String>,
    #[serde(default)]
    pub images: Vec<Image>,
}

impl UserProfile {
    pub fn profile_image(&self) -> Option<&str> {
        self.images.first().map(|i| i.url.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    pub height: Option<u32>,
    pub width: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub artists: Vec<TrackArtist>,
    pub album: Option<TrackAlbum>,
    pub popularity: Option<u32>,
    pub duration_ms: Option<u64>,
}

impl Track {
    pub fn artist_names(&self) -> String {
        self.artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn album_name(&self) -> &str {
        self.album.as_ref().map_or("", |a| a.name.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackArtist {
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackAlbum {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopTracksResponse {
    pub items: Vec<Track>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentlyPlayedResponse {
    pub items: Vec<PlayHistoryItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayHistoryItem {
    pub track: Track,
    pub played_at: String,
}

/// A single "recently played" record.
///
/// `played_at` is kept exactly as delivered; it is parsed when the event is
/// bucketed so that a malformed timestamp only drops this one event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayEvent {
    pub track_id: Option<String>,
    pub played_at: String,
    pub track: Track,
}

impl From<PlayHistoryItem> for PlayEvent {
    fn from(item: PlayHistoryItem) -> Self {
        PlayEvent {
            track_id: item.track.id.clone(),
            played_at: item.played_at,
            track: item.track,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AudioFeatures {
    pub id: String,
    pub valence: Option<f64>,
    pub energy: Option<f64>,
    pub danceability: Option<f64>,
    pub tempo: Option<f64>,
    pub instrumentalness: Option<f64>,
    pub acousticness: Option<f64>,
    pub speechiness: Option<f64>,
    pub liveness: Option<f64>,
    pub key: Option<i32>,
    pub loudness: Option<f64>,
    pub mode: Option<i32>,
    pub duration_ms: Option<u64>,
    pub time_signature: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioFeaturesResponse {
    pub audio_features: Vec<Option<AudioFeatures>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrackWithFeatures {
    pub track: Track,
    pub audio_features: Option<AudioFeatures>,
}

#[derive(Tabled)]
pub struct TrackTableRow {
    pub name: String,
    pub artists: String,
    pub album: String,
    pub popularity: String,
    pub valence: String,
    pub energy: String,
    pub danceability: String,
    pub tempo: String,
}

#[derive(Tabled)]
pub struct RecentTableRow {
    pub played_at: String,
    pub segment: String,
    pub name: String,
    pub artists: String,
}

#[derive(Tabled)]
pub struct FeatureTableRow {
    pub id: String,
    pub valence: String,
    pub energy: String,
    pub danceability: String,
    pub tempo: String,
    pub acousticness: String,
    pub instrumentalness: String,
    pub speechiness: String,
    pub liveness: String,
}

#[derive(Tabled)]
pub struct SegmentTableRow {
    pub segment: String,
    pub hours: String,
    pub tracks: usize,
    pub valence: String,
    pub energy: String,
    pub danceability: String,
    pub tempo: String,
}

#[derive(Tabled)]
pub struct SegmentWindowRow {
    pub segment: String,
    pub start_hour: u32,
    pub end_hour: u32,
    pub wraps_midnight: String,
}
