use serde::de::DeserializeOwned;

use crate::{
    mood::{ListeningSource, MAX_RECENTLY_PLAYED},
    spotify::{SpotifyClient, SpotifyError},
    types::{
        AudioFeatures, AudioFeaturesResponse, PlayEvent, RecentlyPlayedResponse,
        TopTracksResponse, Track, TrackWithFeatures, UserProfile,
    },
    utils::{self, TimeRange},
};

/// Maximum number of ids accepted by `GET /audio-features`.
pub const AUDIO_FEATURES_BATCH: usize = 100;

impl SpotifyClient {
    async fn get_json<T: DeserializeOwned>(
        &self,
        token: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, SpotifyError> {
        let api_url = format!("{uri}{path}", uri = &self.config.api_url, path = path);

        let response = self
            .http
            .get(&api_url)
            .bearer_auth(token)
            .query(query)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json::<T>().await?)
    }

    /// Retrieves the profile of the user the token belongs to.
    ///
    /// Uses `GET /me`. Requires the `user-read-private` scope for country and
    /// product, and `user-read-email` for the email address.
    ///
    /// # Errors
    ///
    /// Returns [`SpotifyError::Http`] on network failures or non-success
    /// responses, e.g. an expired access token (401).
    pub async fn get_profile(&self, token: &str) -> Result<UserProfile, SpotifyError> {
        self.get_json(token, "/me", &[]).await
    }

    /// Retrieves the user's top tracks for a time range.
    ///
    /// # Arguments
    ///
    /// * `token` - Valid access token with the `user-top-read` scope
    /// * `time_range` - `short_term` (about 4 weeks), `medium_term` (about
    ///   6 months) or `long_term` (several years)
    /// * `limit` - Number of tracks, clamped to 1-50
    ///
    /// # Example
    ///
    /// ```ignore
    /// let tracks = client.get_top_tracks(&token, TimeRange::MediumTerm, 20).await?;
    /// println!("Your favourite track: {}", tracks[0].name);
    /// ```
    pub async fn get_top_tracks(
        &self,
        token: &str,
        time_range: TimeRange,
        limit: u32,
    ) -> Result<Vec<Track>, SpotifyError> {
        let query = [
            ("time_range", time_range.to_string()),
            ("limit", limit.clamp(1, 50).to_string()),
        ];
        let res: TopTracksResponse = self.get_json(token, "/me/top/tracks", &query).await?;
        Ok(res.items)
    }

    /// Retrieves the most recently played tracks, newest first.
    ///
    /// Uses `GET /me/player/recently-played`, which returns at most 50 items
    /// in a single page. Only that page is fetched.
    pub async fn get_recently_played(
        &self,
        token: &str,
        limit: u32,
    ) -> Result<Vec<PlayEvent>, SpotifyError> {
        let query = [("limit", limit.clamp(1, MAX_RECENTLY_PLAYED).to_string())];
        let res: RecentlyPlayedResponse = self
            .get_json(token, "/me/player/recently-played", &query)
            .await?;
        Ok(res.items.into_iter().map(PlayEvent::from).collect())
    }

    /// Retrieves audio features for any number of tracks.
    ///
    /// The ids are sent in batches of 100 (the endpoint limit) and the
    /// responses concatenated in request order. Ids the API cannot resolve
    /// come back as `None`.
    pub async fn get_audio_features(
        &self,
        token: &str,
        ids: &[String],
    ) -> Result<Vec<Option<AudioFeatures>>, SpotifyError> {
        let mut features = Vec::with_capacity(ids.len());

        for chunk in ids.chunks(AUDIO_FEATURES_BATCH) {
            let query = [("ids", chunk.join(","))];
            let res: AudioFeaturesResponse =
                self.get_json(token, "/audio-features", &query).await?;
            features.extend(res.audio_features);
        }

        Ok(features)
    }

    /// Retrieves the user's top tracks together with their audio features.
    ///
    /// Tracks without a feature vector are kept with `audio_features: None`.
    pub async fn get_top_tracks_with_features(
        &self,
        token: &str,
        time_range: TimeRange,
        limit: u32,
    ) -> Result<Vec<TrackWithFeatures>, SpotifyError> {
        let tracks = self.get_top_tracks(token, time_range, limit).await?;
        if tracks.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = tracks.iter().filter_map(|t| t.id.clone()).collect();
        let features = self.get_audio_features(token, &ids).await?;

        Ok(utils::attach_features(tracks, features))
    }
}

impl ListeningSource for SpotifyClient {
    async fn recently_played(
        &self,
        token: &str,
        limit: u32,
    ) -> Result<Vec<PlayEvent>, SpotifyError> {
        self.get_recently_played(token, limit).await
    }

    async fn audio_features(
        &self,
        token: &str,
        ids: &[String],
    ) -> Result<Vec<Option<AudioFeatures>>, SpotifyError> {
        self.get_audio_features(token, ids).await
    }
}
