use chrono::Timelike;
use tabled::Table;

use crate::{
    cli::access_token,
    config::Config,
    error,
    mood::TimeSegment,
    spotify::SpotifyClient,
    types::{AudioFeatures, FeatureTableRow, RecentTableRow, TrackTableRow, TrackWithFeatures},
    utils::{self, TimeRange},
    warning,
};

/// Lists the user's top tracks, optionally joined with audio features.
///
/// # Arguments
///
/// * `config` - Application configuration
/// * `time_range` - Affinity window Spotify computes the ranking over
/// * `limit` - Number of tracks (1-50)
/// * `with_features` - Also fetch valence, energy, danceability and tempo
///
/// # Example Usage
///
/// ```bash
/// sonicsync top
/// sonicsync top --time-range short_term --limit 10 --features
/// ```
pub async fn top(config: Config, time_range: TimeRange, limit: u32, with_features: bool) {
    let token = access_token(&config).await;
    let client = SpotifyClient::new(config);

    let pb = utils::spinner("Fetching top tracks...");
    let result = if with_features {
        client
            .get_top_tracks_with_features(&token, time_range, limit)
            .await
    } else {
        client
            .get_top_tracks(&token, time_range, limit)
            .await
            .map(|tracks| {
                tracks
                    .into_iter()
                    .map(|track| TrackWithFeatures {
                        track,
                        audio_features: None,
                    })
                    .collect()
            })
    };
    pb.finish_and_clear();

    let tracks = match result {
        Ok(tracks) => tracks,
        Err(e) => error!("Failed to fetch top tracks: {}", e),
    };

    if tracks.is_empty() {
        warning!("No top tracks for {}.", time_range);
        return;
    }

    let rows: Vec<TrackTableRow> = tracks
        .into_iter()
        .map(|t| {
            let f = t.audio_features.as_ref();
            TrackTableRow {
                name: t.track.name.clone(),
                artists: t.track.artist_names(),
                album: t.track.album_name().to_string(),
                popularity: t
                    .track
                    .popularity
                    .map_or("-".to_string(), |p| p.to_string()),
                valence: utils::format_feature(f.and_then(|f| f.valence)),
                energy: utils::format_feature(f.and_then(|f| f.energy)),
                danceability: utils::format_feature(f.and_then(|f| f.danceability)),
                tempo: utils::format_feature(f.and_then(|f| f.tempo)),
            }
        })
        .collect();

    println!("{}", Table::new(rows));
}

/// Lists recently played tracks with the time segment each play fell into.
///
/// Times are shown in UTC, matching the segment assignment.
pub async fn recent(config: Config, limit: u32) {
    let token = access_token(&config).await;
    let client = SpotifyClient::new(config);

    let pb = utils::spinner("Fetching recently played tracks...");
    let events = match client.get_recently_played(&token, limit).await {
        Ok(events) => events,
        Err(e) => {
            pb.finish_and_clear();
            error!("Failed to fetch recently played tracks: {}", e);
        }
    };
    pb.finish_and_clear();

    if events.is_empty() {
        warning!("No recently played tracks.");
        return;
    }

    let rows: Vec<RecentTableRow> = events
        .into_iter()
        .map(|e| {
            let played_at = utils::parse_played_at(&e.played_at);
            let segment = played_at
                .and_then(|p| TimeSegment::classify(p.hour()))
                .map_or("-".to_string(), |s| s.to_string());

            RecentTableRow {
                played_at: played_at
                    .map_or(e.played_at.clone(), |p| p.format("%Y-%m-%d %H:%M").to_string()),
                segment,
                name: e.track.name.clone(),
                artists: e.track.artist_names(),
            }
        })
        .collect();

    println!("{}", Table::new(rows));
}

/// Shows the audio features for a list of track ids.
///
/// Ids Spotify cannot resolve are reported and left out of the table.
pub async fn features(config: Config, ids: Vec<String>) {
    let ids: Vec<String> = ids
        .into_iter()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .collect();
    if ids.is_empty() {
        error!("No track IDs provided.");
    }

    let token = access_token(&config).await;
    let client = SpotifyClient::new(config);

    let pb = utils::spinner("Fetching audio features...");
    let features = match client.get_audio_features(&token, &ids).await {
        Ok(f) => f,
        Err(e) => {
            pb.finish_and_clear();
            error!("Failed to fetch audio features: {}", e);
        }
    };
    pb.finish_and_clear();

    let missing = features.iter().filter(|f| f.is_none()).count();
    if missing > 0 {
        warning!("No audio features available for {} of {} tracks.", missing, ids.len());
    }

    let rows: Vec<FeatureTableRow> = features.iter().flatten().map(feature_row).collect();
    if rows.is_empty() {
        return;
    }

    println!("{}", Table::new(rows));
}

fn feature_row(f: &AudioFeatures) -> FeatureTableRow {
    FeatureTableRow {
        id: f.id.clone(),
        valence: utils::format_feature(f.valence),
        energy: utils::format_feature(f.energy),
        danceability: utils::format_feature(f.danceability),
        tempo: utils::format_feature(f.tempo),
        acousticness: utils::format_feature(f.acousticness),
        instrumentalness: utils::format_feature(f.instrumentalness),
        speechiness: utils::format_feature(f.speechiness),
        liveness: utils::format_feature(f.liveness),
    }
}
