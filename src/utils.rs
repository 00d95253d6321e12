use std::{
    collections::{HashMap, HashSet},
    fmt,
    time::Duration,
};

use base64::{
    Engine,
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
};
use chrono::{DateTime, Timelike, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};

use crate::{
    mood::TimeSegment,
    types::{AudioFeatures, PlayEvent, Track, TrackWithFeatures},
};

pub fn generate_code_verifier() -> String {
    random_alphanumeric(128)
}

pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

pub fn generate_state() -> String {
    random_alphanumeric(16)
}

fn random_alphanumeric(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

pub fn basic_auth_header(client_id: &str, client_secret: &str) -> String {
    format!(
        "Basic {}",
        STANDARD.encode(format!("{}:{}", client_id, client_secret))
    )
}

/// Parses a Spotify `played_at` timestamp (RFC 3339, usually with a `Z` suffix).
pub fn parse_played_at(played_at: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(played_at)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Hour of day in UTC for a `played_at` timestamp.
pub fn played_at_hour(played_at: &str) -> Option<u32> {
    parse_played_at(played_at).map(|dt| dt.hour())
}

/// Distinct non-null track ids in order of first appearance.
pub fn distinct_track_ids<'a, I>(events: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a PlayEvent>,
{
    let mut seen = HashSet::new();
    events
        .into_iter()
        .filter_map(|e| e.track_id.as_deref())
        .filter(|id| !id.is_empty())
        .filter(|id| seen.insert(*id))
        .map(String::from)
        .collect()
}

/// Joins tracks with their feature vectors by id. Tracks without a vector are
/// kept with `None`.
pub fn attach_features(
    tracks: Vec<Track>,
    features: Vec<Option<AudioFeatures>>,
) -> Vec<TrackWithFeatures> {
    let by_id: HashMap<String, AudioFeatures> = features
        .into_iter()
        .flatten()
        .map(|f| (f.id.clone(), f))
        .collect();

    tracks
        .into_iter()
        .map(|track| {
            let audio_features = track
                .id
                .as_ref()
                .and_then(|id| by_id.get(id).cloned());
            TrackWithFeatures {
                track,
                audio_features,
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRange {
    ShortTerm,
    MediumTerm,
    LongTerm,
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TimeRange::ShortTerm => "short_term",
            TimeRange::MediumTerm => "medium_term",
            TimeRange::LongTerm => "long_term",
        };
        write!(f, "{}", s)
    }
}

pub fn parse_time_range(s: &str) -> Result<TimeRange, String> {
    match s.trim().to_lowercase().replace('-', "_").as_str() {
        "short_term" | "short" => Ok(TimeRange::ShortTerm),
        "medium_term" | "medium" => Ok(TimeRange::MediumTerm),
        "long_term" | "long" => Ok(TimeRange::LongTerm),
        other => Err(format!(
            "Invalid time range '{}'. Must be one of: short_term, medium_term, long_term",
            other
        )),
    }
}

pub fn format_feature(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.3}", v),
        None => "-".to_string(),
    }
}

pub fn format_segment_hours(segment: TimeSegment) -> String {
    format!(
        "{:02}:00 - {:02}:00",
        segment.start_hour(),
        segment.end_hour()
    )
}

pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb
}
