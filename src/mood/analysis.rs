use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::{
    mood::{FeatureMeans, SegmentWindow, TimeSegment, aggregate, bucket, feature_lookup},
    spotify::SpotifyError,
    types::{AudioFeatures, PlayEvent},
    utils,
};

/// Number of sample tracks kept per segment.
pub const SAMPLE_TRACKS: usize = 5;

/// Upstream maximum for a single recently-played page.
pub const MAX_RECENTLY_PLAYED: u32 = 50;

/// The two upstream fetches the analysis depends on.
///
/// [`crate::spotify::SpotifyClient`] implements this against the Spotify Web
/// API; tests use in-memory sources.
#[allow(async_fn_in_trait)]
pub trait ListeningSource {
    /// Most recent play events, newest first.
    async fn recently_played(
        &self,
        token: &str,
        limit: u32,
    ) -> Result<Vec<PlayEvent>, SpotifyError>;

    /// Feature vectors for `ids`. Ids the provider cannot resolve come back
    /// as `None`. Batch size limits are the source's concern.
    async fn audio_features(
        &self,
        token: &str,
        ids: &[String],
    ) -> Result<Vec<Option<AudioFeatures>>, SpotifyError>;
}

#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub limit: u32,
    /// Only events from the last `days` days are analysed. Zero disables the
    /// window.
    pub days: u32,
    pub now: DateTime<Utc>,
}

impl AnalysisRequest {
    pub fn new(days: u32, now: DateTime<Utc>) -> Self {
        AnalysisRequest {
            limit: MAX_RECENTLY_PLAYED,
            days,
            now,
        }
    }

    /// The oldest instant still inside the window. A window reaching past
    /// the representable calendar covers everything, so it yields no cutoff.
    fn cutoff(&self) -> Option<DateTime<Utc>> {
        if self.days == 0 {
            return None;
        }
        Duration::try_days(i64::from(self.days))
            .and_then(|window| self.now.checked_sub_signed(window))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SegmentAggregate {
    pub segment: TimeSegment,
    pub track_count: usize,
    pub mean_features: FeatureMeans,
    pub sample_tracks: Vec<PlayEvent>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimeAnalysis {
    pub time_analysis: BTreeMap<TimeSegment, SegmentAggregate>,
    pub time_segments: Vec<SegmentWindow>,
    /// Events dropped because of a malformed timestamp or unassigned hour.
    pub dropped: usize,
    pub malformed: usize,
    pub unassigned: usize,
    /// Events older than the requested window.
    pub outside_window: usize,
}

impl TimeAnalysis {
    pub fn segment(&self, segment: TimeSegment) -> Option<&SegmentAggregate> {
        self.time_analysis.get(&segment)
    }

    pub fn total_tracks(&self) -> usize {
        self.time_analysis.values().map(|s| s.track_count).sum()
    }
}

/// Builds the time-of-day mood profile for the listener behind `token`.
///
/// Issues one recently-played fetch and at most one audio feature fetch for
/// the distinct tracks across all segments. Upstream failures abort the whole
/// request; per-event problems only drop the event.
pub async fn analyze_listening<S: ListeningSource>(
    source: &S,
    token: &str,
    request: &AnalysisRequest,
) -> Result<TimeAnalysis, SpotifyError> {
    let limit = request.limit.clamp(1, MAX_RECENTLY_PLAYED);
    let events = source.recently_played(token, limit).await?;

    let (events, outside_window) = within_window(events, request.cutoff());
    let buckets = bucket(&events);

    let ids = utils::distinct_track_ids(buckets.segments.values().flatten());
    let lookup = if ids.is_empty() {
        Default::default()
    } else {
        feature_lookup(source.audio_features(token, &ids).await?)
    };

    let time_analysis = buckets
        .segments
        .iter()
        .map(|(segment, tracks)| {
            let summary = SegmentAggregate {
                segment: *segment,
                track_count: tracks.len(),
                mean_features: aggregate(tracks, &lookup),
                sample_tracks: tracks.iter().take(SAMPLE_TRACKS).cloned().collect(),
            };
            (*segment, summary)
        })
        .collect();

    Ok(TimeAnalysis {
        time_analysis,
        time_segments: TimeSegment::windows(),
        dropped: buckets.dropped(),
        malformed: buckets.malformed,
        unassigned: buckets.unassigned,
        outside_window,
    })
}

/// Removes events older than `cutoff`. Events whose timestamp cannot be
/// parsed are kept so that bucketing accounts for them.
fn within_window(
    events: Vec<PlayEvent>,
    cutoff: Option<DateTime<Utc>>,
) -> (Vec<PlayEvent>, usize) {
    let Some(cutoff) = cutoff else {
        return (events, 0);
    };

    let total = events.len();
    let kept: Vec<PlayEvent> = events
        .into_iter()
        .filter(|e| utils::parse_played_at(&e.played_at).is_none_or(|played| played >= cutoff))
        .collect();
    let outside = total - kept.len();
    (kept, outside)
}
