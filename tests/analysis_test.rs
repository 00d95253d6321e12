use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use chrono::{DateTime, TimeZone, Utc};
use sonicsync::mood::*;
use sonicsync::spotify::SpotifyError;
use sonicsync::types::{AudioFeatures, PlayEvent, Track};

/// In-memory stand-in for the Spotify endpoints.
struct FakeSource {
    events: Vec<PlayEvent>,
    features: HashMap<String, AudioFeatures>,
    fail_features: bool,
    limit_seen: Cell<Option<u32>>,
    feature_calls: RefCell<Vec<Vec<String>>>,
}

impl FakeSource {
    fn new(events: Vec<PlayEvent>, features: Vec<AudioFeatures>) -> Self {
        FakeSource {
            events,
            features: features.into_iter().map(|f| (f.id.clone(), f)).collect(),
            fail_features: false,
            limit_seen: Cell::new(None),
            feature_calls: RefCell::new(Vec::new()),
        }
    }
}

impl ListeningSource for FakeSource {
    async fn recently_played(
        &self,
        _token: &str,
        limit: u32,
    ) -> Result<Vec<PlayEvent>, SpotifyError> {
        self.limit_seen.set(Some(limit));
        Ok(self.events.iter().take(limit as usize).cloned().collect())
    }

    async fn audio_features(
        &self,
        _token: &str,
        ids: &[String],
    ) -> Result<Vec<Option<AudioFeatures>>, SpotifyError> {
        self.feature_calls.borrow_mut().push(ids.to_vec());
        if self.fail_features {
            return Err(SpotifyError::Auth("invalid access token".to_string()));
        }
        Ok(ids.iter().map(|id| self.features.get(id).cloned()).collect())
    }
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 12, 12, 0, 0).unwrap()
}

fn event(id: &str, played_at: &str) -> PlayEvent {
    PlayEvent {
        track_id: Some(id.to_string()),
        played_at: played_at.to_string(),
        track: Track {
            id: Some(id.to_string()),
            name: format!("Track {}", id),
            uri: format!("spotify:track:{}", id),
            artists: Vec::new(),
            album: None,
            popularity: None,
            duration_ms: None,
        },
    }
}

fn valence(id: &str, value: f64) -> AudioFeatures {
    AudioFeatures {
        id: id.to_string(),
        valence: Some(value),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_end_to_end_scenario() {
    let source = FakeSource::new(
        vec![
            event("m1", "2024-03-11T09:10:00.000Z"),
            event("m2", "2024-03-11T09:40:00.000Z"),
            event("e1", "2024-03-11T22:05:00.000Z"),
        ],
        vec![valence("m1", 0.4), valence("m2", 0.6)],
    );

    let analysis = analyze_listening(&source, "token", &AnalysisRequest::new(7, now()))
        .await
        .unwrap();

    let morning = analysis.segment(TimeSegment::Morning).unwrap();
    assert_eq!(morning.track_count, 2);
    assert!((morning.mean_features.get(Dimension::Valence).unwrap() - 0.5).abs() < 1e-12);
    assert_eq!(morning.mean_features.get(Dimension::Energy), Some(0.0));

    let late_evening = analysis.segment(TimeSegment::LateEvening).unwrap();
    assert_eq!(late_evening.track_count, 1);
    // e1 has no feature vector upstream
    assert!(late_evening.mean_features.is_empty());

    assert_eq!(analysis.total_tracks(), 3);
    assert_eq!(analysis.dropped, 0);
    assert_eq!(analysis.time_segments.len(), 8);
}

#[tokio::test]
async fn test_single_batched_feature_fetch() {
    let source = FakeSource::new(
        vec![
            event("a", "2024-03-11T09:00:00Z"),
            event("b", "2024-03-11T15:00:00Z"),
            event("a", "2024-03-11T23:30:00Z"),
            event("c", "2024-03-11T03:00:00Z"),
        ],
        vec![valence("a", 0.1), valence("b", 0.2), valence("c", 0.3)],
    );

    analyze_listening(&source, "token", &AnalysisRequest::new(7, now()))
        .await
        .unwrap();

    // One call, distinct ids in first-appearance order across segments
    let calls = source.feature_calls.borrow();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].len(), 3);
    assert!(calls[0].contains(&"a".to_string()));
}

#[tokio::test]
async fn test_all_segments_present_and_empty_ones_have_no_aggregate() {
    let source = FakeSource::new(
        vec![event("a", "2024-03-11T12:00:00Z")],
        vec![valence("a", 0.7)],
    );

    let analysis = analyze_listening(&source, "token", &AnalysisRequest::new(7, now()))
        .await
        .unwrap();

    assert_eq!(analysis.time_analysis.len(), 8);
    for segment in TimeSegment::ALL {
        let summary = analysis.segment(segment).unwrap();
        if segment == TimeSegment::Midday {
            assert_eq!(summary.track_count, 1);
            assert!(!summary.mean_features.is_empty());
        } else {
            assert_eq!(summary.track_count, 0);
            assert!(summary.mean_features.is_empty());
            assert!(summary.sample_tracks.is_empty());
        }
    }
}

#[tokio::test]
async fn test_no_events_skips_feature_fetch() {
    let source = FakeSource::new(Vec::new(), Vec::new());

    let analysis = analyze_listening(&source, "token", &AnalysisRequest::new(7, now()))
        .await
        .unwrap();

    assert_eq!(analysis.total_tracks(), 0);
    assert!(source.feature_calls.borrow().is_empty());
}

#[tokio::test]
async fn test_sample_tracks_capped_at_five() {
    let events: Vec<PlayEvent> = (0..8)
        .map(|i| event(&format!("t{}", i), &format!("2024-03-11T15:{:02}:00Z", i)))
        .collect();
    let source = FakeSource::new(events, Vec::new());

    let analysis = analyze_listening(&source, "token", &AnalysisRequest::new(7, now()))
        .await
        .unwrap();

    let afternoon = analysis.segment(TimeSegment::Afternoon).unwrap();
    assert_eq!(afternoon.track_count, 8);
    assert_eq!(afternoon.sample_tracks.len(), SAMPLE_TRACKS);
    assert_eq!(afternoon.sample_tracks[0].track_id.as_deref(), Some("t0"));
    assert_eq!(afternoon.sample_tracks[4].track_id.as_deref(), Some("t4"));
}

#[tokio::test]
async fn test_malformed_and_old_events_are_counted_not_fatal() {
    let source = FakeSource::new(
        vec![
            event("a", "2024-03-11T09:00:00Z"),
            event("b", "garbage"),
            event("c", "2024-02-01T09:00:00Z"),
        ],
        vec![valence("a", 0.5)],
    );

    let analysis = analyze_listening(&source, "token", &AnalysisRequest::new(7, now()))
        .await
        .unwrap();

    assert_eq!(analysis.total_tracks(), 1);
    assert_eq!(analysis.dropped, 1);
    assert_eq!(analysis.malformed, 1);
    assert_eq!(analysis.unassigned, 0);
    assert_eq!(analysis.outside_window, 1);
    assert_eq!(
        analysis.total_tracks() + analysis.dropped + analysis.outside_window,
        3
    );
}

#[tokio::test]
async fn test_zero_days_disables_window() {
    let source = FakeSource::new(
        vec![
            event("a", "2024-03-11T09:00:00Z"),
            event("c", "2020-01-01T09:00:00Z"),
        ],
        Vec::new(),
    );

    let analysis = analyze_listening(&source, "token", &AnalysisRequest::new(0, now()))
        .await
        .unwrap();

    assert_eq!(analysis.total_tracks(), 2);
    assert_eq!(analysis.outside_window, 0);
}

#[tokio::test]
async fn test_limit_is_clamped() {
    let source = FakeSource::new(Vec::new(), Vec::new());
    let request = AnalysisRequest {
        limit: 500,
        days: 7,
        now: now(),
    };

    analyze_listening(&source, "token", &request).await.unwrap();
    assert_eq!(source.limit_seen.get(), Some(MAX_RECENTLY_PLAYED));
}

#[tokio::test]
async fn test_upstream_failure_aborts_request() {
    let mut source = FakeSource::new(
        vec![event("a", "2024-03-11T09:00:00Z")],
        vec![valence("a", 0.5)],
    );
    source.fail_features = true;

    let result = analyze_listening(&source, "token", &AnalysisRequest::new(7, now())).await;

    assert!(matches!(result, Err(SpotifyError::Auth(_))));
}

#[tokio::test]
async fn test_aggregate_segment_fetches_once() {
    let source = FakeSource::new(Vec::new(), vec![valence("x", 0.2), valence("y", 0.8)]);
    let tracks = vec![
        event("x", "2024-03-11T09:00:00Z"),
        event("y", "2024-03-11T09:10:00Z"),
        event("x", "2024-03-11T09:20:00Z"),
    ];

    let means = aggregate_segment(&source, "token", &tracks).await.unwrap();

    assert!((means.get(Dimension::Valence).unwrap() - 0.5).abs() < 1e-12);
    assert_eq!(source.feature_calls.borrow().len(), 1);
    assert_eq!(source.feature_calls.borrow()[0], vec!["x", "y"]);

    // Nothing to fetch for an empty segment
    let empty = aggregate_segment(&source, "token", &[]).await.unwrap();
    assert!(empty.is_empty());
    assert_eq!(source.feature_calls.borrow().len(), 1);
}

#[tokio::test]
async fn test_analysis_json_shape() {
    let source = FakeSource::new(
        vec![event("m1", "2024-03-11T09:10:00Z")],
        vec![valence("m1", 0.4)],
    );

    let analysis = analyze_listening(&source, "token", &AnalysisRequest::new(7, now()))
        .await
        .unwrap();
    let json = serde_json::to_value(&analysis).unwrap();

    assert_eq!(json["time_analysis"]["morning"]["track_count"], 1);
    assert_eq!(json["time_analysis"]["morning"]["mean_features"]["valence"], 0.4);
    assert_eq!(json["time_analysis"]["night"]["mean_features"], serde_json::json!({}));
    assert_eq!(json["time_segments"][6]["name"], "night");
    assert_eq!(json["time_segments"][6]["start_hour"], 23);
    assert_eq!(json["time_segments"][6]["end_hour"], 2);
}

#[tokio::test]
async fn test_window_past_calendar_range_keeps_everything() {
    let source = FakeSource::new(
        vec![
            event("a", "2024-03-11T09:00:00Z"),
            event("b", "1970-01-01T15:00:00Z"),
        ],
        vec![valence("a", 0.5), valence("b", 0.7)],
    );

    for days in [100_000_000, u32::MAX] {
        let analysis = analyze_listening(&source, "token", &AnalysisRequest::new(days, now()))
            .await
            .unwrap();

        assert_eq!(analysis.total_tracks(), 2);
        assert_eq!(analysis.outside_window, 0);
    }
}
