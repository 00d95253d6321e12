use std::collections::HashMap;

use sonicsync::mood::*;
use sonicsync::types::{AudioFeatures, PlayEvent, Track};

// Helper function to create a test play event
fn create_test_event(id: Option<&str>, played_at: &str) -> PlayEvent {
    PlayEvent {
        track_id: id.map(String::from),
        played_at: played_at.to_string(),
        track: Track {
            id: id.map(String::from),
            name: format!("Track {}", id.unwrap_or("local")),
            uri: String::new(),
            artists: Vec::new(),
            album: None,
            popularity: None,
            duration_ms: None,
        },
    }
}

fn at_hour(id: &str, hour: u32) -> PlayEvent {
    create_test_event(Some(id), &format!("2024-03-10T{:02}:30:00.000Z", hour))
}

fn valence(id: &str, value: f64) -> AudioFeatures {
    AudioFeatures {
        id: id.to_string(),
        valence: Some(value),
        ..Default::default()
    }
}

fn full_features(id: &str, base: f64) -> AudioFeatures {
    AudioFeatures {
        id: id.to_string(),
        valence: Some(base),
        energy: Some(base + 0.1),
        danceability: Some(base + 0.2),
        tempo: Some(100.0 + base * 10.0),
        instrumentalness: Some(base / 2.0),
        acousticness: Some(1.0 - base),
        speechiness: Some(0.05),
        liveness: Some(0.1),
        key: Some(5),
        loudness: Some(-6.0),
        mode: Some(1),
        duration_ms: Some(200_000),
        time_signature: Some(4),
    }
}

fn lookup(features: Vec<AudioFeatures>) -> HashMap<String, AudioFeatures> {
    features.into_iter().map(|f| (f.id.clone(), f)).collect()
}

#[test]
fn test_classify_is_total() {
    for hour in 0..24 {
        let matches: Vec<TimeSegment> = TimeSegment::ALL
            .into_iter()
            .filter(|s| s.contains(hour))
            .collect();

        // Exactly one segment per hour
        assert_eq!(matches.len(), 1, "hour {} matched {:?}", hour, matches);
        assert_eq!(TimeSegment::classify(hour), Some(matches[0]));
    }
}

#[test]
fn test_classify_wraparound() {
    assert_eq!(TimeSegment::classify(23), Some(TimeSegment::Night));
    assert_eq!(TimeSegment::classify(0), Some(TimeSegment::Night));
    assert_eq!(TimeSegment::classify(1), Some(TimeSegment::Night));
    assert_eq!(TimeSegment::classify(2), Some(TimeSegment::LateNight));
    assert_eq!(TimeSegment::classify(2).unwrap().name(), "late_night");
}

#[test]
fn test_classify_boundaries() {
    // The start hour belongs to the segment that starts there
    assert_eq!(TimeSegment::classify(5), Some(TimeSegment::EarlyMorning));
    assert_eq!(TimeSegment::classify(7), Some(TimeSegment::EarlyMorning));
    assert_eq!(TimeSegment::classify(8), Some(TimeSegment::Morning));
    assert_eq!(TimeSegment::classify(11), Some(TimeSegment::Midday));
    assert_eq!(TimeSegment::classify(14), Some(TimeSegment::Afternoon));
    assert_eq!(TimeSegment::classify(17), Some(TimeSegment::Evening));
    assert_eq!(TimeSegment::classify(20), Some(TimeSegment::LateEvening));
    assert_eq!(TimeSegment::classify(22), Some(TimeSegment::LateEvening));
    assert_eq!(TimeSegment::classify(4), Some(TimeSegment::LateNight));
}

#[test]
fn test_classify_out_of_range() {
    assert_eq!(TimeSegment::classify(24), None);
    assert_eq!(TimeSegment::classify(99), None);
}

#[test]
fn test_segment_windows() {
    let windows = TimeSegment::windows();
    assert_eq!(windows.len(), 8);
    assert_eq!(windows[0].name, "early_morning");
    assert_eq!((windows[0].start_hour, windows[0].end_hour), (5, 8));
    assert_eq!(windows[6].name, "night");
    assert_eq!((windows[6].start_hour, windows[6].end_hour), (23, 2));

    // Windows cover 24 hours in total
    let hours: u32 = windows
        .iter()
        .map(|w| (w.end_hour + 24 - w.start_hour) % 24)
        .sum();
    assert_eq!(hours, 24);
}

#[test]
fn test_segment_serializes_as_name() {
    for segment in TimeSegment::ALL {
        let json = serde_json::to_value(segment).unwrap();
        assert_eq!(json, serde_json::Value::String(segment.name().to_string()));
        assert_eq!(segment.to_string(), segment.name());
    }
}

#[test]
fn test_bucket_all_keys_present() {
    let buckets = bucket(&[]);

    assert_eq!(buckets.segments.len(), 8);
    let keys: Vec<TimeSegment> = buckets.segments.keys().copied().collect();
    assert_eq!(keys, TimeSegment::ALL.to_vec());
    assert!(buckets.segments.values().all(|v| v.is_empty()));
    assert_eq!(buckets.dropped(), 0);
}

#[test]
fn test_bucket_preserves_order_within_segment() {
    let events = vec![
        at_hour("a", 9),
        at_hour("b", 15),
        at_hour("c", 10),
        at_hour("d", 8),
    ];

    let buckets = bucket(&events);
    let morning: Vec<&str> = buckets
        .get(TimeSegment::Morning)
        .iter()
        .map(|e| e.track_id.as_deref().unwrap())
        .collect();

    assert_eq!(morning, vec!["a", "c", "d"]);
    assert_eq!(buckets.get(TimeSegment::Afternoon).len(), 1);
}

#[test]
fn test_bucket_drops_malformed_timestamps() {
    let events = vec![
        at_hour("a", 9),
        create_test_event(Some("b"), "yesterday at noon"),
        create_test_event(Some("c"), ""),
        at_hour("d", 0),
    ];

    let buckets = bucket(&events);

    assert_eq!(buckets.malformed, 2);
    assert_eq!(buckets.unassigned, 0);
    assert_eq!(buckets.get(TimeSegment::Morning).len(), 1);
    assert_eq!(buckets.get(TimeSegment::Night).len(), 1);

    // Nothing is lost without being counted
    assert_eq!(buckets.total() + buckets.dropped(), events.len());
}

#[test]
fn test_bucket_keeps_events_without_track_id() {
    let events = vec![create_test_event(None, "2024-03-10T12:00:00Z")];

    let buckets = bucket(&events);
    assert_eq!(buckets.get(TimeSegment::Midday).len(), 1);
    assert_eq!(buckets.dropped(), 0);
}

#[test]
fn test_mean_features_sanity() {
    let features = vec![valence("a", 0.2), valence("b", 0.8)];
    let means = mean_features(&features);

    assert!((means.get(Dimension::Valence).unwrap() - 0.5).abs() < 1e-12);
}

#[test]
fn test_mean_features_empty_is_no_aggregate() {
    let means = mean_features(&Vec::<AudioFeatures>::new());

    // Empty, not a map of zeros
    assert!(means.is_empty());
    assert_eq!(means.get(Dimension::Valence), None);
    assert_eq!(serde_json::to_string(&means).unwrap(), "{}");
}

#[test]
fn test_mean_features_divides_by_total_count() {
    // Second vector lacks energy; its absence still counts in the divisor
    let features = vec![
        AudioFeatures {
            id: "a".to_string(),
            valence: Some(0.4),
            energy: Some(0.9),
            ..Default::default()
        },
        valence("b", 0.6),
    ];

    let means = mean_features(&features);

    assert_eq!(means.len(), 8);
    assert!((means.get(Dimension::Valence).unwrap() - 0.5).abs() < 1e-12);
    assert!((means.get(Dimension::Energy).unwrap() - 0.45).abs() < 1e-12);
    assert_eq!(means.get(Dimension::Tempo), Some(0.0));
}

#[test]
fn test_aggregate_is_order_independent() {
    let events: Vec<PlayEvent> = (0..6).map(|i| at_hour(&format!("t{}", i), 9)).collect();
    let features = lookup(
        (0..6)
            .map(|i| full_features(&format!("t{}", i), i as f64 * 0.13))
            .collect(),
    );

    let forward = aggregate(&events, &features);

    let mut shuffled = events.clone();
    shuffled.reverse();
    shuffled.swap(0, 3);
    let backward = aggregate(&shuffled, &features);

    for dimension in Dimension::ALL {
        let a = forward.get(dimension).unwrap();
        let b = backward.get(dimension).unwrap();
        assert!((a - b).abs() < 1e-9, "{} differs: {} vs {}", dimension, a, b);
    }
}

#[test]
fn test_aggregate_skips_unresolved_and_duplicate_ids() {
    let events = vec![
        at_hour("a", 9),
        at_hour("a", 9),
        at_hour("missing", 9),
        create_test_event(None, "2024-03-10T09:00:00Z"),
        at_hour("b", 9),
    ];
    let features = lookup(vec![valence("a", 0.2), valence("b", 0.8)]);

    let means = aggregate(&events, &features);

    // "a" counted once, "missing" and the null id skipped
    assert!((means.get(Dimension::Valence).unwrap() - 0.5).abs() < 1e-12);
}

#[test]
fn test_aggregate_without_any_features() {
    let events = vec![at_hour("a", 9)];

    assert!(aggregate(&events, &HashMap::new()).is_empty());
    assert!(aggregate(&[], &lookup(vec![valence("a", 0.1)])).is_empty());
}

#[test]
fn test_feature_lookup_skips_nulls() {
    let features = feature_lookup(vec![Some(valence("a", 0.1)), None, Some(valence("b", 0.2))]);

    assert_eq!(features.len(), 2);
    assert!(features.contains_key("a"));
    assert!(features.contains_key("b"));
}

#[test]
fn test_bucket_then_aggregate_scenario() {
    let events = vec![at_hour("m1", 9), at_hour("m2", 9), at_hour("e1", 22)];

    let buckets = bucket(&events);
    assert_eq!(buckets.get(TimeSegment::Morning).len(), 2);
    assert_eq!(buckets.get(TimeSegment::LateEvening).len(), 1);

    let morning = buckets.get(TimeSegment::Morning);
    let means = aggregate(morning, &lookup(vec![valence("m1", 0.4), valence("m2", 0.6)]));

    assert!((means.get(Dimension::Valence).unwrap() - 0.5).abs() < 1e-12);
    for dimension in Dimension::ALL
        .into_iter()
        .filter(|d| *d != Dimension::Valence)
    {
        assert_eq!(means.get(dimension), Some(0.0));
    }
}
