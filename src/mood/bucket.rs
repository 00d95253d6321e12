use std::collections::BTreeMap;

use crate::{mood::TimeSegment, types::PlayEvent, utils};

/// Play events grouped by time-of-day segment.
///
/// Every segment is present as a key, in declaration order, even when no
/// event landed in it. Events that could not be placed are only counted.
#[derive(Debug, Clone)]
pub struct Buckets {
    pub segments: BTreeMap<TimeSegment, Vec<PlayEvent>>,
    /// Events whose `played_at` could not be parsed.
    pub malformed: usize,
    /// Events whose hour matched no segment.
    pub unassigned: usize,
}

impl Buckets {
    fn empty() -> Self {
        Buckets {
            segments: TimeSegment::ALL
                .iter()
                .map(|segment| (*segment, Vec::new()))
                .collect(),
            malformed: 0,
            unassigned: 0,
        }
    }

    pub fn get(&self, segment: TimeSegment) -> &[PlayEvent] {
        self.segments
            .get(&segment)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn dropped(&self) -> usize {
        self.malformed + self.unassigned
    }

    pub fn total(&self) -> usize {
        self.segments.values().map(Vec::len).sum()
    }
}

/// Assigns each event to the segment of its UTC hour of day.
///
/// Input order is preserved within each segment. A bad timestamp drops only
/// that event.
pub fn bucket(events: &[PlayEvent]) -> Buckets {
    let mut buckets = Buckets::empty();

    for event in events {
        let Some(hour) = utils::played_at_hour(&event.played_at) else {
            buckets.malformed += 1;
            continue;
        };

        match TimeSegment::classify(hour) {
            Some(segment) => buckets
                .segments
                .entry(segment)
                .or_default()
                .push(event.clone()),
            None => buckets.unassigned += 1,
        }
    }

    buckets
}
