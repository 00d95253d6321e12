use std::fmt;

use serde::Serialize;

/// A named time-of-day window used to group listening activity.
///
/// The eight windows cover the whole 24 hour clock. A window whose start hour
/// is greater than its end hour wraps across midnight (`Night` runs from 23:00
/// to 02:00). Containment is half-open: the start hour belongs to the window,
/// the end hour belongs to the next one.
///
/// The derived ordering follows declaration order, which is also the order in
/// which [`TimeSegment::classify`] tests the windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeSegment {
    EarlyMorning,
    Morning,
    Midday,
    Afternoon,
    Evening,
    LateEvening,
    Night,
    LateNight,
}

/// Static description of a segment for display purposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SegmentWindow {
    pub name: &'static str,
    pub start_hour: u32,
    pub end_hour: u32,
}

impl TimeSegment {
    pub const ALL: [TimeSegment; 8] = [
        TimeSegment::EarlyMorning,
        TimeSegment::Morning,
        TimeSegment::Midday,
        TimeSegment::Afternoon,
        TimeSegment::Evening,
        TimeSegment::LateEvening,
        TimeSegment::Night,
        TimeSegment::LateNight,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TimeSegment::EarlyMorning => "early_morning",
            TimeSegment::Morning => "morning",
            TimeSegment::Midday => "midday",
            TimeSegment::Afternoon => "afternoon",
            TimeSegment::Evening => "evening",
            TimeSegment::LateEvening => "late_evening",
            TimeSegment::Night => "night",
            TimeSegment::LateNight => "late_night",
        }
    }

    pub fn start_hour(&self) -> u32 {
        self.bounds().0
    }

    pub fn end_hour(&self) -> u32 {
        self.bounds().1
    }

    fn bounds(&self) -> (u32, u32) {
        match self {
            TimeSegment::EarlyMorning => (5, 8),
            TimeSegment::Morning => (8, 11),
            TimeSegment::Midday => (11, 14),
            TimeSegment::Afternoon => (14, 17),
            TimeSegment::Evening => (17, 20),
            TimeSegment::LateEvening => (20, 23),
            TimeSegment::Night => (23, 2),
            TimeSegment::LateNight => (2, 5),
        }
    }

    /// Returns `true` when `hour` falls inside this window, honouring
    /// wraparound for windows that cross midnight.
    pub fn contains(&self, hour: u32) -> bool {
        let (start, end) = self.bounds();
        if start <= end {
            start <= hour && hour < end
        } else {
            hour >= start || hour < end
        }
    }

    /// Maps an hour of the day (0-23) to its segment.
    ///
    /// Segments are tested in declaration order and the first match wins.
    /// The fixed table is exhaustive, so `None` is only returned for hours
    /// outside `0..24`; callers treat it as "unassigned" and skip the event.
    pub fn classify(hour: u32) -> Option<TimeSegment> {
        if hour > 23 {
            return None;
        }

        TimeSegment::ALL
            .into_iter()
            .find(|segment| segment.contains(hour))
    }

    /// The full segment table in declaration order.
    pub fn windows() -> Vec<SegmentWindow> {
        TimeSegment::ALL
            .iter()
            .map(|segment| SegmentWindow {
                name: segment.name(),
                start_hour: segment.start_hour(),
                end_hour: segment.end_hour(),
            })
            .collect()
    }
}

impl fmt::Display for TimeSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
