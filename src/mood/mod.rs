//! # Mood Module
//!
//! Turns a listener's recent play history into a time-of-day mood profile.
//!
//! ```text
//! recently played events
//!          ↓
//! bucket      (hour of day → one of eight segments)
//!          ↓
//! aggregate   (mean audio features per segment)
//!          ↓
//! TimeAnalysis
//! ```
//!
//! Everything here is pure over in-memory data except [`analyze_listening`]
//! and [`aggregate_segment`], which call out to a [`ListeningSource`]. No
//! wall-clock reads happen inside the module; callers pass `now` in.

mod aggregate;
mod analysis;
mod bucket;
mod segment;

pub use aggregate::{
    Dimension, FeatureMeans, aggregate, aggregate_segment, feature_lookup, mean_features,
};
pub use analysis::{
    AnalysisRequest, ListeningSource, MAX_RECENTLY_PLAYED, SAMPLE_TRACKS, SegmentAggregate,
    TimeAnalysis, analyze_listening,
};
pub use bucket::{Buckets, bucket};
pub use segment::{SegmentWindow, TimeSegment};
