use chrono::Utc;
use tabled::Table;

use crate::{
    cli::access_token,
    config::Config,
    error, info,
    mood::{self, AnalysisRequest, Dimension, SegmentAggregate, TimeSegment},
    spotify::SpotifyClient,
    success,
    types::{SegmentTableRow, SegmentWindowRow},
    utils, warning,
};

/// Builds and prints the time-of-day mood profile.
///
/// Fetches up to `limit` recently played tracks, drops those older than
/// `days` days, groups the rest into the eight time segments and averages
/// their audio features per segment.
///
/// # Arguments
///
/// * `config` - Application configuration
/// * `days` - Size of the history window in days, `0` for no window
/// * `limit` - Number of play events to fetch (1-50)
/// * `json` - Print the full analysis as JSON instead of tables
///
/// # Output Example
///
/// ```text
/// ╭──────────────┬───────────────┬────────┬─────────┬────────┬──────────────┬─────────╮
/// │ segment      │ hours         │ tracks │ valence │ energy │ danceability │ tempo   │
/// ├──────────────┼───────────────┼────────┼─────────┼────────┼──────────────┼─────────┤
/// │ morning      │ 08:00 - 11:00 │ 12     │ 0.612   │ 0.701  │ 0.655        │ 118.204 │
/// ```
///
/// # Notes
///
/// Hours are UTC, since that is what Spotify reports in `played_at`.
pub async fn analyze(config: Config, days: u32, limit: u32, json: bool) {
    let token = access_token(&config).await;
    let client = SpotifyClient::new(config);

    let request = AnalysisRequest {
        limit,
        days,
        now: Utc::now(),
    };

    let pb = utils::spinner("Analysing listening history...");
    let analysis = match mood::analyze_listening(&client, &token, &request).await {
        Ok(a) => a,
        Err(e) => {
            pb.finish_and_clear();
            error!("Failed to analyse listening history: {}", e);
        }
    };
    pb.finish_and_clear();

    if json {
        match serde_json::to_string_pretty(&analysis) {
            Ok(out) => println!("{}", out),
            Err(e) => error!("Failed to serialize analysis: {}", e),
        }
        return;
    }

    if analysis.malformed > 0 {
        warning!(
            "Skipped {} play events with malformed timestamps.",
            analysis.malformed
        );
    }
    if analysis.unassigned > 0 {
        warning!(
            "Skipped {} play events whose hour matched no time segment.",
            analysis.unassigned
        );
    }
    if analysis.outside_window > 0 {
        info!(
            "{} play events are older than {} days and were left out.",
            analysis.outside_window, days
        );
    }

    if analysis.total_tracks() == 0 {
        warning!("No recently played tracks in the last {} days.", days);
        return;
    }

    let rows: Vec<SegmentTableRow> = analysis.time_analysis.values().map(segment_row).collect();
    println!("{}", Table::new(rows));

    for summary in analysis.time_analysis.values() {
        if summary.sample_tracks.is_empty() {
            continue;
        }

        let samples = summary
            .sample_tracks
            .iter()
            .map(|e| format!("{} - {}", e.track.artist_names(), e.track.name))
            .collect::<Vec<_>>()
            .join("; ");
        info!("{}: {}", summary.segment, samples);
    }

    success!(
        "Analysed {} tracks across {} segments.",
        analysis.total_tracks(),
        analysis
            .time_analysis
            .values()
            .filter(|s| s.track_count > 0)
            .count()
    );
}

/// Prints the fixed segment table.
pub fn segments() {
    let rows: Vec<SegmentWindowRow> = TimeSegment::windows()
        .into_iter()
        .map(|w| SegmentWindowRow {
            segment: w.name.to_string(),
            start_hour: w.start_hour,
            end_hour: w.end_hour,
            wraps_midnight: (if w.start_hour > w.end_hour { "yes" } else { "no" }).to_string(),
        })
        .collect();

    println!("{}", Table::new(rows));
}

fn segment_row(summary: &SegmentAggregate) -> SegmentTableRow {
    let mean = |d: Dimension| utils::format_feature(summary.mean_features.get(d));

    SegmentTableRow {
        segment: summary.segment.to_string(),
        hours: utils::format_segment_hours(summary.segment),
        tracks: summary.track_count,
        valence: mean(Dimension::Valence),
        energy: mean(Dimension::Energy),
        danceability: mean(Dimension::Danceability),
        tempo: mean(Dimension::Tempo),
    }
}
