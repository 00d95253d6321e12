use std::{
    collections::{BTreeMap, HashMap},
    fmt,
};

use serde::Serialize;

use crate::{
    mood::ListeningSource,
    spotify::SpotifyError,
    types::{AudioFeatures, PlayEvent},
    utils,
};

/// The audio feature dimensions that are averaged per segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Valence,
    Energy,
    Danceability,
    Tempo,
    Instrumentalness,
    Acousticness,
    Speechiness,
    Liveness,
}

impl Dimension {
    pub const ALL: [Dimension; 8] = [
        Dimension::Valence,
        Dimension::Energy,
        Dimension::Danceability,
        Dimension::Tempo,
        Dimension::Instrumentalness,
        Dimension::Acousticness,
        Dimension::Speechiness,
        Dimension::Liveness,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Dimension::Valence => "valence",
            Dimension::Energy => "energy",
            Dimension::Danceability => "danceability",
            Dimension::Tempo => "tempo",
            Dimension::Instrumentalness => "instrumentalness",
            Dimension::Acousticness => "acousticness",
            Dimension::Speechiness => "speechiness",
            Dimension::Liveness => "liveness",
        }
    }

    pub fn value_of(&self, features: &AudioFeatures) -> Option<f64> {
        match self {
            Dimension::Valence => features.valence,
            Dimension::Energy => features.energy,
            Dimension::Danceability => features.danceability,
            Dimension::Tempo => features.tempo,
            Dimension::Instrumentalness => features.instrumentalness,
            Dimension::Acousticness => features.acousticness,
            Dimension::Speechiness => features.speechiness,
            Dimension::Liveness => features.liveness,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Mean value per dimension.
///
/// An empty map means no feature vectors were available, which is different
/// from a map where every mean is zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FeatureMeans(BTreeMap<Dimension, f64>);

impl FeatureMeans {
    pub fn get(&self, dimension: Dimension) -> Option<f64> {
        self.0.get(&dimension).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Dimension, f64)> + '_ {
        self.0.iter().map(|(d, v)| (*d, *v))
    }
}

/// Averages the eight dimensions over `vectors`.
///
/// A vector missing a dimension contributes nothing to that dimension's sum,
/// but the divisor is always the total number of vectors.
pub fn mean_features<'a, I>(vectors: I) -> FeatureMeans
where
    I: IntoIterator<Item = &'a AudioFeatures>,
{
    let mut sums: BTreeMap<Dimension, f64> = Dimension::ALL.iter().map(|d| (*d, 0.0)).collect();
    let mut count = 0usize;

    for features in vectors {
        count += 1;
        for dimension in Dimension::ALL {
            if let Some(value) = dimension.value_of(features) {
                *sums.entry(dimension).or_default() += value;
            }
        }
    }

    if count == 0 {
        return FeatureMeans::default();
    }

    FeatureMeans(
        sums.into_iter()
            .map(|(dimension, sum)| (dimension, sum / count as f64))
            .collect(),
    )
}

/// Averages the features of the distinct tracks in `tracks`, looking each id
/// up in `lookup`. Ids without a feature vector are skipped.
pub fn aggregate(tracks: &[PlayEvent], lookup: &HashMap<String, AudioFeatures>) -> FeatureMeans {
    let ids = utils::distinct_track_ids(tracks);
    mean_features(ids.iter().filter_map(|id| lookup.get(id)))
}

/// Fetches features for the distinct tracks in `tracks` with a single batched
/// call and averages them.
pub async fn aggregate_segment<S: ListeningSource>(
    source: &S,
    token: &str,
    tracks: &[PlayEvent],
) -> Result<FeatureMeans, SpotifyError> {
    let ids = utils::distinct_track_ids(tracks);
    if ids.is_empty() {
        return Ok(FeatureMeans::default());
    }

    let features = source.audio_features(token, &ids).await?;
    Ok(aggregate(tracks, &feature_lookup(features)))
}

/// Indexes the non-null vectors of a feature batch by track id.
pub fn feature_lookup(features: Vec<Option<AudioFeatures>>) -> HashMap<String, AudioFeatures> {
    features
        .into_iter()
        .flatten()
        .map(|f| (f.id.clone(), f))
        .collect()
}
