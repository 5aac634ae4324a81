use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::filter::FilterState;

/// Number of genres pre-selected when a dataset is first shown.
pub const DEFAULT_GENRE_COUNT: usize = 5;

// ---------------------------------------------------------------------------
// Feature – one of the nine numeric audio descriptors
// ---------------------------------------------------------------------------

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Feature {
    #[default]
    Danceability,
    Energy,
    Valence,
    Loudness,
    Tempo,
    Acousticness,
    Speechiness,
    Instrumentalness,
    Liveness,
}

impl Feature {
    /// All features, in the order the selector lists them.
    pub const ALL: [Feature; 9] = [
        Feature::Danceability,
        Feature::Energy,
        Feature::Valence,
        Feature::Loudness,
        Feature::Tempo,
        Feature::Acousticness,
        Feature::Speechiness,
        Feature::Instrumentalness,
        Feature::Liveness,
    ];

    /// Column name in the source table.
    pub fn column_name(self) -> &'static str {
        match self {
            Feature::Danceability => "danceability",
            Feature::Energy => "energy",
            Feature::Valence => "valence",
            Feature::Loudness => "loudness",
            Feature::Tempo => "tempo",
            Feature::Acousticness => "acousticness",
            Feature::Speechiness => "speechiness",
            Feature::Instrumentalness => "instrumentalness",
            Feature::Liveness => "liveness",
        }
    }

    /// Human readable axis label.
    pub fn label(self) -> &'static str {
        match self {
            Feature::Danceability => "Danceability",
            Feature::Energy => "Energy",
            Feature::Valence => "Valence",
            Feature::Loudness => "Loudness (dB)",
            Feature::Tempo => "Tempo (BPM)",
            Feature::Acousticness => "Acousticness",
            Feature::Speechiness => "Speechiness",
            Feature::Instrumentalness => "Instrumentalness",
            Feature::Liveness => "Liveness",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.column_name())
    }
}

impl FromStr for Feature {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Feature::ALL
            .iter()
            .copied()
            .find(|f| f.column_name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown feature '{s}'"))
    }
}

// ---------------------------------------------------------------------------
// Track – one row of the source table
// ---------------------------------------------------------------------------

/// A single track with its audio features.
///
/// Field names match the source column names so the same struct serves the
/// CSV/JSON readers and the CSV export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub track_name: String,
    pub artist_name: String,
    pub genre: String,
    pub popularity: u8,
    pub danceability: f64,
    pub energy: f64,
    pub valence: f64,
    pub loudness: f64,
    pub tempo: f64,
    pub acousticness: f64,
    pub speechiness: f64,
    pub instrumentalness: f64,
    pub liveness: f64,
}

impl Track {
    /// Value of the given feature for this track.
    pub fn feature(&self, feature: Feature) -> f64 {
        match feature {
            Feature::Danceability => self.danceability,
            Feature::Energy => self.energy,
            Feature::Valence => self.valence,
            Feature::Loudness => self.loudness,
            Feature::Tempo => self.tempo,
            Feature::Acousticness => self.acousticness,
            Feature::Speechiness => self.speechiness,
            Feature::Instrumentalness => self.instrumentalness,
            Feature::Liveness => self.liveness,
        }
    }

    /// Whether this track is identified by the given pair.
    pub fn matches(&self, track_name: &str, artist_name: &str) -> bool {
        self.track_name == track_name && self.artist_name == artist_name
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The immutable track table with its sorted genre index.
#[derive(Debug, Clone)]
pub struct Dataset {
    tracks: Vec<Track>,
    genres: Vec<String>,
}

impl Dataset {
    /// Build the genre index from already validated tracks.
    pub fn from_tracks(tracks: Vec<Track>) -> Self {
        let genres: BTreeSet<String> = tracks.iter().map(|t| t.genre.clone()).collect();
        Dataset {
            tracks,
            genres: genres.into_iter().collect(),
        }
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// All unique genres, sorted ascending.
    pub fn distinct_genres(&self) -> &[String] {
        &self.genres
    }

    /// First track in row order identified by `(track_name, artist_name)`.
    pub fn find_track(&self, track_name: &str, artist_name: &str) -> Option<&Track> {
        self.tracks
            .iter()
            .find(|t| t.matches(track_name, artist_name))
    }

    /// Initial filter: the first few sorted genres, full popularity range,
    /// default feature.
    pub fn default_filter_state(&self) -> FilterState {
        FilterState {
            selected_genres: self
                .genres
                .iter()
                .take(DEFAULT_GENRE_COUNT)
                .cloned()
                .collect(),
            ..FilterState::default()
        }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn track(name: &str, artist: &str, genre: &str, popularity: u8) -> Track {
        Track {
            track_name: name.to_string(),
            artist_name: artist.to_string(),
            genre: genre.to_string(),
            popularity,
            danceability: 0.5,
            energy: 0.5,
            valence: 0.5,
            loudness: -6.0,
            tempo: 120.0,
            acousticness: 0.1,
            speechiness: 0.05,
            instrumentalness: 0.0,
            liveness: 0.1,
        }
    }

    #[test]
    fn test_distinct_genres_sorted() {
        let ds = Dataset::from_tracks(vec![
            track("a", "x", "rock", 10),
            track("b", "y", "jazz", 20),
            track("c", "z", "rock", 30),
            track("d", "z", "blues", 40),
        ]);
        assert_eq!(ds.distinct_genres(), ["blues", "jazz", "rock"]);
    }

    #[test]
    fn test_find_track_first_match_wins() {
        let ds = Dataset::from_tracks(vec![
            track("Song", "Band", "rock", 10),
            track("Song", "Band", "pop", 90),
        ]);
        let found = ds.find_track("Song", "Band").unwrap();
        assert_eq!(found.genre, "rock");
        assert!(ds.find_track("Song", "Other").is_none());
    }

    #[test]
    fn test_default_filter_takes_first_five_sorted_genres() {
        let genres = ["g", "f", "e", "d", "c", "b", "a"];
        let tracks = genres
            .iter()
            .enumerate()
            .map(|(i, g)| track(&format!("t{i}"), "x", g, 50))
            .collect();
        let ds = Dataset::from_tracks(tracks);
        let state = ds.default_filter_state();
        let selected: Vec<&str> = state.selected_genres.iter().map(String::as_str).collect();
        assert_eq!(selected, ["a", "b", "c", "d", "e"]);
        assert_eq!(state.popularity_range, (0, 100));
        assert_eq!(state.selected_feature, Feature::Danceability);
    }

    #[test]
    fn test_feature_parse_and_lookup() {
        assert_eq!("Tempo".parse::<Feature>().unwrap(), Feature::Tempo);
        assert!("bpm".parse::<Feature>().is_err());
        let t = track("a", "x", "rock", 10);
        assert_eq!(t.feature(Feature::Loudness), -6.0);
        assert_eq!(t.feature(Feature::Tempo), 120.0);
    }
}
