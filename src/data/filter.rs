use std::collections::BTreeSet;

use super::model::{Dataset, Feature, Track};

// ---------------------------------------------------------------------------
// Filter state: the three dashboard controls
// ---------------------------------------------------------------------------

/// Current selections of the genre, popularity and feature controls.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    pub selected_genres: BTreeSet<String>,
    /// Inclusive `(low, high)` popularity bounds.
    pub popularity_range: (u8, u8),
    pub selected_feature: Feature,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            selected_genres: BTreeSet::new(),
            popularity_range: (0, 100),
            selected_feature: Feature::default(),
        }
    }
}

impl FilterState {
    /// Whether a track passes the genre and popularity filters.
    ///
    /// An inverted range (`low > high`) admits nothing.
    pub fn admits(&self, track: &Track) -> bool {
        let (low, high) = self.popularity_range;
        low <= track.popularity
            && track.popularity <= high
            && self.selected_genres.contains(&track.genre)
    }
}

// ---------------------------------------------------------------------------
// Filtered view
// ---------------------------------------------------------------------------

/// Tracks passing the current filters, in dataset row order.
pub type FilteredView<'a> = Vec<&'a Track>;

/// Return the tracks of `dataset` admitted by `filters`.
///
/// A track passes when:
/// * its genre is in the selected set (an empty set selects nothing), and
/// * its popularity lies inside the inclusive range.
pub fn apply<'a>(dataset: &'a Dataset, filters: &FilterState) -> FilteredView<'a> {
    if filters.selected_genres.is_empty() {
        return Vec::new();
    }
    dataset
        .tracks()
        .iter()
        .filter(|track| filters.admits(track))
        .collect()
}
