use super::aggregate::ScatterPoint;
use super::filter::{apply, FilterState};
use super::model::{Dataset, Track};

// ---------------------------------------------------------------------------
// Click payload → track lookup
// ---------------------------------------------------------------------------

/// Correlation identifiers carried by a clicked chart point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickPayload {
    pub track_name: String,
    pub artist_name: String,
}

impl From<&ScatterPoint> for ClickPayload {
    fn from(point: &ScatterPoint) -> Self {
        ClickPayload {
            track_name: point.track_name.clone(),
            artist_name: point.artist_name.clone(),
        }
    }
}

/// Resolve a click against the *current* filters.
///
/// The view is re-derived rather than taken from the rendered chart, since
/// the filters may have changed after the point was drawn. The first track
/// in row order matching both identifiers wins.
pub fn resolve<'a>(
    dataset: &'a Dataset,
    payload: &ClickPayload,
    filters: &FilterState,
) -> Option<&'a Track> {
    apply(dataset, filters)
        .into_iter()
        .find(|t| t.matches(&payload.track_name, &payload.artist_name))
}

// ---------------------------------------------------------------------------
// Detail panel content
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default)]
pub enum DetailPanel {
    /// Nothing clicked yet.
    #[default]
    Empty,
    Found(Track),
    /// The clicked point no longer matches the active filters.
    NotFound {
        track_name: String,
        artist_name: String,
    },
}

impl DetailPanel {
    pub fn from_resolution(payload: &ClickPayload, resolved: Option<&Track>) -> Self {
        match resolved {
            Some(track) => DetailPanel::Found(track.clone()),
            None => DetailPanel::NotFound {
                track_name: payload.track_name.clone(),
                artist_name: payload.artist_name.clone(),
            },
        }
    }

    /// Text shown when there is no track to display.
    pub fn message(&self) -> Option<String> {
        match self {
            DetailPanel::Empty => Some("Click a point in the scatter plot to see track details.".into()),
            DetailPanel::Found(_) => None,
            DetailPanel::NotFound {
                track_name,
                artist_name,
            } => Some(format!(
                "Track not found: '{track_name}' by {artist_name} is not in the current selection."
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::data::model::tests::track;

    fn payload(name: &str, artist: &str) -> ClickPayload {
        ClickPayload {
            track_name: name.to_string(),
            artist_name: artist.to_string(),
        }
    }

    fn filters(genres: &[&str]) -> FilterState {
        FilterState {
            selected_genres: genres.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>(),
            ..FilterState::default()
        }
    }

    #[test]
    fn test_resolves_first_match_in_view() {
        let ds = Dataset::from_tracks(vec![
            track("Dup", "Band", "rock", 20),
            track("Dup", "Band", "pop", 70),
            track("Dup", "Band", "rock", 90),
        ]);
        let hit = resolve(&ds, &payload("Dup", "Band"), &filters(&["pop", "rock"])).unwrap();
        assert_eq!((hit.genre.as_str(), hit.popularity), ("rock", 20));

        // With rock deselected the duplicate in pop is the first visible match.
        let hit = resolve(&ds, &payload("Dup", "Band"), &filters(&["pop"])).unwrap();
        assert_eq!(hit.genre, "pop");
    }

    #[test]
    fn test_deselected_genre_is_not_found() {
        let ds = Dataset::from_tracks(vec![
            track("Song", "Band", "rock", 50),
            track("Other", "Singer", "pop", 60),
        ]);
        let click = payload("Song", "Band");
        let resolved = resolve(&ds, &click, &filters(&["pop"]));
        assert!(resolved.is_none());

        let panel = DetailPanel::from_resolution(&click, resolved);
        assert!(matches!(panel, DetailPanel::NotFound { .. }));
        assert!(panel.message().unwrap().contains("not found"));
    }

    #[test]
    fn test_popularity_outside_range_is_not_found() {
        let ds = Dataset::from_tracks(vec![track("Song", "Band", "rock", 50)]);
        let state = FilterState {
            popularity_range: (60, 100),
            ..filters(&["rock"])
        };
        assert!(resolve(&ds, &payload("Song", "Band"), &state).is_none());
    }
}
