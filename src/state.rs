use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::color::GenreColors;
use crate::controller::Controller;
use crate::data::filter::FilterState;
use crate::data::loader::load_file;
use crate::data::model::{Dataset, Feature};
use crate::data::selection::{ClickPayload, DetailPanel};

/// One-line outcome shown in the top bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Info(String),
    Error(String),
}

impl Status {
    pub fn text(&self) -> &str {
        match self {
            Status::Info(msg) | Status::Error(msg) => msg,
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Controller over the loaded dataset (None until a load succeeds).
    pub controller: Option<Controller>,

    /// Genre colours for the loaded dataset.
    pub colors: GenreColors,

    /// Content of the detail panel.
    pub detail: DetailPanel,

    /// File the current dataset came from.
    pub source_path: Option<PathBuf>,

    /// Status / error message shown in the UI.
    pub status_message: Option<Status>,
}

impl AppState {
    /// Ingest a newly loaded dataset and render its default selection.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        self.colors = GenreColors::new(dataset.distinct_genres());
        let mut controller = Controller::new(Arc::new(dataset));
        let initial = controller.filters().clone();
        controller.refresh(initial);

        self.controller = Some(controller);
        self.detail = DetailPanel::Empty;
        self.status_message = None;
    }

    /// Load `path`, keeping the current dataset if it fails.
    pub fn load_from(&mut self, path: &Path) {
        match load_file(path) {
            Ok(dataset) => {
                if dataset.is_empty() {
                    log::warn!("{} contains no tracks", path.display());
                }
                log::info!(
                    "Loaded {} tracks in {} genres from {}",
                    dataset.len(),
                    dataset.distinct_genres().len(),
                    path.display()
                );
                self.set_dataset(dataset);
                self.source_path = Some(path.to_path_buf());
            }
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                self.status_message = Some(Status::Error(format!(
                    "Error loading {}: {e}",
                    path.display()
                )));
            }
        }
    }

    /// Apply `edit` to a copy of the current filters and re-render if it
    /// changed anything.
    pub fn update_filters(&mut self, edit: impl FnOnce(&mut FilterState)) {
        let Some(controller) = self.controller.as_mut() else {
            return;
        };
        let mut next = controller.filters().clone();
        edit(&mut next);
        if next != *controller.filters() {
            controller.refresh(next);
        }
    }

    /// Toggle a single genre in the multi-select.
    pub fn toggle_genre(&mut self, genre: &str) {
        self.update_filters(|f| {
            if !f.selected_genres.remove(genre) {
                f.selected_genres.insert(genre.to_string());
            }
        });
    }

    pub fn select_all_genres(&mut self) {
        let Some(all) = self
            .controller
            .as_ref()
            .map(|c| c.dataset().distinct_genres().to_vec())
        else {
            return;
        };
        self.update_filters(|f| f.selected_genres = all.into_iter().collect());
    }

    pub fn select_no_genres(&mut self) {
        self.update_filters(|f| f.selected_genres.clear());
    }

    /// Set the popularity bounds, clamped to 0..=100 with `low <= high`.
    pub fn set_popularity_range(&mut self, low: u8, high: u8) {
        let high = high.min(100);
        let low = low.min(high);
        self.update_filters(|f| f.popularity_range = (low, high));
    }

    pub fn set_feature(&mut self, feature: Feature) {
        self.update_filters(|f| f.selected_feature = feature);
    }

    /// Resolve a chart click into the detail panel.
    pub fn click(&mut self, payload: &ClickPayload) {
        if let Some(controller) = &self.controller {
            self.detail = controller.resolve_click(payload);
        }
    }

    /// Export the current view, reporting the outcome in the status line.
    pub fn export_to(&mut self, path: &Path) {
        let Some(controller) = &self.controller else {
            return;
        };
        self.status_message = Some(match controller.export(path) {
            Ok(rows) => Status::Info(format!("Exported {rows} tracks to {}", path.display())),
            Err(e) => {
                log::error!("Export to {} failed: {e}", path.display());
                Status::Error(format!("Export failed: {e}"))
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::Phase;
    use crate::data::model::tests::track;

    fn loaded() -> AppState {
        let mut state = AppState::default();
        state.set_dataset(Dataset::from_tracks(vec![
            track("one", "A", "pop", 10),
            track("two", "B", "pop", 90),
            track("three", "C", "rock", 50),
        ]));
        state
    }

    fn view_len(state: &AppState) -> usize {
        state.controller.as_ref().unwrap().frame().view_len
    }

    #[test]
    fn test_initial_render_uses_default_genres() {
        let state = loaded();
        let ctl = state.controller.as_ref().unwrap();
        assert_eq!(ctl.phase(), Phase::Rendered);
        assert_eq!(ctl.filters().selected_genres.len(), 2);
        assert_eq!(view_len(&state), 3);
    }

    #[test]
    fn test_toggle_and_select_none() {
        let mut state = loaded();
        state.toggle_genre("rock");
        assert_eq!(view_len(&state), 2);
        state.toggle_genre("rock");
        assert_eq!(view_len(&state), 3);
        state.select_no_genres();
        assert_eq!(view_len(&state), 0);
        state.select_all_genres();
        assert_eq!(view_len(&state), 3);
    }

    #[test]
    fn test_popularity_range_is_clamped() {
        let mut state = loaded();
        state.set_popularity_range(95, 40);
        let ctl = state.controller.as_ref().unwrap();
        assert_eq!(ctl.filters().popularity_range, (40, 40));
        assert_eq!(ctl.frame().view_len, 0);
    }

    #[test]
    fn test_stale_click_replaces_previous_detail() {
        let mut state = loaded();
        let click = ClickPayload {
            track_name: "three".into(),
            artist_name: "C".into(),
        };
        state.click(&click);
        assert!(matches!(state.detail, DetailPanel::Found(ref t) if t.genre == "rock"));

        state.toggle_genre("rock");
        state.click(&click);
        assert!(matches!(state.detail, DetailPanel::NotFound { .. }));
    }

    #[test]
    fn test_failed_load_keeps_previous_dataset() {
        let mut state = loaded();
        let dir = tempfile::tempdir().unwrap();
        state.load_from(&dir.path().join("missing.csv"));
        assert!(matches!(state.status_message, Some(Status::Error(_))));
        assert_eq!(view_len(&state), 3);
    }

    #[test]
    fn test_export_status_kind() {
        let mut state = loaded();
        let dir = tempfile::tempdir().unwrap();

        state.export_to(&dir.path().join("view.csv"));
        assert!(matches!(state.status_message, Some(Status::Info(ref m)) if m.contains("3 tracks")));

        state.export_to(&dir.path().join("view.xlsx"));
        assert!(matches!(state.status_message, Some(Status::Error(_))));
    }
}
