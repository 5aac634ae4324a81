use std::path::Path;
use std::sync::Arc;

use crate::data::aggregate::{aggregate, ChartFrame};
use crate::data::error::ExportError;
use crate::data::export::export_view;
use crate::data::filter::{apply, FilterState, FilteredView};
use crate::data::model::Dataset;
use crate::data::selection::{resolve, ClickPayload, DetailPanel};

// ---------------------------------------------------------------------------
// Reactive controller: filter changes → chart frames
// ---------------------------------------------------------------------------

/// Lifecycle of the chart frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No filter state has been submitted yet.
    Idle,
    /// A submitted state has not produced a frame yet.
    Computing,
    /// The frame matches the latest submitted state.
    Rendered,
}

/// Handle for one computation, tied to the filter snapshot it was issued for.
#[derive(Debug, Clone)]
pub struct Ticket {
    generation: u64,
    filters: Arc<FilterState>,
}

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Outcome of handing a finished frame back to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Rendered,
    /// A newer state was submitted meanwhile; the frame was dropped.
    Superseded,
}

/// Owns the filter state and the last rendered frame.
///
/// Every change replaces the [`FilterState`] snapshot and bumps a
/// generation counter. Frames computed for an older generation are discarded
/// on arrival, so the latest state always wins.
pub struct Controller {
    dataset: Arc<Dataset>,
    filters: Arc<FilterState>,
    generation: u64,
    phase: Phase,
    frame: ChartFrame,
}

impl Controller {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        let filters = Arc::new(dataset.default_filter_state());
        Self {
            dataset,
            filters,
            generation: 0,
            phase: Phase::Idle,
            frame: ChartFrame::default(),
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Last accepted frame. Empty until the first cycle completes.
    pub fn frame(&self) -> &ChartFrame {
        &self.frame
    }

    /// Tracks visible under the current filter state.
    pub fn view(&self) -> FilteredView<'_> {
        apply(&self.dataset, &self.filters)
    }

    /// Replace the filter state and start a new cycle.
    pub fn submit(&mut self, filters: FilterState) -> Ticket {
        self.generation += 1;
        self.filters = Arc::new(filters);
        self.phase = Phase::Computing;
        log::debug!(
            "Cycle {} submitted: {} genres, popularity {:?}, feature {}",
            self.generation,
            self.filters.selected_genres.len(),
            self.filters.popularity_range,
            self.filters.selected_feature
        );
        Ticket {
            generation: self.generation,
            filters: Arc::clone(&self.filters),
        }
    }

    /// Run the filter and aggregation passes for a ticket's snapshot.
    pub fn compute(&self, ticket: &Ticket) -> ChartFrame {
        let view = apply(&self.dataset, &ticket.filters);
        let frame = aggregate(&view, ticket.filters.selected_feature);
        if let Some(warning) = frame.warning {
            log::warn!("Cycle {}: {warning}", ticket.generation);
        }
        frame
    }

    /// Accept `frame` if `ticket` is still the latest submission.
    pub fn complete(&mut self, ticket: Ticket, frame: ChartFrame) -> Completion {
        if ticket.generation != self.generation {
            log::warn!(
                "Discarding cycle {}: superseded by cycle {}",
                ticket.generation,
                self.generation
            );
            return Completion::Superseded;
        }
        log::debug!(
            "Cycle {} rendered: {} tracks in view",
            ticket.generation,
            frame.view_len
        );
        self.frame = frame;
        self.phase = Phase::Rendered;
        Completion::Rendered
    }

    /// Submit, compute and complete in one go.
    pub fn refresh(&mut self, filters: FilterState) -> &ChartFrame {
        let ticket = self.submit(filters);
        let frame = self.compute(&ticket);
        self.complete(ticket, frame);
        &self.frame
    }

    /// Look up a clicked point under the current filters.
    pub fn resolve_click(&self, payload: &ClickPayload) -> DetailPanel {
        let resolved = resolve(&self.dataset, payload, &self.filters);
        if resolved.is_none() {
            let reason = match self.dataset.find_track(&payload.track_name, &payload.artist_name) {
                Some(_) => "excluded by the current filters",
                None => "not in the dataset",
            };
            log::warn!(
                "Clicked track '{}' by {} is {reason}",
                payload.track_name,
                payload.artist_name
            );
        }
        DetailPanel::from_resolution(payload, resolved)
    }

    /// Write the current view to `path`.
    pub fn export(&self, path: &Path) -> Result<usize, ExportError> {
        export_view(&self.view(), path)
    }
}
