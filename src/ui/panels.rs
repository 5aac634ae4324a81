use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::controller::Phase;
use crate::data::model::{Feature, Track};
use crate::data::selection::DetailPanel;
use crate::state::{AppState, Status};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let Some(controller) = &state.controller else {
        ui.label("No dataset loaded.");
        return;
    };

    // Copy what we need so we can mutate state from the widgets.
    let genres = controller.dataset().distinct_genres().to_vec();
    let filters = controller.filters().clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Feature selector ----
            ui.strong("Feature");
            let mut feature = filters.selected_feature;
            egui::ComboBox::from_id_salt("feature")
                .selected_text(feature.label())
                .show_ui(ui, |ui: &mut Ui| {
                    for f in Feature::ALL {
                        ui.selectable_value(&mut feature, f, f.label());
                    }
                });
            if feature != filters.selected_feature {
                state.set_feature(feature);
            }
            ui.separator();

            // ---- Popularity range ----
            ui.strong("Popularity");
            let (mut low, mut high) = filters.popularity_range;
            ui.add(egui::Slider::new(&mut low, 0..=100).step_by(1.0).text("min"));
            ui.add(egui::Slider::new(&mut high, 0..=100).step_by(1.0).text("max"));
            // Dragging one handle past the other pushes it along.
            if low != filters.popularity_range.0 {
                high = high.max(low);
            } else if high != filters.popularity_range.1 {
                low = low.min(high);
            }
            if (low, high) != filters.popularity_range {
                state.set_popularity_range(low, high);
            }
            ui.separator();

            // ---- Genre multi-select ----
            let header_text = format!("Genres  ({}/{})", filters.selected_genres.len(), genres.len());
            egui::CollapsingHeader::new(RichText::new(header_text).strong())
                .id_salt("genres")
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    ui.horizontal(|ui: &mut Ui| {
                        if ui.small_button("All").clicked() {
                            state.select_all_genres();
                        }
                        if ui.small_button("None").clicked() {
                            state.select_no_genres();
                        }
                    });

                    for genre in &genres {
                        let mut checked = filters.selected_genres.contains(genre);
                        let text = RichText::new(genre).color(state.colors.color_for(genre));
                        if ui.checkbox(&mut checked, text).changed() {
                            state.toggle_genre(genre);
                        }
                    }
                });
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let can_export = state.controller.is_some();
            if ui.add_enabled(can_export, egui::Button::new("Export view…")).clicked() {
                export_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ctl) = &state.controller {
            if let Some(name) = state.source_path.as_ref().and_then(|p| p.file_name()) {
                ui.label(RichText::new(name.to_string_lossy()).strong());
            }
            if ctl.phase() == Phase::Computing {
                ui.spinner();
            }
            ui.label(format!(
                "{} tracks loaded, {} visible",
                ctl.dataset().len(),
                ctl.frame().view_len
            ));
            if let Some(warning) = ctl.frame().warning {
                ui.label(RichText::new(warning.to_string()).color(Color32::YELLOW));
            }
        }

        ui.separator();

        if let Some(status) = &state.status_message {
            let color = match status {
                Status::Error(_) => Color32::RED,
                Status::Info(_) => Color32::LIGHT_GREEN,
            };
            ui.label(RichText::new(status.text()).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// Detail panel
// ---------------------------------------------------------------------------

fn detail_rows(track: &Track) -> Vec<(&'static str, String)> {
    let mut rows = vec![
        ("Track", track.track_name.clone()),
        ("Artist", track.artist_name.clone()),
        ("Genre", track.genre.clone()),
        ("Popularity", track.popularity.to_string()),
    ];
    rows.extend(
        Feature::ALL
            .into_iter()
            .map(|f| (f.label(), format!("{:.3}", track.feature(f)))),
    );
    rows
}

/// Render the clicked track, or the reason there is none.
pub fn detail_panel(ui: &mut Ui, detail: &DetailPanel) {
    ui.strong("Track details");

    let track = match detail {
        DetailPanel::Found(track) => track,
        DetailPanel::NotFound { .. } => {
            if let Some(msg) = detail.message() {
                ui.label(RichText::new(msg).color(Color32::LIGHT_RED));
            }
            return;
        }
        DetailPanel::Empty => {
            if let Some(msg) = detail.message() {
                ui.label(msg);
            }
            return;
        }
    };

    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto().at_least(120.0))
        .column(Column::remainder())
        .body(|mut body| {
            for (field, value) in detail_rows(track) {
                body.row(18.0, |mut row| {
                    row.col(|ui| {
                        ui.label(RichText::new(field).strong());
                    });
                    row.col(|ui| {
                        ui.label(value);
                    });
                });
            }
        });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open track data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_from(&path);
    }
}

pub fn export_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export filtered tracks")
        .set_file_name("filtered_tracks.csv")
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet"])
        .save_file();

    if let Some(path) = file {
        state.export_to(&path);
    }
}
