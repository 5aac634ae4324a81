use std::collections::BTreeMap;

use eframe::egui::{self, Ui};
use egui_plot::{Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Plot, PlotPoints, Points};

use crate::color::GenreColors;
use crate::data::aggregate::ChartFrame;
use crate::data::selection::ClickPayload;

/// Click tolerance as a fraction of the visible plot span.
const CLICK_RADIUS: f64 = 0.02;

// ---------------------------------------------------------------------------
// Chart grid (central panel)
// ---------------------------------------------------------------------------

/// Render the four charts in a 2×2 grid. Returns the payload of a clicked
/// scatter point, if any.
pub fn chart_grid(ui: &mut Ui, frame: &ChartFrame, colors: &GenreColors) -> Option<ClickPayload> {
    let height = (ui.available_height() / 2.0 - 24.0).max(120.0);
    let mut clicked = None;

    ui.columns(2, |cols| {
        cols[0].strong(format!("{} vs popularity", frame.feature.label()));
        clicked = scatter_plot(&mut cols[0], frame, colors, height);
        cols[1].strong(format!("{} distribution", frame.feature.label()));
        histogram_plot(&mut cols[1], frame, colors, height);
    });
    ui.separator();
    ui.columns(2, |cols| {
        cols[0].strong(format!("{} by genre", frame.feature.label()));
        box_plot(&mut cols[0], frame, colors, height);
        cols[1].strong("Top 10 artists by mean popularity");
        top_artists_plot(&mut cols[1], frame, height);
    });

    clicked
}

fn no_data(ui: &mut Ui, height: f32) {
    ui.allocate_ui(egui::vec2(ui.available_width(), height), |ui: &mut Ui| {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.weak("No data for the current selection");
        });
    });
}

// ---------------------------------------------------------------------------
// Scatter
// ---------------------------------------------------------------------------

fn scatter_plot(
    ui: &mut Ui,
    frame: &ChartFrame,
    colors: &GenreColors,
    height: f32,
) -> Option<ClickPayload> {
    let series = &frame.scatter;
    if series.points.is_empty() {
        no_data(ui, height);
        return None;
    }

    let mut by_genre: BTreeMap<&str, Vec<[f64; 2]>> = BTreeMap::new();
    for p in &series.points {
        by_genre.entry(p.genre.as_str()).or_default().push([p.x, p.y]);
    }

    let response = Plot::new("scatter_plot")
        .height(height)
        .legend(Legend::default())
        .x_axis_label(frame.feature.label())
        .y_axis_label("Popularity")
        .label_formatter(|_name, value| {
            format!("{}: {:.3}\npopularity: {:.0}", frame.feature, value.x, value.y)
        })
        .show(ui, |plot_ui| {
            for (genre, points) in by_genre {
                plot_ui.points(
                    Points::new(PlotPoints::from(points))
                        .name(genre)
                        .color(colors.color_for(genre))
                        .radius(2.5),
                );
            }
            (plot_ui.pointer_coordinate(), plot_ui.plot_bounds())
        });

    if !response.response.clicked() {
        return None;
    }
    let (pointer, bounds) = response.inner;
    let pointer = pointer?;
    series
        .nearest(pointer.x, pointer.y, [bounds.width(), bounds.height()], CLICK_RADIUS)
        .map(ClickPayload::from)
}

// ---------------------------------------------------------------------------
// Histogram (stacked per genre)
// ---------------------------------------------------------------------------

fn histogram_plot(ui: &mut Ui, frame: &ChartFrame, colors: &GenreColors, height: f32) {
    let hist = &frame.histogram;
    if hist.bin_count() == 0 {
        no_data(ui, height);
        return;
    }

    // Identical values collapse the range; draw a visible bar anyway.
    let width = if hist.bin_width > 0.0 { hist.bin_width } else { 0.05 };

    let mut charts: Vec<BarChart> = Vec::new();
    for (genre, counts) in &hist.counts {
        let bars: Vec<Bar> = counts
            .iter()
            .enumerate()
            .map(|(i, &count)| Bar::new(hist.bin_start(i) + width / 2.0, count as f64).width(width))
            .collect();
        let below: Vec<&BarChart> = charts.iter().collect();
        let chart = BarChart::new(bars)
            .name(genre)
            .color(colors.color_for(genre))
            .stack_on(&below);
        charts.push(chart);
    }

    Plot::new("histogram_plot")
        .height(height)
        .legend(Legend::default())
        .x_axis_label(frame.feature.label())
        .y_axis_label("Tracks")
        .include_x(hist.min)
        .include_x(hist.max)
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}

// ---------------------------------------------------------------------------
// Box plot
// ---------------------------------------------------------------------------

fn box_plot(ui: &mut Ui, frame: &ChartFrame, colors: &GenreColors, height: f32) {
    let groups = &frame.boxes.groups;
    if groups.is_empty() {
        no_data(ui, height);
        return;
    }

    Plot::new("box_plot")
        .height(height)
        .legend(Legend::default())
        .y_axis_label(frame.feature.label())
        .show(ui, |plot_ui| {
            for (i, group) in groups.iter().enumerate() {
                let color = colors.color_for(&group.genre);
                let spread = BoxSpread::new(
                    group.lower_whisker,
                    group.q1,
                    group.median,
                    group.q3,
                    group.upper_whisker,
                );
                let elem = BoxElem::new(i as f64, spread)
                    .name(format!("{} (n={})", group.genre, group.count))
                    .box_width(0.6);
                plot_ui.box_plot(BoxPlot::new(vec![elem]).name(&group.genre).color(color));

                if !group.outliers.is_empty() {
                    let outliers: Vec<[f64; 2]> =
                        group.outliers.iter().map(|&v| [i as f64, v]).collect();
                    plot_ui.points(
                        Points::new(PlotPoints::from(outliers))
                            .name(&group.genre)
                            .color(color)
                            .radius(2.0),
                    );
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top artists
// ---------------------------------------------------------------------------

fn top_artists_plot(ui: &mut Ui, frame: &ChartFrame, height: f32) {
    let entries = &frame.top_artists.entries;
    if entries.is_empty() {
        no_data(ui, height);
        return;
    }

    // Highest mean on top.
    let n = entries.len();
    let bars: Vec<Bar> = entries
        .iter()
        .enumerate()
        .map(|(rank, e)| {
            Bar::new((n - rank) as f64, e.mean_popularity)
                .name(format!("{} ({} tracks)", e.artist_name, e.track_count))
                .width(0.7)
        })
        .collect();

    Plot::new("top_artists_plot")
        .height(height)
        .x_axis_label("Mean popularity")
        .show_axes([true, false])
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal().name("Mean popularity"));
        });
}
