mod app;
mod color;
mod controller;
mod data;
mod state;
mod ui;

use std::path::PathBuf;

use app::RustyTracksApp;
use clap::Parser;
use eframe::egui;
use state::AppState;

/// Interactive dashboard over a table of music tracks and their audio features.
#[derive(Parser, Debug)]
#[command(name = "rusty-tracks", version, about)]
struct Args {
    /// Track table to load at startup (.csv, .json or .parquet)
    #[arg(short, long, env = "RUSTY_TRACKS_DATA", default_value = "data.csv")]
    data: PathBuf,
}

fn main() -> eframe::Result {
    env_logger::init();
    let args = Args::parse();

    // A failed startup load leaves the window open with the error shown.
    let mut state = AppState::default();
    state.load_from(&args.data);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Rusty Tracks – Music Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(RustyTracksApp::new(state)))),
    )
}
