use std::collections::{BTreeMap, HashMap};
use std::fmt;

use super::filter::FilteredView;
use super::model::Feature;

/// Number of equal-width histogram bins.
pub const HISTOGRAM_BINS: usize = 30;
/// Maximum number of bars in the top-artists chart.
pub const TOP_ARTIST_LIMIT: usize = 10;
/// Tukey fence multiplier for box-plot outliers.
pub const TUKEY_FENCE: f64 = 1.5;

// ---------------------------------------------------------------------------
// Scatter: feature vs popularity, one point per track
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    pub track_name: String,
    pub artist_name: String,
    pub genre: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScatterSeries {
    pub points: Vec<ScatterPoint>,
}

impl ScatterSeries {
    /// Point closest to `(x, y)` when both axes are scaled by their visible
    /// span, provided it lies within `radius` in that normalized space.
    pub fn nearest(&self, x: f64, y: f64, span: [f64; 2], radius: f64) -> Option<&ScatterPoint> {
        let sx = if span[0] > 0.0 { span[0] } else { 1.0 };
        let sy = if span[1] > 0.0 { span[1] } else { 1.0 };
        self.points
            .iter()
            .map(|p| {
                let dx = (p.x - x) / sx;
                let dy = (p.y - y) / sy;
                (p, dx * dx + dy * dy)
            })
            .filter(|(_, d2)| *d2 <= radius * radius)
            // min_by keeps the first of equal candidates
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(p, _)| p)
    }
}

pub fn scatter(view: &FilteredView<'_>, feature: Feature) -> ScatterSeries {
    ScatterSeries {
        points: view
            .iter()
            .map(|t| ScatterPoint {
                x: t.feature(feature),
                y: f64::from(t.popularity),
                track_name: t.track_name.clone(),
                artist_name: t.artist_name.clone(),
                genre: t.genre.clone(),
            })
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Histogram: equal-width bins over the observed range, counted per genre
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default)]
pub struct HistogramBins {
    pub min: f64,
    pub max: f64,
    /// Zero when the view is empty or every value is identical.
    pub bin_width: f64,
    /// Genre → count per bin. Every vector has `bin_count()` entries.
    pub counts: BTreeMap<String, Vec<usize>>,
    /// Set when the view had no rows; no bins are emitted then.
    pub empty: bool,
}

impl HistogramBins {
    pub fn bin_count(&self) -> usize {
        if self.empty {
            0
        } else {
            HISTOGRAM_BINS
        }
    }

    /// Lower edge of bin `i`.
    pub fn bin_start(&self, i: usize) -> f64 {
        self.min + self.bin_width * i as f64
    }

    /// Sum of all counts across genres and bins.
    pub fn total(&self) -> usize {
        self.counts.values().flatten().sum()
    }
}

/// Bin `feature` into [`HISTOGRAM_BINS`] bins spanning the view's min..=max.
///
/// The last bin is closed on both ends so the maximum is counted. When all
/// values coincide the width is zero and every row lands in the first bin.
pub fn histogram(view: &FilteredView<'_>, feature: Feature) -> HistogramBins {
    if view.is_empty() {
        return HistogramBins {
            empty: true,
            ..HistogramBins::default()
        };
    }

    let (min, max) = view
        .iter()
        .map(|t| t.feature(feature))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    let bin_width = (max - min) / HISTOGRAM_BINS as f64;

    let mut counts: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for track in view {
        let value = track.feature(feature);
        let idx = if bin_width > 0.0 {
            (((value - min) / bin_width).floor() as usize).min(HISTOGRAM_BINS - 1)
        } else {
            0
        };
        counts
            .entry(track.genre.clone())
            .or_insert_with(|| vec![0; HISTOGRAM_BINS])[idx] += 1;
    }

    HistogramBins {
        min,
        max,
        bin_width,
        counts,
        empty: false,
    }
}

// ---------------------------------------------------------------------------
// Box summary: per-genre quartiles and Tukey outliers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct GenreBox {
    pub genre: String,
    pub count: usize,
    /// Smallest value inside the lower fence.
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    /// Largest value inside the upper fence.
    pub upper_whisker: f64,
    /// Values beyond the fences, ascending.
    pub outliers: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoxSummary {
    /// One entry per genre present in the view, in sorted genre order.
    pub groups: Vec<GenreBox>,
}

/// Quantile of sorted, non-empty `values` by linear interpolation between
/// closest ranks (position `(n - 1) * p`).
fn quantile(sorted: &[f64], p: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    let pos = (sorted.len() - 1) as f64 * p;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

fn genre_box(genre: String, mut values: Vec<f64>) -> GenreBox {
    values.sort_by(f64::total_cmp);

    let q1 = quantile(&values, 0.25);
    let median = quantile(&values, 0.5);
    let q3 = quantile(&values, 0.75);
    let iqr = q3 - q1;
    let lower_fence = q1 - TUKEY_FENCE * iqr;
    let upper_fence = q3 + TUKEY_FENCE * iqr;

    let (inside, outliers): (Vec<f64>, Vec<f64>) = values
        .iter()
        .partition(|&&v| v >= lower_fence && v <= upper_fence);

    // The fences always hold the values around the median.
    let lower_whisker = inside.first().copied().unwrap_or(q1);
    let upper_whisker = inside.last().copied().unwrap_or(q3);

    GenreBox {
        genre,
        count: values.len(),
        lower_whisker,
        q1,
        median,
        q3,
        upper_whisker,
        outliers,
    }
}

pub fn box_summary(view: &FilteredView<'_>, feature: Feature) -> BoxSummary {
    let mut by_genre: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for track in view {
        by_genre
            .entry(track.genre.as_str())
            .or_default()
            .push(track.feature(feature));
    }
    BoxSummary {
        groups: by_genre
            .into_iter()
            .map(|(genre, values)| genre_box(genre.to_string(), values))
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Top artists: mean popularity, descending
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ArtistPopularity {
    pub artist_name: String,
    pub mean_popularity: f64,
    pub track_count: usize,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TopArtists {
    pub entries: Vec<ArtistPopularity>,
}

/// The [`TOP_ARTIST_LIMIT`] artists with the highest mean popularity.
///
/// Ties keep the order in which artists first appear in the view.
pub fn top_artists(view: &FilteredView<'_>) -> TopArtists {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<(&str, u64, usize)> = Vec::new();

    for track in view {
        let slot = *index.entry(track.artist_name.as_str()).or_insert_with(|| {
            totals.push((track.artist_name.as_str(), 0, 0));
            totals.len() - 1
        });
        totals[slot].1 += u64::from(track.popularity);
        totals[slot].2 += 1;
    }

    let mut entries: Vec<ArtistPopularity> = totals
        .into_iter()
        .map(|(artist, sum, count)| ArtistPopularity {
            artist_name: artist.to_string(),
            mean_popularity: sum as f64 / count as f64,
            track_count: count,
        })
        .collect();

    // sort_by is stable: equal means stay in first-appearance order
    entries.sort_by(|a, b| b.mean_popularity.total_cmp(&a.mean_popularity));
    entries.truncate(TOP_ARTIST_LIMIT);

    TopArtists { entries }
}

// ---------------------------------------------------------------------------
// Chart frame: everything one render cycle needs
// ---------------------------------------------------------------------------

/// Non-fatal conditions shown alongside the charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Warning {
    /// No track passes the current filters.
    EmptySelection,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::EmptySelection => write!(f, "No tracks match the current filters"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChartFrame {
    pub feature: Feature,
    /// Number of tracks in the view the frame was computed from.
    pub view_len: usize,
    pub scatter: ScatterSeries,
    pub histogram: HistogramBins,
    pub boxes: BoxSummary,
    pub top_artists: TopArtists,
    pub warning: Option<Warning>,
}

/// Run all four chart derivations over one view.
pub fn aggregate(view: &FilteredView<'_>, feature: Feature) -> ChartFrame {
    ChartFrame {
        feature,
        view_len: view.len(),
        scatter: scatter(view, feature),
        histogram: histogram(view, feature),
        boxes: box_summary(view, feature),
        top_artists: top_artists(view),
        warning: view.is_empty().then_some(Warning::EmptySelection),
    }
}
