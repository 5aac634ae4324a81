use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use clap::Parser;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

/// Write a synthetic music track table for trying out the dashboard.
#[derive(Parser, Debug)]
#[command(name = "generate_sample")]
struct Args {
    /// Output file (.csv or .parquet)
    #[arg(default_value = "data.csv")]
    output: PathBuf,

    /// Number of tracks per genre
    #[arg(short, long, default_value_t = 120)]
    per_genre: usize,

    /// PRNG seed
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
}

/// Field names and order must stay in step with the dashboard loader's
/// required columns (`data::loader::required_columns`).
#[derive(Debug, Serialize)]
struct SampleTrack {
    track_name: String,
    artist_name: String,
    genre: String,
    popularity: i64,
    danceability: f64,
    energy: f64,
    valence: f64,
    loudness: f64,
    tempo: f64,
    acousticness: f64,
    speechiness: f64,
    instrumentalness: f64,
    liveness: f64,
}

/// Per-genre means: (popularity, danceability, energy, valence, loudness,
/// tempo, acousticness, speechiness, instrumentalness).
const GENRES: [(&str, [f64; 9]); 8] = [
    ("classical", [35.0, 0.30, 0.20, 0.25, -20.0, 95.0, 0.90, 0.04, 0.80]),
    ("country", [50.0, 0.58, 0.62, 0.55, -7.0, 118.0, 0.30, 0.04, 0.02]),
    ("electronic", [52.0, 0.68, 0.80, 0.40, -6.0, 126.0, 0.08, 0.07, 0.55]),
    ("hip-hop", [62.0, 0.78, 0.65, 0.50, -6.5, 96.0, 0.15, 0.25, 0.01]),
    ("jazz", [38.0, 0.52, 0.40, 0.50, -11.0, 110.0, 0.65, 0.05, 0.45]),
    ("metal", [45.0, 0.40, 0.92, 0.30, -4.5, 132.0, 0.02, 0.08, 0.15]),
    ("pop", [65.0, 0.66, 0.68, 0.58, -5.5, 120.0, 0.18, 0.06, 0.01]),
    ("rock", [55.0, 0.50, 0.78, 0.48, -6.0, 124.0, 0.10, 0.05, 0.05]),
];

const ADJECTIVES: [&str; 10] = [
    "Silver", "Midnight", "Electric", "Velvet", "Paper", "Golden", "Hollow", "Neon", "Quiet",
    "Wild",
];
const NOUNS: [&str; 10] = [
    "Rivers", "Engines", "Foxes", "Lanterns", "Harbor", "Static", "Orchard", "Comets", "Tides",
    "Owls",
];
const WORDS: [&str; 12] = [
    "Love", "Night", "Fire", "Summer", "Dream", "Road", "Heart", "Rain", "Light", "Home", "Gold",
    "Echo",
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn unit(&mut self, mean: f64, std_dev: f64) -> f64 {
        self.gauss(mean, std_dev).clamp(0.0, 1.0)
    }
}

fn generate(per_genre: usize, rng: &mut SimpleRng) -> Vec<SampleTrack> {
    let mut tracks = Vec::with_capacity(per_genre * GENRES.len());

    for (genre, m) in GENRES {
        // A small roster per genre so artists repeat and averages mean something.
        let roster: Vec<String> = (0..12)
            .map(|_| format!("The {} {}", rng.pick(&ADJECTIVES), rng.pick(&NOUNS)))
            .collect();
        let star_bonus: Vec<f64> = roster.iter().map(|_| rng.gauss(0.0, 12.0)).collect();

        for _ in 0..per_genre {
            let artist = (rng.next_u64() % roster.len() as u64) as usize;
            let popularity = rng.gauss(m[0] + star_bonus[artist], 15.0).round().clamp(0.0, 100.0);
            tracks.push(SampleTrack {
                track_name: format!("{} {}", rng.pick(&WORDS), rng.pick(&WORDS)),
                artist_name: roster[artist].clone(),
                genre: genre.to_string(),
                popularity: popularity as i64,
                danceability: rng.unit(m[1], 0.12),
                energy: rng.unit(m[2], 0.12),
                valence: rng.unit(m[3], 0.18),
                loudness: rng.gauss(m[4], 2.5).min(0.0),
                tempo: rng.gauss(m[5], 14.0).max(40.0),
                acousticness: rng.unit(m[6], 0.15),
                speechiness: rng.unit(m[7], 0.03),
                instrumentalness: rng.unit(m[8], 0.15),
                liveness: rng.unit(0.18, 0.1),
            });
        }
    }
    tracks
}

fn write_csv(tracks: &[SampleTrack], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV file")?;
    for t in tracks {
        writer.serialize(t).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV file")?;
    Ok(())
}

fn write_parquet(tracks: &[SampleTrack], path: &Path) -> Result<()> {
    let text = |f: fn(&SampleTrack) -> &str| -> ArrayRef {
        Arc::new(StringArray::from_iter_values(tracks.iter().map(f)))
    };
    let float = |f: fn(&SampleTrack) -> f64| -> ArrayRef {
        Arc::new(Float64Array::from_iter_values(tracks.iter().map(f)))
    };

    let mut fields = vec![
        Field::new("track_name", DataType::Utf8, false),
        Field::new("artist_name", DataType::Utf8, false),
        Field::new("genre", DataType::Utf8, false),
        Field::new("popularity", DataType::Int64, false),
    ];
    let float_columns: [(&str, fn(&SampleTrack) -> f64); 9] = [
        ("danceability", |t| t.danceability),
        ("energy", |t| t.energy),
        ("valence", |t| t.valence),
        ("loudness", |t| t.loudness),
        ("tempo", |t| t.tempo),
        ("acousticness", |t| t.acousticness),
        ("speechiness", |t| t.speechiness),
        ("instrumentalness", |t| t.instrumentalness),
        ("liveness", |t| t.liveness),
    ];

    let mut columns: Vec<ArrayRef> = vec![
        text(|t| t.track_name.as_str()),
        text(|t| t.artist_name.as_str()),
        text(|t| t.genre.as_str()),
        Arc::new(Int64Array::from_iter_values(tracks.iter().map(|t| t.popularity))),
    ];
    for (name, get) in float_columns {
        fields.push(Field::new(name, DataType::Float64, false));
        columns.push(float(get));
    }

    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;

    let preview = batch.slice(0, batch.num_rows().min(5));
    println!("{}", pretty_format_batches(&[preview]).context("formatting preview")?);
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut rng = SimpleRng::new(args.seed);
    let tracks = generate(args.per_genre, &mut rng);

    let ext = args
        .output
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "csv" => write_csv(&tracks, &args.output)?,
        "parquet" | "pq" => write_parquet(&tracks, &args.output)?,
        other => bail!("Unsupported output extension: .{other}"),
    }

    println!(
        "Wrote {} tracks in {} genres to {}",
        tracks.len(),
        GENRES.len(),
        args.output.display()
    );
    Ok(())
}
