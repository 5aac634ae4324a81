use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, Int64Type};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::error::LoadError;
use super::model::{Dataset, Feature, Track};

/// Identifier and popularity columns every source must provide, followed by
/// the nine feature columns.
pub const ID_COLUMNS: [&str; 4] = ["track_name", "artist_name", "genre", "popularity"];

pub(crate) fn required_columns() -> impl Iterator<Item = &'static str> {
    ID_COLUMNS
        .into_iter()
        .chain(Feature::ALL.into_iter().map(Feature::column_name))
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a track dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with the required column names (recommended)
/// * `.json`    – `[{ "track_name": ..., "popularity": ..., ... }, ...]`
/// * `.parquet` – one column per field, string ids and numeric features
///
/// Columns beyond the required ones are ignored.
pub fn load_file(path: &Path) -> Result<Dataset, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let tracks = match ext.as_str() {
        "csv" => load_csv(path)?,
        "json" => load_json(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => return Err(LoadError::UnsupportedExtension(other.to_string())),
    };

    Ok(Dataset::from_tracks(tracks))
}

fn io_error(path: &Path, source: std::io::Error) -> LoadError {
    LoadError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Enforce the per-row invariants the rest of the app relies on.
fn validate(row: usize, track: &Track) -> Result<(), LoadError> {
    if track.genre.trim().is_empty() {
        return Err(LoadError::invalid(row, "genre", "empty genre"));
    }
    if track.popularity > 100 {
        return Err(LoadError::invalid(
            row,
            "popularity",
            format!("{} is outside 0..=100", track.popularity),
        ));
    }
    for feature in Feature::ALL {
        let value = track.feature(feature);
        if !value.is_finite() {
            return Err(LoadError::invalid(
                row,
                feature.column_name(),
                format!("{value} is not a finite number"),
            ));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<Vec<Track>, LoadError> {
    let file = std::fs::File::open(path).map_err(|e| io_error(path, e))?;
    let mut reader = csv::Reader::from_reader(file);

    let headers = reader.headers()?.clone();
    if let Some(missing) = required_columns().find(|col| !headers.iter().any(|h| h == *col)) {
        return Err(LoadError::MissingColumn(missing.to_string()));
    }

    let mut tracks = Vec::new();
    for (row_no, result) in reader.deserialize::<Track>().enumerate() {
        let track = result?;
        validate(row_no, &track)?;
        tracks.push(track);
    }
    Ok(tracks)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "track_name": "Song", "artist_name": "Band", "genre": "pop",
///     "popularity": 61, "danceability": 0.72, ... },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Vec<Track>, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|e| io_error(path, e))?;
    let root: JsonValue = serde_json::from_str(&text)?;

    let records = root.as_array().ok_or_else(|| {
        LoadError::invalid(0, "<root>", "expected a top-level JSON array of records")
    })?;

    let mut tracks = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| LoadError::invalid(i, "<record>", "not a JSON object"))?;
        if let Some(missing) = required_columns().find(|col| !obj.contains_key(*col)) {
            return Err(LoadError::MissingColumn(missing.to_string()));
        }

        let track: Track = serde_json::from_value(rec.clone())?;
        validate(i, &track)?;
        tracks.push(track);
    }
    Ok(tracks)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file of tracks.
///
/// Id columns may be any string type, popularity any integer type and the
/// features any numeric type; everything is cast to Utf8 / Int64 / Float64.
/// Works with files written by both **Pandas** and **Polars**.
fn load_parquet(path: &Path) -> Result<Vec<Track>, LoadError> {
    let file = std::fs::File::open(path).map_err(|e| io_error(path, e))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;

    // Checked up front: a file with no row groups yields no batches.
    let schema = builder.schema();
    if let Some(missing) = required_columns().find(|col| schema.index_of(col).is_err()) {
        return Err(LoadError::MissingColumn(missing.to_string()));
    }
    let reader = builder.build()?;

    let mut tracks = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        let offset = tracks.len();
        read_batch(&batch, offset, &mut tracks)?;
    }
    Ok(tracks)
}

fn column(batch: &RecordBatch, name: &str, data_type: &DataType) -> Result<ArrayRef, LoadError> {
    let idx = batch
        .schema()
        .index_of(name)
        .map_err(|_| LoadError::MissingColumn(name.to_string()))?;
    Ok(cast(batch.column(idx), data_type)?)
}

fn read_batch(batch: &RecordBatch, offset: usize, out: &mut Vec<Track>) -> Result<(), LoadError> {
    let [track_col, artist_col, genre_col] = ["track_name", "artist_name", "genre"]
        .map(|name| column(batch, name, &DataType::Utf8));
    let (track_col, artist_col, genre_col) = (track_col?, artist_col?, genre_col?);
    let popularity_col = column(batch, "popularity", &DataType::Int64)?;

    let mut feature_cols = Vec::with_capacity(Feature::ALL.len());
    for feature in Feature::ALL {
        feature_cols.push(column(batch, feature.column_name(), &DataType::Float64)?);
    }

    let track_names = track_col.as_string::<i32>();
    let artists = artist_col.as_string::<i32>();
    let genres = genre_col.as_string::<i32>();
    let popularities = popularity_col.as_primitive::<Int64Type>();
    let features: Vec<_> = feature_cols
        .iter()
        .map(|c| c.as_primitive::<Float64Type>())
        .collect();

    for i in 0..batch.num_rows() {
        let row = offset + i;
        let text = |arr: &arrow::array::StringArray, name: &str| {
            if arr.is_null(i) {
                Err(LoadError::invalid(row, name, "null value"))
            } else {
                Ok(arr.value(i).to_string())
            }
        };

        if popularities.is_null(i) {
            return Err(LoadError::invalid(row, "popularity", "null value"));
        }
        let raw_popularity = popularities.value(i);
        let popularity = u8::try_from(raw_popularity)
            .ok()
            .filter(|p| *p <= 100)
            .ok_or_else(|| {
                LoadError::invalid(row, "popularity", format!("{raw_popularity} is outside 0..=100"))
            })?;

        let mut values = [0.0; 9];
        for (slot, (feature, arr)) in values.iter_mut().zip(Feature::ALL.iter().zip(&features)) {
            if arr.is_null(i) {
                return Err(LoadError::invalid(row, feature.column_name(), "null value"));
            }
            *slot = arr.value(i);
        }
        let [danceability, energy, valence, loudness, tempo, acousticness, speechiness, instrumentalness, liveness] =
            values;

        let track = Track {
            track_name: text(track_names, "track_name")?,
            artist_name: text(artists, "artist_name")?,
            genre: text(genres, "genre")?,
            popularity,
            danceability,
            energy,
            valence,
            loudness,
            tempo,
            acousticness,
            speechiness,
            instrumentalness,
            liveness,
        };
        validate(row, &track)?;
        out.push(track);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str = "track_name,artist_name,genre,popularity,danceability,energy,valence,\
loudness,tempo,acousticness,speechiness,instrumentalness,liveness";

    fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_csv() {
        let dir = tempfile::tempdir().unwrap();
        let csv = format!(
            "{HEADER},extra\n\
             Song A,Band,rock,55,0.5,0.6,0.7,-5.2,120.5,0.1,0.05,0.0,0.2,x\n\
             Song B,Singer,pop,80,0.8,0.7,0.9,-4.0,98.0,0.3,0.04,0.01,0.1,y\n"
        );
        let path = write_file(&dir, "tracks.csv", &csv);
        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.distinct_genres(), ["pop", "rock"]);
        let a = ds.find_track("Song A", "Band").unwrap();
        assert_eq!(a.popularity, 55);
        assert_eq!(a.tempo, 120.5);
    }

    #[test]
    fn test_missing_column_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let header = HEADER.replace(",liveness", "");
        let csv = format!("{header}\nSong,Band,rock,55,0.5,0.6,0.7,-5.2,120.5,0.1,0.05,0.0\n");
        let path = write_file(&dir, "tracks.csv", &csv);
        match load_file(&path) {
            Err(LoadError::MissingColumn(col)) => assert_eq!(col, "liveness"),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn test_popularity_out_of_range_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let csv = format!("{HEADER}\nSong,Band,rock,150,0.5,0.6,0.7,-5.2,120.5,0.1,0.05,0.0,0.2\n");
        let path = write_file(&dir, "tracks.csv", &csv);
        assert!(matches!(
            load_file(&path),
            Err(LoadError::InvalidValue { row: 0, ref column, .. }) if column == "popularity"
        ));
    }

    #[test]
    fn test_empty_genre_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let csv = format!("{HEADER}\nSong,Band,,50,0.5,0.6,0.7,-5.2,120.5,0.1,0.05,0.0,0.2\n");
        let path = write_file(&dir, "tracks.csv", &csv);
        assert!(matches!(load_file(&path), Err(LoadError::InvalidValue { .. })));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.csv");
        assert!(matches!(load_file(&path), Err(LoadError::Io { .. })));
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "tracks.xlsx", "");
        assert!(matches!(
            load_file(&path),
            Err(LoadError::UnsupportedExtension(ext)) if ext == "xlsx"
        ));
    }

    #[test]
    fn test_load_json_records() {
        let dir = tempfile::tempdir().unwrap();
        let json = r#"[
            {"track_name": "Song", "artist_name": "Band", "genre": "jazz", "popularity": 42,
             "danceability": 0.4, "energy": 0.3, "valence": 0.2, "loudness": -12.0,
             "tempo": 88.0, "acousticness": 0.9, "speechiness": 0.03,
             "instrumentalness": 0.5, "liveness": 0.15, "year": 1999}
        ]"#;
        let path = write_file(&dir, "tracks.json", json);
        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.tracks()[0].genre, "jazz");
    }

    fn write_parquet(dir: &tempfile::TempDir, name: &str, batch: &RecordBatch) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = parquet::arrow::ArrowWriter::try_new(file, batch.schema(), None).unwrap();
        writer.write(batch).unwrap();
        writer.close().unwrap();
        path
    }

    #[test]
    fn test_empty_parquet_missing_column_is_load_error() {
        use arrow::datatypes::{Field, Schema};
        use std::sync::Arc;

        let dir = tempfile::tempdir().unwrap();
        let schema = Arc::new(Schema::new(vec![Field::new("track_name", DataType::Utf8, false)]));
        let batch = RecordBatch::new_empty(schema);
        let path = write_parquet(&dir, "empty.parquet", &batch);
        match load_file(&path) {
            Err(LoadError::MissingColumn(col)) => assert_eq!(col, "artist_name"),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn test_parquet_popularity_out_of_range_is_load_error() {
        use arrow::array::{Float64Array, Int64Array, StringArray};
        use arrow::datatypes::{Field, Schema};
        use std::sync::Arc;

        let dir = tempfile::tempdir().unwrap();
        let mut fields = vec![
            Field::new("track_name", DataType::Utf8, false),
            Field::new("artist_name", DataType::Utf8, false),
            Field::new("genre", DataType::Utf8, false),
            Field::new("popularity", DataType::Int64, false),
        ];
        let mut columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(vec!["Song", "Other"])),
            Arc::new(StringArray::from(vec!["Band", "Band"])),
            Arc::new(StringArray::from(vec!["rock", "rock"])),
            Arc::new(Int64Array::from(vec![55, 150])),
        ];
        for feature in Feature::ALL {
            fields.push(Field::new(feature.column_name(), DataType::Float64, false));
            columns.push(Arc::new(Float64Array::from(vec![0.5, 0.5])));
        }
        let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), columns).unwrap();
        let path = write_parquet(&dir, "tracks.parquet", &batch);
        assert!(matches!(
            load_file(&path),
            Err(LoadError::InvalidValue { row: 1, ref column, .. }) if column == "popularity"
        ));
    }

    #[test]
    fn test_load_json_missing_field() {
        let dir = tempfile::tempdir().unwrap();
        let json = r#"[{"track_name": "Song", "artist_name": "Band", "popularity": 42}]"#;
        let path = write_file(&dir, "tracks.json", json);
        assert!(matches!(load_file(&path), Err(LoadError::MissingColumn(c)) if c == "genre"));
    }
}
