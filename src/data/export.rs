use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use super::error::ExportError;
use super::filter::FilteredView;
use super::loader::required_columns;
use super::model::Feature;

/// Write exactly the rows of `view`, in order, to `path`.
///
/// The format follows the extension: `.csv` or `.parquet` / `.pq`. Columns
/// are the same as the input table. Returns the number of rows written.
pub fn export_view(view: &FilteredView<'_>, path: &Path) -> Result<usize, ExportError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => write_csv(view, path)?,
        "parquet" | "pq" => write_parquet(view, path)?,
        other => return Err(ExportError::UnsupportedFormat(other.to_string())),
    }

    log::info!("Exported {} tracks to {}", view.len(), path.display());
    Ok(view.len())
}

fn write_csv(view: &FilteredView<'_>, path: &Path) -> Result<(), ExportError> {
    // Header is written explicitly so an empty view still yields a loadable file.
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    writer.write_record(required_columns())?;
    for track in view {
        writer.serialize(track)?;
    }
    writer.flush().map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

fn write_parquet(view: &FilteredView<'_>, path: &Path) -> Result<(), ExportError> {
    let mut fields = vec![
        Field::new("track_name", DataType::Utf8, false),
        Field::new("artist_name", DataType::Utf8, false),
        Field::new("genre", DataType::Utf8, false),
        Field::new("popularity", DataType::Int64, false),
    ];
    fields.extend(
        Feature::ALL
            .into_iter()
            .map(|f| Field::new(f.column_name(), DataType::Float64, false)),
    );
    let schema = Arc::new(Schema::new(fields));

    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from_iter_values(view.iter().map(|t| t.track_name.as_str()))),
        Arc::new(StringArray::from_iter_values(view.iter().map(|t| t.artist_name.as_str()))),
        Arc::new(StringArray::from_iter_values(view.iter().map(|t| t.genre.as_str()))),
        Arc::new(Int64Array::from_iter_values(view.iter().map(|t| i64::from(t.popularity)))),
    ];
    for feature in Feature::ALL {
        columns.push(Arc::new(Float64Array::from_iter_values(
            view.iter().map(|t| t.feature(feature)),
        )));
    }

    let batch = RecordBatch::try_new(schema.clone(), columns)?;

    let file = std::fs::File::create(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::load_file;
    use crate::data::model::tests::track;
    use crate::data::model::Track;

    fn tracks() -> Vec<Track> {
        vec![
            track("First", "Band", "rock", 40),
            track("Second", "Singer", "pop", 75),
            track("Third", "Band", "rock", 60),
        ]
    }

    #[test]
    fn test_csv_export_contains_only_view_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("view.csv");
        let all = tracks();
        let view: FilteredView<'_> = all.iter().filter(|t| t.genre == "rock").collect();

        assert_eq!(export_view(&view, &path).unwrap(), 2);

        let reloaded = load_file(&path).unwrap();
        let names: Vec<&str> = reloaded.tracks().iter().map(|t| t.track_name.as_str()).collect();
        assert_eq!(names, ["First", "Third"]);
        assert_eq!(reloaded.tracks()[1], all[2]);
    }

    #[test]
    fn test_parquet_export_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("view.parquet");
        let all = tracks();
        let view: FilteredView<'_> = all.iter().collect();

        export_view(&view, &path).unwrap();

        let reloaded = load_file(&path).unwrap();
        assert_eq!(reloaded.tracks(), all.as_slice());
    }

    #[test]
    fn test_empty_view_exports_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        let view: FilteredView<'_> = Vec::new();
        assert_eq!(export_view(&view, &path).unwrap(), 0);
        assert!(load_file(&path).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_format_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("view.txt");
        let view: FilteredView<'_> = Vec::new();
        assert!(matches!(
            export_view(&view, &path),
            Err(ExportError::UnsupportedFormat(ext)) if ext == "txt"
        ));
    }
}
