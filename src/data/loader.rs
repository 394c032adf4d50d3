use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, Float32Array, Float64Array, Int32Array, Int64Array};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{
    Event, EventDataset, EVENT_COLUMN, KINEMATIC_COLUMNS, MASS_COLUMN, RUN_COLUMN,
};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load an event table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row plus one event per line (the usual `dielectron.csv`)
/// * `.parquet` – flat numeric columns with the same names
/// * `.json`    – `[{ "E1": ..., "px1": ..., ... }, ...]`
///
/// Column names are trimmed before lookup, so `"px1 "` matches `px1`.
pub fn load_file(path: &Path) -> Result<EventDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => load_csv(path),
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        other => bail!("Unsupported file extension: .{other}"),
    }?;

    log::info!(
        "Loaded {} events with columns {:?} from {}",
        dataset.len(),
        dataset.column_names,
        path.display()
    );
    Ok(dataset)
}

/// Columns the event model reads.
fn wanted_columns() -> impl Iterator<Item = &'static str> {
    KINEMATIC_COLUMNS
        .into_iter()
        .chain([MASS_COLUMN, RUN_COLUMN, EVENT_COLUMN])
}

/// Fail on a missing kinematic column; warn on a missing `M` column.
fn check_columns(columns: &[String], format: &str) -> Result<()> {
    for required in KINEMATIC_COLUMNS {
        if !columns.iter().any(|c| c == required) {
            bail!("{format} missing '{required}' column");
        }
    }
    if !columns.iter().any(|c| c == MASS_COLUMN) {
        log::warn!("{format} has no '{MASS_COLUMN}' column; recorded mass treated as missing");
    }
    Ok(())
}

/// Text cells read as missing, compared case-insensitively after trimming.
const NA_VALUES: [&str; 8] = ["", "nan", "-nan", "na", "n/a", "#n/a", "null", "none"];

/// Whether a text cell holds a missing value: an NA marker or any text
/// that parses to NaN.
pub fn is_missing_text(s: &str) -> bool {
    let s = s.trim();
    NA_VALUES.iter().any(|na| s.eq_ignore_ascii_case(na))
        || s.parse::<f64>().is_ok_and(|v| v.is_nan())
}

/// Parse one text cell. Cells matching [`is_missing_text`] are `None`.
fn parse_cell(s: &str, row: usize, col: &str) -> Result<Option<f64>> {
    let s = s.trim();
    if is_missing_text(s) {
        return Ok(None);
    }
    let v = s
        .parse::<f64>()
        .with_context(|| format!("Row {row}, '{col}': '{s}' is not a number"))?;
    Ok(Some(v))
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<EventDataset> {
    let file = File::open(path).context("opening CSV")?;
    load_csv_reader(file)
}

/// Parse CSV text: a header row, then one event per record.
pub fn load_csv_reader<R: Read>(input: R) -> Result<EventDataset> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    check_columns(&headers, "CSV")?;

    let index: BTreeMap<&str, usize> = wanted_columns()
        .filter_map(|name| Some((name, headers.iter().position(|h| h == name)?)))
        .collect();

    let mut dataset = EventDataset::new(Vec::new(), headers.clone());

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;

        for (col_idx, value) in record.iter().enumerate() {
            if is_missing_text(value) {
                if let Some(name) = headers.get(col_idx) {
                    dataset.note_missing(name);
                }
            }
        }

        let mut cells = BTreeMap::new();
        for (&name, &col_idx) in &index {
            let value = parse_cell(record.get(col_idx).unwrap_or(""), row_no, name)?;
            cells.insert(name, value);
        }
        dataset
            .events
            .push(Event::from_lookup(row_no, |c| cells.get(c).copied().flatten()));
    }

    Ok(dataset)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Run": 147115, "Event": 366639895, "E1": 58.71, "px1": -7.31, ..., "M": 11.51 },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<EventDataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    load_json_str(&text)
}

pub fn load_json_str(text: &str) -> Result<EventDataset> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;
    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut columns: Vec<String> = Vec::new();
    for rec in records {
        if let Some(obj) = rec.as_object() {
            for key in obj.keys() {
                let key = key.trim();
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.to_string());
                }
            }
        }
    }
    check_columns(&columns, "JSON")?;

    let mut dataset = EventDataset::new(Vec::with_capacity(records.len()), columns.clone());

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        let trimmed: BTreeMap<&str, &JsonValue> =
            obj.iter().map(|(k, v)| (k.trim(), v)).collect();

        for col in &columns {
            match trimmed.get(col.as_str()) {
                None | Some(JsonValue::Null) => dataset.note_missing(col),
                Some(JsonValue::String(s)) if is_missing_text(s) => dataset.note_missing(col),
                _ => {}
            }
        }

        let mut cells = BTreeMap::new();
        for name in wanted_columns() {
            let value = match trimmed.get(name) {
                None | Some(JsonValue::Null) => None,
                Some(JsonValue::Number(n)) => n.as_f64(),
                Some(JsonValue::String(s)) => parse_cell(s, i, name)?,
                Some(other) => bail!("Row {i}, '{name}': {other} is not a number"),
            };
            cells.insert(name, value);
        }
        dataset
            .events
            .push(Event::from_lookup(i, |c| cells.get(c).copied().flatten()));
    }

    Ok(dataset)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one flat numeric column per field.
///
/// Float64, Float32, Int64 and Int32 columns are accepted; nulls and float
/// NaNs are missing values. Works with files written by both **Pandas**
/// (`df.to_parquet()`) and **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<EventDataset> {
    let file = File::open(path).context("opening parquet file")?;
    read_parquet(file, PARQUET_BATCH_SIZE)
}

const PARQUET_BATCH_SIZE: usize = 1024;

fn read_parquet(file: File, batch_size: usize) -> Result<EventDataset> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?
        .with_batch_size(batch_size);
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().trim().to_string())
        .collect();
    check_columns(&columns, "Parquet file")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut dataset = EventDataset::new(Vec::new(), columns.clone());
    let mut row_offset = 0;

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let n_rows = batch.num_rows();

        for (col_idx, name) in columns.iter().enumerate() {
            let col = batch.column(col_idx);
            for row in 0..n_rows {
                if is_missing_cell(col, row) {
                    dataset.note_missing(name);
                }
            }
        }

        let mut wanted = BTreeMap::new();
        for name in wanted_columns() {
            if let Some(col_idx) = columns.iter().position(|c| c == name) {
                wanted.insert(name, batch.column(col_idx));
            }
        }

        for row in 0..n_rows {
            let mut cells = BTreeMap::new();
            for (&name, col) in &wanted {
                let value = extract_f64(col, row)
                    .with_context(|| format!("Row {}: failed to read '{name}'", row_offset + row))?;
                cells.insert(name, value);
            }
            dataset.events.push(Event::from_lookup(row_offset + row, |c| {
                cells.get(c).copied().flatten()
            }));
        }
        row_offset += n_rows;
    }

    Ok(dataset)
}

/// Null, or NaN in a float column.
fn is_missing_cell(col: &Arc<dyn Array>, row: usize) -> bool {
    if col.is_null(row) {
        return true;
    }
    match col.data_type() {
        DataType::Float64 => col
            .as_any()
            .downcast_ref::<Float64Array>()
            .is_some_and(|arr| arr.value(row).is_nan()),
        DataType::Float32 => col
            .as_any()
            .downcast_ref::<Float32Array>()
            .is_some_and(|arr| arr.value(row).is_nan()),
        _ => false,
    }
}

/// Extract a single numeric cell from an Arrow column.
fn extract_f64(col: &Arc<dyn Array>, row: usize) -> Result<Option<f64>> {
    if col.is_null(row) {
        return Ok(None);
    }
    let value = match col.data_type() {
        DataType::Float64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float64Array>()
                .context("expected Float64Array")?;
            arr.value(row)
        }
        DataType::Float32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float32Array>()
                .context("expected Float32Array")?;
            arr.value(row) as f64
        }
        DataType::Int64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int64Array>()
                .context("expected Int64Array")?;
            arr.value(row) as f64
        }
        DataType::Int32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int32Array>()
                .context("expected Int32Array")?;
            arr.value(row) as f64
        }
        other => bail!("Expected a numeric column, got {other:?}"),
    };
    Ok((!value.is_nan()).then_some(value))
}
