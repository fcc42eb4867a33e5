use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, AsArray};
use calamine::{open_workbook_auto, Data, Reader};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, Dataset, Record};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Workbook formats read through `calamine`.
pub const WORKBOOK_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Every extension [`load_file`] accepts, for file dialogs.
pub const SUPPORTED_EXTENSIONS: [&str; 9] =
    ["xlsx", "xlsm", "xlsb", "xls", "ods", "csv", "json", "parquet", "pq"];

/// Load the first (only) sheet of a salary table.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – one scalar column per field
/// * `.json`    – `[{ "Team": "...", "Salary": "12,345万円", ... }, ...]`
/// * `.csv`     – header row with field names
/// * `.xlsx` / `.xls` / `.ods` – first worksheet, header row with field names
///
/// Empty cells become [`CellValue::Null`]. Field order follows the file.
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        "csv" => load_csv(path),
        ext if WORKBOOK_EXTENSIONS.contains(&ext) => load_workbook(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, one object per player):
///
/// ```json
/// [
///   { "Player Name": "Sato", "Team": "Lions", "Position": "Pitcher", "Salary": 12000 },
///   { "Player Name": "Suzuki", "Team": "Hawks", "Position": "Catcher", "Salary": "8,500万円" }
/// ]
/// ```
fn load_json(path: &Path) -> Result<Dataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let rows = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut records = Vec::with_capacity(rows.len());

    for (i, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let record: Record = obj
            .iter()
            .map(|(key, val)| (key.clone(), json_to_cell(val)))
            .collect();
        records.push(record);
    }

    Ok(Dataset::from_records(records))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with field names, one player per row.
/// Short rows are padded with `Null`; surplus cells are ignored.
fn load_csv(path: &Path) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut records = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let row = result.with_context(|| format!("CSV row {row_no}"))?;

        let record: Record = headers
            .iter()
            .enumerate()
            .map(|(col_idx, name)| (name.clone(), guess_cell_type(row.get(col_idx).unwrap_or(""))))
            .collect();
        records.push(record);
    }

    Ok(Dataset::from_records(records))
}

fn guess_cell_type(s: &str) -> CellValue {
    if s.is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        if f.is_finite() {
            return CellValue::Float(f);
        }
    }
    if s == "true" || s == "false" {
        return CellValue::Bool(s == "true");
    }
    CellValue::String(s.to_string())
}

// ---------------------------------------------------------------------------
// Workbook loader
// ---------------------------------------------------------------------------

/// Read the first worksheet. Its first row names the fields; every later row
/// with at least one value becomes a record carrying all fields.
fn load_workbook(path: &Path) -> Result<Dataset> {
    let mut workbook = open_workbook_auto(path).context("opening workbook")?;
    let range = workbook
        .worksheet_range_at(0)
        .context("Workbook has no worksheets")?
        .context("reading first worksheet")?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(Dataset::default());
    };
    let headers = header_names(header_row);

    let records = rows
        .filter(|row| row.iter().any(|c| !matches!(c, Data::Empty)))
        .map(|row| {
            headers
                .iter()
                .enumerate()
                .map(|(col_idx, name)| {
                    let cell = row.get(col_idx).map_or(CellValue::Null, data_to_cell);
                    (name.clone(), cell)
                })
                .collect::<Record>()
        })
        .collect();

    Ok(Dataset::from_records(records))
}

/// Field names from the header row. Blank headers become `__EMPTY`,
/// `__EMPTY_1`, ...; repeats get a numeric suffix so no column is lost.
fn header_names(row: &[Data]) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(row.len());
    for cell in row {
        let base = match data_to_cell(cell) {
            CellValue::Null => "__EMPTY".to_string(),
            other => other.to_string(),
        };
        let mut name = base.clone();
        let mut n = 0;
        while names.contains(&name) {
            n += 1;
            name = format!("{base}_{n}");
        }
        names.push(name);
    }
    names
}

fn data_to_cell(cell: &Data) -> CellValue {
    match cell {
        Data::String(s) if s.is_empty() => CellValue::Null,
        Data::String(s) => CellValue::String(s.clone()),
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Float(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::String(s.clone()),
        Data::Error(_) | Data::Empty => CellValue::Null,
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one scalar column per field.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        for row in 0..batch.num_rows() {
            let record: Record = schema
                .fields()
                .iter()
                .enumerate()
                .map(|(col_idx, field)| {
                    (field.name().clone(), extract_cell_value(batch.column(col_idx), row))
                })
                .collect();
            records.push(record);
        }
    }

    Ok(Dataset::from_records(records))
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell_value(col: &Arc<dyn Array>, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 => CellValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => CellValue::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        other => CellValue::String(format!("{other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use pretty_assertions::assert_eq;
    use tempfile::Builder;

    fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn csv_cells_are_typed_and_ordered() {
        let file = write_temp(
            ".csv",
            "Player Name,Team,Position,Salary\n\
             Sato,Lions,Pitcher,\"12,345万円\"\n\
             Suzuki,,Catcher,800\n\
             Tanaka,Hawks\n",
        );
        let ds = load_file(file.path()).unwrap();

        assert_eq!(ds.len(), 3);
        assert_eq!(ds.column_names(), vec!["Player Name", "Team", "Position", "Salary"]);
        assert_eq!(ds.records[0].get("Salary"), Some(&CellValue::from("12,345万円")));
        assert_eq!(ds.records[1].get("Team"), Some(&CellValue::Null));
        assert_eq!(ds.records[1].get("Salary"), Some(&CellValue::Integer(800)));
        assert_eq!(ds.records[2].get("Salary"), Some(&CellValue::Null));
    }

    #[test]
    fn json_preserves_key_order() {
        let file = write_temp(
            ".json",
            r#"[{"Team": "Lions", "Salary": 1.5, "Position": null, "Active": true}]"#,
        );
        let ds = load_file(file.path()).unwrap();

        assert_eq!(ds.column_names(), vec!["Team", "Salary", "Position", "Active"]);
        let r = &ds.records[0];
        assert_eq!(r.get("Salary"), Some(&CellValue::Float(1.5)));
        assert_eq!(r.get("Position"), Some(&CellValue::Null));
        assert_eq!(r.get("Active"), Some(&CellValue::Bool(true)));
    }

    #[test]
    fn json_must_be_an_array_of_objects() {
        let file = write_temp(".json", r#"{"Team": "Lions"}"#);
        assert!(load_file(file.path()).is_err());

        let file = write_temp(".json", r#"[1, 2]"#);
        let err = load_file(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("Row 0"));
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let file = write_temp(".numbers", "irrelevant");
        let err = load_file(file.path()).unwrap_err();
        assert!(err.to_string().contains(".numbers"));
    }

    #[test]
    fn parquet_scalar_columns() {
        use arrow::array::{Int64Array, StringArray};
        use arrow::datatypes::{Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let schema = Arc::new(Schema::new(vec![
            Field::new("Team", DataType::Utf8, true),
            Field::new("Salary", DataType::Int64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec![Some("Lions"), None])),
                Arc::new(Int64Array::from(vec![Some(1200), None])),
            ],
        )
        .unwrap();

        let file = Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.column_names(), vec!["Team", "Salary"]);
        assert_eq!(ds.records[0].get("Salary"), Some(&CellValue::Integer(1200)));
        assert_eq!(ds.records[1].get("Team"), Some(&CellValue::Null));
    }

    #[test]
    fn xlsx_first_sheet_with_header_row() {
        use rust_xlsxwriter::Workbook;

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (col, name) in ["Player Name", "Team", "Position", "Salary", "", "Team"]
            .iter()
            .enumerate()
        {
            if !name.is_empty() {
                sheet.write_string(0, col as u16, *name).unwrap();
            }
        }
        sheet.write_string(1, 0, "Sato").unwrap();
        sheet.write_string(1, 1, "Lions").unwrap();
        sheet.write_string(1, 2, "Pitcher").unwrap();
        sheet.write_string(1, 3, "12,345万円").unwrap();
        sheet.write_boolean(1, 5, true).unwrap();
        // Row 2 left blank.
        sheet.write_string(3, 0, "Suzuki").unwrap();
        sheet.write_number(3, 3, 800.0).unwrap();
        workbook
            .add_worksheet()
            .write_string(0, 0, "ignored")
            .unwrap();

        let file = Builder::new().suffix(".xlsx").tempfile().unwrap();
        workbook.save(file.path()).unwrap();

        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(
            ds.column_names(),
            vec!["Player Name", "Team", "Position", "Salary", "__EMPTY", "Team_1"]
        );
        let sato = &ds.records[0];
        assert_eq!(sato.get("Salary"), Some(&CellValue::from("12,345万円")));
        assert_eq!(sato.get("__EMPTY"), Some(&CellValue::Null));
        assert_eq!(sato.get("Team_1"), Some(&CellValue::Bool(true)));
        let suzuki = &ds.records[1];
        assert_eq!(suzuki.get("Team"), Some(&CellValue::Null));
        assert_eq!(suzuki.get("Salary"), Some(&CellValue::Float(800.0)));
        assert_eq!(suzuki.len(), 6);
    }

    #[test]
    fn workbook_cells() {
        assert_eq!(data_to_cell(&Data::Empty), CellValue::Null);
        assert_eq!(data_to_cell(&Data::String(String::new())), CellValue::Null);
        assert_eq!(data_to_cell(&Data::Int(7)), CellValue::Integer(7));
        assert_eq!(data_to_cell(&Data::Float(1.5)), CellValue::Float(1.5));
        assert_eq!(
            data_to_cell(&Data::Error(calamine::CellErrorType::Div0)),
            CellValue::Null
        );
        assert_eq!(
            header_names(&[Data::Empty, Data::Empty, Data::String("Team".into())]),
            vec!["__EMPTY", "__EMPTY_1", "Team"]
        );
    }

    #[test]
    fn corrupt_workbook_is_an_error() {
        let file = write_temp(".xlsx", "not a zip archive");
        assert!(load_file(file.path()).is_err());
    }

    #[test]
    fn every_dialog_extension_has_a_decoder() {
        for ext in SUPPORTED_EXTENSIONS {
            let file = write_temp(&format!(".{}", ext.to_uppercase()), "");
            if let Err(err) = load_file(file.path()) {
                let err = format!("{err:#}");
                assert!(!err.contains("Unsupported"), "{ext}: {err}");
            }
        }
    }

    #[test]
    fn guesses() {
        assert_eq!(guess_cell_type(""), CellValue::Null);
        assert_eq!(guess_cell_type("42"), CellValue::Integer(42));
        assert_eq!(guess_cell_type("4.5"), CellValue::Float(4.5));
        assert_eq!(guess_cell_type("inf"), CellValue::from("inf"));
        assert_eq!(guess_cell_type("false"), CellValue::Bool(false));
        assert_eq!(guess_cell_type("1,000"), CellValue::from("1,000"));
    }
}
