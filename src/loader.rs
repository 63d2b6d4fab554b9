// 📥 Tabular Loader - raw files and API batches → RawTable
//
// Column identity always comes from the schema registry, never from the
// data. Rows that do not fit the registered layout are logged, counted and
// dropped; the load itself keeps going.

use crate::error::{Error, MalformedRowError, Result};
use crate::fetcher::RawBatch;
use crate::schema::{resolve_schema, ColumnSchema, DocumentKind, Source};
use crate::table::{Cell, RawTable};
use csv::ReaderBuilder;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info, warn};

// ============================================================================
// FLAT FILES
// ============================================================================

/// Load a headerless, comma-delimited, Latin-1 file using the registry
/// layout for (source, kind, year). Every row is stamped with `year`.
pub fn load_file(path: &Path, source: Source, kind: DocumentKind, year: i32) -> Result<RawTable> {
    let schema = resolve_schema(source, kind, year)?;
    let bytes = std::fs::read(path).map_err(|e| Error::io(path, e))?;

    // Windows-1252 maps every byte, so decoding never fails
    let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
    let table = read_delimited(decoded.as_bytes(), schema, year);

    info!(
        path = %path.display(),
        %source,
        %kind,
        year,
        rows = table.len(),
        malformed = table.diagnostics.malformed_rows,
        "loaded file"
    );
    Ok(table)
}

/// Apply a registry layout positionally to headerless delimited text
pub fn read_delimited(text: &[u8], schema: &ColumnSchema, year: i32) -> RawTable {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text);

    let mut table = RawTable::new(schema.columns.iter().copied());
    let expected = schema.column_count();

    for (i, result) in reader.records().enumerate() {
        let line = i + 1;
        let record = match result {
            Ok(record) => record,
            Err(err) => {
                let err = MalformedRowError::Unreadable {
                    line,
                    reason: err.to_string(),
                };
                warn!(%err, "dropping row");
                table.diagnostics.malformed_rows += 1;
                continue;
            }
        };

        if record.len() != expected {
            let err = MalformedRowError::ColumnCount {
                line,
                expected,
                found: record.len(),
            };
            warn!(%err, "dropping row");
            table.diagnostics.malformed_rows += 1;
            continue;
        }

        let cells = schema
            .columns
            .iter()
            .zip(record.iter())
            .map(|(column, value)| {
                let cell = Cell::text(value);
                if schema.is_identifier(column) {
                    cell.to_identifier()
                } else {
                    cell
                }
            })
            .collect();
        table.push(cells, year);
    }

    table
}

// ============================================================================
// API BATCHES
// ============================================================================

/// Place fetched row objects into registry column order by field name.
/// Rows that are not objects, or lack the primary identifier, are dropped.
pub fn load_batch(batch: &RawBatch, source: Source, kind: DocumentKind, year: i32) -> Result<RawTable> {
    let schema = resolve_schema(source, kind, year)?;
    let mut table = RawTable::new(schema.columns.iter().copied());
    let primary = schema.identifiers.first().copied();

    for (i, value) in batch.rows.iter().enumerate() {
        let line = i + 1;
        let Value::Object(object) = value else {
            let err = MalformedRowError::Unreadable {
                line,
                reason: "row is not a JSON object".to_string(),
            };
            warn!(%err, "dropping row");
            table.diagnostics.malformed_rows += 1;
            continue;
        };

        if let Some(id) = primary {
            if object.get(id).map_or(true, Value::is_null) {
                let err = MalformedRowError::MissingField {
                    line,
                    field: id.to_string(),
                };
                warn!(%err, "dropping row");
                table.diagnostics.malformed_rows += 1;
                continue;
            }
        }

        let cells = schema
            .columns
            .iter()
            .map(|column| {
                let cell = object.get(*column).map_or(Cell::Null, Cell::from_json);
                if schema.is_identifier(column) {
                    cell.to_identifier()
                } else {
                    cell
                }
            })
            .collect();
        table.push(cells, year);
    }

    debug!(
        %source,
        %kind,
        rows = table.len(),
        malformed = table.diagnostics.malformed_rows,
        "loaded batch"
    );
    Ok(table)
}

/// Read a batch previously written by the fetcher
pub fn read_batch_file(path: &Path) -> Result<RawBatch> {
    let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    Ok(serde_json::from_str(&text)?)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::columns::pa;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn filer_line(id: &str, name: &str) -> String {
        let mut fields = vec![""; pa::FILERS_PRE_2022.len()];
        fields[0] = id;
        fields[1] = "2021";
        fields[5] = "2";
        fields[6] = name;
        fields.join(",")
    }

    #[test]
    fn test_load_file_applies_registry_columns() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", filer_line("000123", "SMITH FOR PA")).unwrap();
        writeln!(file, "{}", filer_line("456", "JONES")).unwrap();

        let table = load_file(file.path(), Source::Pennsylvania, DocumentKind::Filer, 2021).unwrap();

        assert_eq!(table.columns.len(), pa::FILERS_PRE_2022.len());
        assert_eq!(table.len(), 2);
        assert_eq!(table.value(&table.rows[0], "RECIPIENT_ID"), Some("000123".into()));
        assert_eq!(table.value(&table.rows[0], "RECIPIENT"), Some("SMITH FOR PA".into()));
        assert!(table.rows.iter().all(|row| row.epoch == 2021));
        assert!(table.diagnostics.is_clean());
    }

    #[test]
    fn test_wrong_column_count_is_dropped_and_counted() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", filer_line("1", "A")).unwrap();
        writeln!(file, "1,2,3").unwrap();
        writeln!(file, "{}", filer_line("2", "B")).unwrap();

        let table = load_file(file.path(), Source::Pennsylvania, DocumentKind::Filer, 2020).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.diagnostics.malformed_rows, 1);
    }

    #[test]
    fn test_latin1_bytes_decode() {
        let mut file = NamedTempFile::new().unwrap();
        let line = filer_line("9", "PE\u{d1}A");
        let bytes: Vec<u8> = line.chars().map(|c| c as u32 as u8).collect();
        file.write_all(&bytes).unwrap();
        file.write_all(b"\n").unwrap();

        let table = load_file(file.path(), Source::Pennsylvania, DocumentKind::Filer, 2020).unwrap();
        assert_eq!(table.value(&table.rows[0], "RECIPIENT"), Some("PEÑA".into()));
    }

    #[test]
    fn test_unknown_schema_aborts_load() {
        let file = NamedTempFile::new().unwrap();
        let err = load_file(file.path(), Source::Michigan, DocumentKind::Filer, 2020).unwrap_err();
        assert!(matches!(err, Error::UnknownSchema(_)));
    }

    #[test]
    fn test_load_batch_orders_and_coerces() {
        let batch = RawBatch {
            category: 1,
            start_year: 2022,
            end_year: 2023,
            rows: vec![
                json!({"EntityLastName": "SMITH", "EntityID": 9007199254740993u64, "OfficeName": "Governor"}),
                json!({"EntityLastName": "NO ID"}),
                json!(["not", "an", "object"]),
                json!({"EntityID": 42.0, "PartyName": "Democratic"}),
            ],
            failures: Vec::new(),
        };

        let table = load_batch(&batch, Source::Arizona, DocumentKind::Filer, 2023).unwrap();
        assert_eq!(table.columns[0], "EntityID");
        assert_eq!(table.len(), 2);
        assert_eq!(table.diagnostics.malformed_rows, 2);
        assert_eq!(table.value(&table.rows[0], "EntityID"), Some("9007199254740993".into()));
        assert_eq!(table.value(&table.rows[1], "EntityID"), Some("42".into()));
        assert_eq!(table.cell(&table.rows[1], "OfficeName"), Some(&Cell::Null));
        assert_eq!(table.rows[0].epoch, 2023);
    }
}
