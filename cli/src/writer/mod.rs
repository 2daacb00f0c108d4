//! CSV writer for classified records.
//!
//! Writes the original header and values, plus the decision column, in
//! input order. A decision column already present in the input is
//! overwritten in place.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::{WriteError, WriteResult};
use crate::models::{BusinessRecord, Decision, Schema};

/// Where the decision lands in each output row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeepSlot {
    Append,
    Replace(usize),
}

impl KeepSlot {
    pub fn for_schema(schema: &Schema, keep_column: &str) -> Self {
        match schema.position(keep_column) {
            Some(i) => KeepSlot::Replace(i),
            None => KeepSlot::Append,
        }
    }
}

/// Write classified records to a file, replacing any existing file.
pub fn write_csv(
    path: &Path,
    schema: &Schema,
    records: &[BusinessRecord],
    decisions: &[Decision],
    delimiter: u8,
    keep_column: &str,
) -> WriteResult<()> {
    let file = File::create(path).map_err(|source| WriteError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    write_to(file, schema, records, decisions, delimiter, keep_column).map_err(|e| match e {
        WriteError::Csv(err) if err.is_io_error() => WriteError::Io {
            path: path.to_path_buf(),
            source: match err.into_kind() {
                csv::ErrorKind::Io(source) => source,
                _ => std::io::Error::other("csv write failed"),
            },
        },
        other => other,
    })
}

/// Write classified records to any writer.
pub fn write_to<W: Write>(
    writer: W,
    schema: &Schema,
    records: &[BusinessRecord],
    decisions: &[Decision],
    delimiter: u8,
    keep_column: &str,
) -> WriteResult<()> {
    if records.len() != decisions.len() {
        return Err(WriteError::DecisionMismatch {
            records: records.len(),
            decisions: decisions.len(),
        });
    }

    let slot = KeepSlot::for_schema(schema, keep_column);

    let mut out = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);

    let mut header: Vec<&str> = schema.headers().iter().map(String::as_str).collect();
    if slot == KeepSlot::Append {
        header.push(keep_column);
    }
    out.write_record(&header)?;

    for (record, decision) in records.iter().zip(decisions) {
        let mut row: Vec<&str> = record.values().iter().map(String::as_str).collect();
        match slot {
            KeepSlot::Append => row.push(decision.as_str()),
            KeepSlot::Replace(i) => {
                if let Some(cell) = row.get_mut(i) {
                    *cell = decision.as_str();
                }
            }
        }
        out.write_record(&row)?;
    }

    out.flush().map_err(|e| WriteError::Csv(e.into()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(schema: &Schema, records: &[BusinessRecord], decisions: &[Decision], delimiter: u8) -> String {
        let mut buf = Vec::new();
        write_to(&mut buf, schema, records, decisions, delimiter, "Keep row").unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_appends_keep_column() {
        let schema = Schema::new(vec!["Name".into(), "Street 1".into()]);
        let records = vec![
            BusinessRecord::new(0, vec!["Petco".into(), "65 Ave De Diego".into()]),
            BusinessRecord::new(1, vec!["Tapas, Bar".into(), "".into()]),
        ];
        let decisions = vec![Decision::new(0, true), Decision::new(1, false)];

        let out = render(&schema, &records, &decisions, b',');
        assert_eq!(
            out,
            "Name,Street 1,Keep row\nPetco,65 Ave De Diego,True\n\"Tapas, Bar\",,False\n"
        );
    }

    #[test]
    fn test_header_only() {
        let schema = Schema::new(vec!["Name".into()]);
        assert_eq!(render(&schema, &[], &[], b','), "Name,Keep row\n");
    }

    #[test]
    fn test_keeps_delimiter() {
        let schema = Schema::new(vec!["Name".into(), "City".into()]);
        let records = vec![BusinessRecord::new(0, vec!["A".into(), "Ponce".into()])];
        let out = render(&schema, &records, &[Decision::new(0, true)], b';');
        assert_eq!(out, "Name;City;Keep row\nA;Ponce;True\n");
    }

    #[test]
    fn test_existing_keep_column_replaced() {
        let schema = Schema::new(vec!["Name".into(), "Keep row".into(), "City".into()]);
        let records = vec![BusinessRecord::new(0, vec!["A".into(), "maybe".into(), "Ponce".into()])];
        let out = render(&schema, &records, &[Decision::new(0, false)], b',');
        assert_eq!(out, "Name,Keep row,City\nA,False,Ponce\n");
    }

    #[test]
    fn test_mismatched_decisions() {
        let schema = Schema::new(vec!["Name".into()]);
        let records = vec![BusinessRecord::new(0, vec!["A".into()])];
        let mut buf = Vec::new();
        let err = write_to(&mut buf, &schema, &records, &[], b',', "Keep row").unwrap_err();
        assert!(matches!(err, WriteError::DecisionMismatch { records: 1, decisions: 0 }));
    }

    #[test]
    fn test_write_csv_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("businesses_to_keep.csv");
        std::fs::write(&path, "stale,content\n1,2\n3,4\n").unwrap();

        let schema = Schema::new(vec!["Name".into()]);
        let records = vec![BusinessRecord::new(0, vec!["A".into()])];
        write_csv(&path, &schema, &records, &[Decision::new(0, true)], b',', "Keep row").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Name,Keep row\nA,True\n");
    }
}
