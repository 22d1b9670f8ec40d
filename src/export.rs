//! Result accumulation and CSV export.
//!
//! Records accumulate in input order for the whole run and are persisted
//! exactly once at the end. Nothing is flushed incrementally: an interrupted
//! run leaves no partial artifact behind.

use crate::extract::Record;
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ExportError {
    /// A record's column set diverged from the schema established by the
    /// first record. Failing loudly beats silently truncating or reordering
    /// columns.
    #[error(
        "record {index} ({ticket}) does not match the export schema: \
         expected columns [{expected}], found [{found}]"
    )]
    SchemaMismatch {
        index: usize,
        ticket: String,
        expected: String,
        found: String,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: csv::Error,
    },
}

/// Ordered collection of the records produced by one run.
#[derive(Debug, Default)]
pub struct ResultSet {
    records: Vec<Record>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record; records are immutable once appended.
    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Write every record as CSV with a header row.
    ///
    /// Column order comes from the first record (identifier column first,
    /// then the field spec order). Returns `false` without touching the
    /// filesystem when there is nothing to write; producing an empty artifact
    /// would be worse than producing none.
    pub fn export_csv(&self, path: &Path) -> Result<bool, ExportError> {
        let Some(first) = self.records.first() else {
            return Ok(false);
        };
        let header: Vec<&str> = first.keys().collect();

        // Validate the whole set before creating the file so a mismatch
        // cannot leave a half-written artifact.
        for (index, record) in self.records.iter().enumerate().skip(1) {
            let keys: Vec<&str> = record.keys().collect();
            if keys != header {
                return Err(ExportError::SchemaMismatch {
                    index,
                    ticket: record.ticket().to_string(),
                    expected: header.join(", "),
                    found: keys.join(", "),
                });
            }
        }

        let write_err = |source: csv::Error| ExportError::Write {
            path: path.display().to_string(),
            source,
        };

        let mut writer = csv::Writer::from_path(path).map_err(write_err)?;
        writer.write_record(&header).map_err(write_err)?;
        for record in &self.records {
            writer.write_record(record.values()).map_err(write_err)?;
        }
        writer.flush().map_err(|e| write_err(e.into()))?;

        info!(path = %path.display(), rows = self.records.len(), "exported result set");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TICKET_COLUMN;

    fn record(ticket: &str, fields: &[(&str, &str)]) -> Record {
        let mut record = Record::new(ticket);
        for (name, value) in fields {
            record.push_field(name, value.to_string());
        }
        record
    }

    #[test]
    fn test_export_header_and_rows_in_input_order() {
        let mut results = ResultSet::new();
        results.push(record("A", &[("Category", "Network")]));
        results.push(record("B", &[("Category", "Hardware")]));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        assert!(results.export_csv(&path).unwrap());

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["TicketNumber,Category", "A,Network", "B,Hardware"]);
    }

    #[test]
    fn test_empty_result_set_writes_nothing() {
        let results = ResultSet::new();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        assert!(!results.export_csv(&path).unwrap());
        assert!(!path.exists());
    }

    #[test]
    fn test_schema_mismatch_fails_without_writing() {
        let mut results = ResultSet::new();
        results.push(record("A", &[("Category", "Network"), ("Status", "Open")]));
        // Strict subset of the first record's keys.
        results.push(record("B", &[("Category", "Hardware")]));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let err = results.export_csv(&path).unwrap_err();
        match err {
            ExportError::SchemaMismatch { index, ticket, .. } => {
                assert_eq!(index, 1);
                assert_eq!(ticket, "B");
            }
            other => panic!("expected SchemaMismatch, got {other}"),
        }
        assert!(!path.exists());
    }

    #[test]
    fn test_values_with_delimiters_survive_round_trip() {
        let mut results = ResultSet::new();
        results.push(record(
            "CHG-1",
            &[
                ("Summary", "Replace router, then verify \"uplink\""),
                ("Description", "line one\nline two"),
            ],
        ));
        results.push(record("CHG-2", &[("Summary", ""), ("Description", "plain")]));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        results.export_csv(&path).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(headers, vec![TICKET_COLUMN, "Summary", "Description"]);

        let rows: Vec<csv::StringRecord> =
            reader.records().collect::<Result<_, _>>().unwrap();
        assert_eq!(rows.len(), 2);

        for (row, original) in rows.iter().zip(results.records()) {
            let values: Vec<&str> = original.values().collect();
            let parsed: Vec<&str> = row.iter().collect();
            assert_eq!(parsed, values);
        }
    }
}
