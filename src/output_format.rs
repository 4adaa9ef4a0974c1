// src/output_format.rs - delimited text sink
use crate::error::PipelineError;
use crate::table::Table;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Writes a table as headed, delimited text with no index column
#[derive(Debug, Clone, Copy)]
pub struct CsvSink {
    delimiter: u8,
}

impl Default for CsvSink {
    fn default() -> Self {
        CsvSink { delimiter: b',' }
    }
}

impl CsvSink {
    pub fn new(delimiter: u8) -> Self {
        CsvSink { delimiter }
    }

    pub fn write<W: Write>(&self, table: &Table, output: W) -> Result<(), PipelineError> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .terminator(csv::Terminator::Any(b'\n'))
            .has_headers(false)
            .from_writer(output);

        writer.write_record(table.schema.columns())?;
        for row in &table.rows {
            writer.write_record(row.cells())?;
        }
        writer
            .flush()
            .map_err(|e| PipelineError::Csv(csv::Error::from(e)))?;
        Ok(())
    }

    /// Write the table to `path`. The data goes to a temporary file in the
    /// destination directory first and is renamed over `path` only once complete.
    pub fn write_path(&self, table: &Table, path: &Path) -> Result<(), PipelineError> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut staging = NamedTempFile::new_in(dir).map_err(|e| PipelineError::io(dir, e))?;
        self.write(table, staging.as_file_mut())?;
        staging
            .as_file()
            .sync_all()
            .map_err(|e| PipelineError::io(staging.path(), e))?;
        staging
            .persist(path)
            .map_err(|e| PipelineError::io(path, e.error))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Row, Schema};

    fn table() -> Table {
        let schema = Schema::new(["Country", "Measure", "Value"]).unwrap();
        Table::new(
            schema,
            vec![Row::new(vec![
                "Mexico".into(),
                "Deaths, standardised".into(),
                "123.4".into(),
            ])],
        )
    }

    #[test]
    fn test_write_quotes_embedded_delimiters() {
        let mut out = Vec::new();
        CsvSink::default().write(&table(), &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Country,Measure,Value\nMexico,\"Deaths, standardised\",123.4\n"
        );
    }

    #[test]
    fn test_empty_table_still_has_header() {
        let empty = Table::new(Schema::new(["Country", "Year"]).unwrap(), Vec::new());
        let mut out = Vec::new();
        CsvSink::default().write(&empty, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Country,Year\n");
    }

    #[test]
    fn test_write_path_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        std::fs::write(&path, "stale").unwrap();

        CsvSink::default().write_path(&table(), &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("Country,Measure,Value\n"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_write_path_into_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join("out.csv");
        let err = CsvSink::default().write_path(&table(), &path).unwrap_err();
        assert!(matches!(err, PipelineError::Io { .. }));
    }
}
