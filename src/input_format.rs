// src/input_format.rs - delimited text source
use crate::error::PipelineError;
use crate::table::{Row, Schema, Table};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Reads a headed, delimited text table
#[derive(Debug, Clone, Copy)]
pub struct CsvSource {
    delimiter: u8,
}

impl Default for CsvSource {
    fn default() -> Self {
        CsvSource { delimiter: b',' }
    }
}

impl CsvSource {
    pub fn new(delimiter: u8) -> Self {
        CsvSource { delimiter }
    }

    pub fn read_path(&self, path: &Path) -> Result<Table, PipelineError> {
        let file = File::open(path).map_err(|e| PipelineError::io(path, e))?;
        self.read(BufReader::new(file))
    }

    pub fn read<R: Read>(&self, input: R) -> Result<Table, PipelineError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(false)
            .from_reader(input);

        let headers = reader.headers()?.clone();
        if headers.is_empty() {
            return Err(PipelineError::Schema("input has no header row".to_string()));
        }
        let schema = Schema::new(headers.iter())?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(Row::new(record.iter().map(|f| f.to_string()).collect()));
        }

        Ok(Table::new(schema, rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_quoted_fields() {
        let input = "Country,Measure,Year\nMexico,\"Deaths, standardised\",2015\n";
        let table = CsvSource::default().read(Cursor::new(input)).unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.schema.index_of("Year"), Some(2));
        assert_eq!(table.rows[0].get(1), "Deaths, standardised");
    }

    #[test]
    fn test_read_custom_delimiter() {
        let input = "Country;Year\nPeru;2011\n";
        let table = CsvSource::new(b';').read(Cursor::new(input)).unwrap();
        assert_eq!(table.rows[0].get(0), "Peru");
    }

    #[test]
    fn test_ragged_row_fails() {
        let input = "Country,Year\nPeru,2011,extra\n";
        let err = CsvSource::default().read(Cursor::new(input)).unwrap_err();
        assert!(matches!(err, PipelineError::Csv(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = CsvSource::default()
            .read_path(Path::new("definitely/not/here.csv"))
            .unwrap_err();
        assert!(matches!(err, PipelineError::Io { .. }));
    }

    #[test]
    fn test_empty_input_has_no_header() {
        let err = CsvSource::default().read(Cursor::new("")).unwrap_err();
        assert!(err.is_schema_error());
    }
}
