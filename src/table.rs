// src/table.rs - in-memory table model shared by every pipeline stage
use crate::error::PipelineError;
use indexmap::IndexSet;
use serde::Deserialize;

/// A typed view of one cell, inferred from its text the way a CSV loader would
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl CellValue {
    /// Classify raw cell text. Surrounding whitespace is not stripped.
    pub fn infer(raw: &str) -> Self {
        if let Ok(i) = raw.parse::<i64>() {
            return CellValue::Integer(i);
        }
        // NaN and infinities stay text
        if let Ok(f) = raw.parse::<f64>() {
            if f.is_finite() {
                return CellValue::Float(f);
            }
        }
        CellValue::Text(raw.to_string())
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Float(f) => Some(*f),
            CellValue::Text(_) => None,
        }
    }

    /// Exact equality. Text values compare byte for byte against the raw cell;
    /// numeric values match cells holding the same number.
    pub fn matches(&self, raw: &str) -> bool {
        if let CellValue::Text(expected) = self {
            return expected == raw;
        }
        let cell = CellValue::infer(raw);
        match (self, &cell) {
            (CellValue::Integer(a), CellValue::Integer(b)) => a == b,
            _ => match (self.as_number(), cell.as_number()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }

    /// Interpret the value as a whole year number
    pub fn as_year(&self) -> Option<i64> {
        match self {
            CellValue::Integer(i) => Some(*i),
            CellValue::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            _ => None,
        }
    }
}

/// Ordered column names with O(1) name lookup
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    columns: IndexSet<String>,
}

impl Schema {
    pub fn new<I, S>(columns: I) -> Result<Self, PipelineError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = IndexSet::new();
        for column in columns {
            let column = column.into();
            if !set.insert(column.clone()) {
                return Err(PipelineError::Schema(format!(
                    "duplicate column '{}' in header",
                    column
                )));
            }
        }
        Ok(Schema { columns: set })
    }

    pub fn index_of(&self, column: &str) -> Option<usize> {
        self.columns.get_index_of(column)
    }

    /// Like `index_of`, but a missing column is a schema error
    pub fn require(&self, column: &str) -> Result<usize, PipelineError> {
        self.index_of(column)
            .ok_or_else(|| PipelineError::missing_column(column))
    }

    pub fn contains(&self, column: &str) -> bool {
        self.columns.contains(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// One observation. Cells are kept as raw text so survivors are written back unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    cells: Vec<String>,
}

impl Row {
    pub fn new(cells: Vec<String>) -> Self {
        Row { cells }
    }

    pub fn get(&self, index: usize) -> &str {
        self.cells.get(index).map(|s| s.as_str()).unwrap_or("")
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    fn retain_indices(self, keep: &[bool]) -> Row {
        let cells = self
            .cells
            .into_iter()
            .zip(keep.iter())
            .filter_map(|(cell, &k)| if k { Some(cell) } else { None })
            .collect();
        Row { cells }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub schema: Schema,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(schema: Schema, rows: Vec<Row>) -> Self {
        Table { schema, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Keep the rows for which `keep` returns true, in their original order
    pub fn filter_rows<F>(self, mut keep: F) -> Table
    where
        F: FnMut(&Row) -> bool,
    {
        let Table { schema, rows } = self;
        let rows = rows.into_iter().filter(|row| keep(row)).collect();
        Table { schema, rows }
    }

    /// Fallible variant of `filter_rows`; the first error aborts the whole filter
    pub fn try_filter_rows<F>(self, mut keep: F) -> Result<Table, PipelineError>
    where
        F: FnMut(&Row) -> Result<bool, PipelineError>,
    {
        let Table { schema, rows } = self;
        let mut kept = Vec::with_capacity(rows.len());
        for row in rows {
            if keep(&row)? {
                kept.push(row);
            }
        }
        Ok(Table { schema, rows: kept })
    }

    /// Remove columns from the schema and from every row
    pub fn drop_columns(self, columns: &[String]) -> Result<Table, PipelineError> {
        let mut keep = vec![true; self.schema.len()];
        for column in columns {
            let index = self.schema.require(column)?;
            keep[index] = false;
        }

        let schema = Schema::new(
            self.schema
                .columns()
                .zip(keep.iter())
                .filter(|(_, k)| **k)
                .map(|(c, _)| c.to_string()),
        )?;
        let rows = self
            .rows
            .into_iter()
            .map(|row| row.retain_indices(&keep))
            .collect();

        Ok(Table { schema, rows })
    }
}
