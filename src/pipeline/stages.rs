// src/pipeline/stages.rs - one stage per filtering step
use crate::error::PipelineError;
use crate::pipeline::context::StageReport;
use crate::table::{CellValue, Row, Table};
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{debug, warn};

/// A single table -> table step of the pipeline
pub trait TableStage: Send + Sync {
    fn name(&self) -> &str;
    fn apply(&self, table: Table, report: &mut StageReport) -> Result<Table, PipelineError>;
}

/// Reads a year cell. Empty cells yield `None`; anything else must be a whole number.
fn year_of(row: &Row, index: usize, column: &str) -> Result<Option<i64>, PipelineError> {
    let raw = row.get(index);
    if raw.is_empty() {
        return Ok(None);
    }
    CellValue::infer(raw).as_year().map(Some).ok_or_else(|| {
        PipelineError::Schema(format!(
            "column '{}' holds non-integer value '{}'",
            column, raw
        ))
    })
}

/// Keeps rows whose `column` equals `value` exactly
pub struct EqualityFilter {
    name: String,
    column: String,
    value: CellValue,
}

impl EqualityFilter {
    pub fn new(column: &str, value: CellValue) -> Self {
        EqualityFilter {
            name: format!("equals({})", column),
            column: column.to_string(),
            value,
        }
    }
}

impl TableStage for EqualityFilter {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, table: Table, _report: &mut StageReport) -> Result<Table, PipelineError> {
        // A dataset without the column simply has no such filter.
        let Some(index) = table.schema.index_of(&self.column) else {
            warn!(column = %self.column, "equality filter column absent, skipping filter");
            return Ok(table);
        };
        Ok(table.filter_rows(|row| self.value.matches(row.get(index))))
    }
}

/// Drops rows whose year is later than `max_year`
pub struct YearBound {
    column: String,
    max_year: i64,
}

impl YearBound {
    pub fn new(column: &str, max_year: i64) -> Self {
        YearBound {
            column: column.to_string(),
            max_year,
        }
    }
}

impl TableStage for YearBound {
    fn name(&self) -> &str {
        "max_year"
    }

    fn apply(&self, table: Table, _report: &mut StageReport) -> Result<Table, PipelineError> {
        let index = table.schema.require(&self.column)?;
        table.try_filter_rows(|row| {
            Ok(year_of(row, index, &self.column)?.is_some_and(|year| year <= self.max_year))
        })
    }
}

/// Keeps rows whose group key is listed
pub struct Allowlist {
    column: String,
    members: HashSet<String>,
}

impl Allowlist {
    pub fn new<I, S>(column: &str, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Allowlist {
            column: column.to_string(),
            members: members.into_iter().map(Into::into).collect(),
        }
    }
}

impl TableStage for Allowlist {
    fn name(&self) -> &str {
        "allowlist"
    }

    fn apply(&self, table: Table, _report: &mut StageReport) -> Result<Table, PipelineError> {
        let index = table.schema.require(&self.column)?;
        Ok(table.filter_rows(|row| self.members.contains(row.get(index))))
    }
}

/// Keeps whole groups whose distinct years cover every required year.
/// Rows with an empty group key belong to no group and are dropped.
pub struct YearCoverageFilter {
    group_column: String,
    year_column: String,
    required: BTreeSet<i64>,
}

impl YearCoverageFilter {
    pub fn new(group_column: &str, year_column: &str, required: BTreeSet<i64>) -> Self {
        YearCoverageFilter {
            group_column: group_column.to_string(),
            year_column: year_column.to_string(),
            required,
        }
    }
}

impl TableStage for YearCoverageFilter {
    fn name(&self) -> &str {
        "year_coverage"
    }

    fn apply(&self, table: Table, report: &mut StageReport) -> Result<Table, PipelineError> {
        let group_index = table.schema.require(&self.group_column)?;
        let year_index = table.schema.require(&self.year_column)?;

        let mut coverage: HashMap<&str, BTreeSet<i64>> = HashMap::new();
        for row in &table.rows {
            let key = row.get(group_index);
            if key.is_empty() {
                continue;
            }
            let years = coverage.entry(key).or_default();
            if let Some(year) = year_of(row, year_index, &self.year_column)? {
                years.insert(year);
            }
        }

        let passing: HashSet<String> = coverage
            .iter()
            .filter(|(_, years)| self.required.is_subset(years))
            .map(|(key, _)| key.to_string())
            .collect();

        for (key, years) in &coverage {
            if !passing.contains(*key) {
                let missing: Vec<i64> = self.required.difference(years).copied().collect();
                debug!(group = %key, ?missing, "group lacks required years");
            }
        }

        report.groups_kept = Some(passing.len());
        report.groups_dropped = Some(coverage.len() - passing.len());

        Ok(table.filter_rows(|row| passing.contains(row.get(group_index))))
    }
}

/// Removes columns from the output schema
pub struct DropColumns {
    columns: Vec<String>,
}

impl DropColumns {
    pub fn new(columns: Vec<String>) -> Self {
        DropColumns { columns }
    }
}

impl TableStage for DropColumns {
    fn name(&self) -> &str {
        "drop_columns"
    }

    fn apply(&self, table: Table, _report: &mut StageReport) -> Result<Table, PipelineError> {
        table.drop_columns(&self.columns)
    }
}
