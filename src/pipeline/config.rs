// src/pipeline/config.rs
use crate::error::PipelineError;
use crate::table::CellValue;
use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

pub const DEFAULT_YEAR_COLUMN: &str = "Year";
pub const DEFAULT_GROUP_COLUMN: &str = "Country";

/// Widest `required_years` range a job may ask for
pub const MAX_COVERAGE_SPAN: i64 = 10_000;

fn default_year_column() -> String {
    DEFAULT_YEAR_COLUMN.to_string()
}

fn default_group_column() -> String {
    DEFAULT_GROUP_COLUMN.to_string()
}

/// Years every group must contain, written as a list or an inclusive range
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum YearCoverage {
    Range { from: i64, to: i64 },
    Years(BTreeSet<i64>),
}

impl YearCoverage {
    pub fn range(from: i64, to: i64) -> Self {
        YearCoverage::Range { from, to }
    }

    pub fn years(&self) -> BTreeSet<i64> {
        match self {
            YearCoverage::Range { from, to } => (*from..=*to).collect(),
            YearCoverage::Years(years) => years.clone(),
        }
    }
}

/// Declarative description of which rows survive, and which columns
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterSpec {
    /// Column -> required value, checked in declaration order
    #[serde(default)]
    pub equality_filters: IndexMap<String, CellValue>,
    #[serde(default)]
    pub max_year: Option<i64>,
    #[serde(default)]
    pub country_allowlist: Option<Vec<String>>,
    #[serde(default)]
    pub required_years: Option<YearCoverage>,
    #[serde(default)]
    pub drop_columns: Vec<String>,
    #[serde(default = "default_year_column")]
    pub year_column: String,
    #[serde(default = "default_group_column")]
    pub group_column: String,
}

impl Default for FilterSpec {
    fn default() -> Self {
        FilterSpec {
            equality_filters: IndexMap::new(),
            max_year: None,
            country_allowlist: None,
            required_years: None,
            drop_columns: Vec::new(),
            year_column: default_year_column(),
            group_column: default_group_column(),
        }
    }
}

impl FilterSpec {
    pub fn with_equality(mut self, column: &str, value: CellValue) -> Self {
        self.equality_filters.insert(column.to_string(), value);
        self
    }

    pub fn with_max_year(mut self, year: i64) -> Self {
        self.max_year = Some(year);
        self
    }

    pub fn with_allowlist<I, S>(mut self, countries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.country_allowlist = Some(countries.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_required_years(mut self, coverage: YearCoverage) -> Self {
        self.required_years = Some(coverage);
        self
    }

    pub fn with_drop_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.drop_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        if let Some(YearCoverage::Range { from, to }) = &self.required_years {
            if from > to {
                return Err(PipelineError::Config(format!(
                    "required_years range is empty: {} > {}",
                    from, to
                )));
            }
            let span = i128::from(*to) - i128::from(*from) + 1;
            if span > i128::from(MAX_COVERAGE_SPAN) {
                return Err(PipelineError::Config(format!(
                    "required_years range {}..={} spans {} years, at most {} allowed",
                    from, to, span, MAX_COVERAGE_SPAN
                )));
            }
        }
        let mut seen = std::collections::HashSet::new();
        for column in &self.drop_columns {
            if !seen.insert(column) {
                return Err(PipelineError::Config(format!(
                    "column '{}' listed twice in drop_columns",
                    column
                )));
            }
        }
        Ok(())
    }
}

/// One cleaning job: where to read, where to write, and what to keep
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    #[serde(default)]
    pub filters: FilterSpec,
}

fn default_delimiter() -> char {
    ','
}

impl PipelineConfig {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>, filters: FilterSpec) -> Self {
        PipelineConfig {
            input: input.into(),
            output: output.into(),
            delimiter: default_delimiter(),
            filters,
        }
    }

    pub fn from_yaml_str(source: &str) -> Result<Self, PipelineError> {
        let config: PipelineConfig = serde_yaml::from_str(source)?;
        config.delimiter_byte()?;
        config.filters.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, PipelineError> {
        let source = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::Config(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_yaml_str(&source)
    }

    pub fn delimiter_byte(&self) -> Result<u8, PipelineError> {
        if self.delimiter.is_ascii() {
            Ok(self.delimiter as u8)
        } else {
            Err(PipelineError::Config(format!(
                "delimiter must be a single ASCII character, got {:?}",
                self.delimiter
            )))
        }
    }
}
