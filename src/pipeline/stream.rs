// src/pipeline/stream.rs
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

use crate::error::PipelineError;
use crate::input_format::CsvSource;
use crate::output_format::CsvSink;
use crate::pipeline::config::{FilterSpec, PipelineConfig};
use crate::pipeline::context::{ProcessingStats, StageReport};
use crate::pipeline::stages::{
    Allowlist, DropColumns, EqualityFilter, TableStage, YearBound, YearCoverageFilter,
};
use crate::table::Table;

/// Main pipeline orchestrator: load, run every stage in order, write
pub struct FilterPipeline {
    stages: Vec<Box<dyn TableStage>>,
    source: CsvSource,
    sink: CsvSink,
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterPipeline {
    pub fn new() -> Self {
        FilterPipeline {
            stages: Vec::new(),
            source: CsvSource::default(),
            sink: CsvSink::default(),
        }
    }

    /// Build the fixed stage sequence: equality filters, year bound,
    /// allowlist, year coverage, column drop. Unset options add no stage.
    pub fn from_spec(spec: &FilterSpec) -> Result<Self, PipelineError> {
        spec.validate()?;
        let mut pipeline = FilterPipeline::new();

        for (column, value) in &spec.equality_filters {
            pipeline.add_stage(Box::new(EqualityFilter::new(column, value.clone())));
        }

        if let Some(max_year) = spec.max_year {
            pipeline.add_stage(Box::new(YearBound::new(&spec.year_column, max_year)));
        }

        // An empty allowlist places no restriction
        if let Some(countries) = spec.country_allowlist.as_ref().filter(|c| !c.is_empty()) {
            pipeline.add_stage(Box::new(Allowlist::new(
                &spec.group_column,
                countries.iter().cloned(),
            )));
        }

        if let Some(coverage) = &spec.required_years {
            pipeline.add_stage(Box::new(YearCoverageFilter::new(
                &spec.group_column,
                &spec.year_column,
                coverage.years(),
            )));
        }

        if !spec.drop_columns.is_empty() {
            pipeline.add_stage(Box::new(DropColumns::new(spec.drop_columns.clone())));
        }

        Ok(pipeline)
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.source = CsvSource::new(delimiter);
        self.sink = CsvSink::new(delimiter);
        self
    }

    pub fn add_stage(&mut self, stage: Box<dyn TableStage>) {
        self.stages.push(stage);
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Run every stage over an in-memory table
    pub fn process(&self, table: Table) -> Result<(Table, ProcessingStats), PipelineError> {
        let start_time = Instant::now();
        let mut stats = ProcessingStats {
            rows_read: table.len(),
            ..Default::default()
        };

        let mut current = table;
        for stage in &self.stages {
            let mut report = StageReport::new(stage.name());
            report.rows_in = current.len();
            current = stage.apply(current, &mut report)?;
            report.rows_out = current.len();

            debug!(
                stage = %report.stage,
                rows_in = report.rows_in,
                rows_out = report.rows_out,
                "stage complete"
            );
            stats.stages.push(report);
        }

        stats.rows_written = current.len();
        stats.columns_written = current.schema.len();
        stats.processing_time = start_time.elapsed();
        Ok((current, stats))
    }

    /// Read `input`, filter it, and write the survivors to `output`.
    /// Nothing is written unless every stage succeeds.
    pub fn run_paths(&self, input: &Path, output: &Path) -> Result<ProcessingStats, PipelineError> {
        let start_time = Instant::now();

        let table = self.source.read_path(input)?;
        debug!(path = %input.display(), rows = table.len(), columns = table.schema.len(), "loaded table");

        let (table, mut stats) = self.process(table)?;
        self.sink.write_path(&table, output)?;

        stats.output_path = Some(output.to_path_buf());
        stats.processing_time = start_time.elapsed();
        info!(
            rows = stats.rows_written,
            path = %output.display(),
            "filtered data saved"
        );
        Ok(stats)
    }
}

/// Filter the table at `input` with `spec` and write the result to `output`
pub fn run(input: &Path, output: &Path, spec: &FilterSpec) -> Result<ProcessingStats, PipelineError> {
    FilterPipeline::from_spec(spec)?.run_paths(input, output)
}

/// Run a complete job description, honouring its delimiter
pub fn run_job(config: &PipelineConfig) -> Result<ProcessingStats, PipelineError> {
    let delimiter = config.delimiter_byte()?;
    FilterPipeline::from_spec(&config.filters)?
        .with_delimiter(delimiter)
        .run_paths(&config.input, &config.output)
}
