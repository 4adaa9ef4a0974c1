// src/lib.rs
pub mod error;
pub mod input_format;
pub mod output_format;
pub mod pipeline;
pub mod table;

pub use error::*;
pub use pipeline::*;

pub use input_format::CsvSource;
pub use output_format::CsvSink;
pub use pipeline::config::{FilterSpec, PipelineConfig, YearCoverage};
pub use pipeline::context::{ProcessingStats, StageReport};
pub use pipeline::stages::{
    Allowlist, DropColumns, EqualityFilter, TableStage, YearBound, YearCoverageFilter,
};
pub use pipeline::stream::{run, run_job, FilterPipeline};
pub use table::{CellValue, Row, Schema, Table};
