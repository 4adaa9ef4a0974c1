// src/pipeline/context.rs
use std::path::PathBuf;
use std::time::Duration;

/// Row counts observed around a single stage
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageReport {
    pub stage: String,
    pub rows_in: usize,
    pub rows_out: usize,
    /// Only set by group-level stages
    pub groups_kept: Option<usize>,
    pub groups_dropped: Option<usize>,
}

impl StageReport {
    pub fn new(stage: &str) -> Self {
        StageReport {
            stage: stage.to_string(),
            ..Default::default()
        }
    }

    pub fn rows_dropped(&self) -> usize {
        self.rows_in.saturating_sub(self.rows_out)
    }
}

/// Runtime statistics for one pipeline run
#[derive(Debug, Default, Clone)]
pub struct ProcessingStats {
    pub rows_read: usize,
    pub rows_written: usize,
    pub columns_written: usize,
    pub stages: Vec<StageReport>,
    pub output_path: Option<PathBuf>,
    pub processing_time: Duration,
}

impl ProcessingStats {
    pub fn rows_dropped(&self) -> usize {
        self.rows_read.saturating_sub(self.rows_written)
    }

    pub fn stage(&self, name: &str) -> Option<&StageReport> {
        self.stages.iter().find(|s| s.stage == name)
    }
}
