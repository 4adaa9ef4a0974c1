use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use tabclean::presets::{self, PRESET_NAMES};
use tabclean::{run_job, PipelineConfig, ProcessingStats};

#[derive(Parser)]
#[command(name = "tabclean")]
#[command(about = "Clean country-by-year CSV datasets with row and group filters")]
#[command(version)]
struct Args {
    /// Built-in job to run (default: run every built-in job)
    #[arg(short = 'p', long = "preset", value_parser = PRESET_NAMES, conflicts_with = "config")]
    preset: Option<String>,

    /// YAML job file describing input, output and filters
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Override the job's input file
    #[arg(short = 'i', long = "input")]
    input_file: Option<PathBuf>,

    /// Override the job's output file
    #[arg(short = 'o', long = "output")]
    output_file: Option<PathBuf>,

    /// Override the field delimiter
    #[arg(short = 'd', long = "delimiter")]
    delimiter: Option<char>,

    /// Debug mode - log every stage
    #[arg(long)]
    debug: bool,

    /// Print per-stage row counts to stderr
    #[arg(long)]
    stats: bool,
}

impl Args {
    fn validate(&self) -> Result<(), String> {
        let single_job = self.preset.is_some() || self.config.is_some();
        let overrides = self.input_file.is_some() || self.output_file.is_some();

        if overrides && !single_job {
            return Err("--input/--output need --preset or --config to pick one job".to_string());
        }
        Ok(())
    }

    fn jobs(&self) -> Result<Vec<(String, PipelineConfig)>> {
        let mut jobs = if let Some(path) = &self.config {
            let job = PipelineConfig::from_file(path)?;
            vec![(path.display().to_string(), job)]
        } else if let Some(name) = &self.preset {
            vec![(name.clone(), presets::preset(name)?)]
        } else {
            presets::all_presets()
                .into_iter()
                .map(|(name, job)| (name.to_string(), job))
                .collect()
        };

        for (_, job) in &mut jobs {
            if let Some(input) = &self.input_file {
                job.input = input.clone();
            }
            if let Some(output) = &self.output_file {
                job.output = output.clone();
            }
            if let Some(delimiter) = self.delimiter {
                job.delimiter = delimiter;
            }
        }
        Ok(jobs)
    }
}

fn init_logging(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let args = Args::parse();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    init_logging(args.debug);

    if let Err(e) = run(&args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let jobs = args.jobs()?;
    if jobs.is_empty() {
        bail!("no jobs to run");
    }

    for (name, job) in jobs {
        info!(job = %name, input = %job.input.display(), "running job");
        let stats = run_job(&job).with_context(|| format!("job '{}' failed", name))?;

        println!(
            "Filtered data saved to '{}' ({} rows)",
            job.output.display(),
            stats.rows_written
        );
        if args.stats {
            print_stats(&name, &stats);
        }
    }
    Ok(())
}

fn print_stats(name: &str, stats: &ProcessingStats) {
    eprintln!("Statistics for {}:", name);
    eprintln!("  Rows read: {}", stats.rows_read);
    for stage in &stats.stages {
        eprint!(
            "  {:<24} {:>8} -> {:<8}",
            stage.stage, stage.rows_in, stage.rows_out
        );
        match (stage.groups_kept, stage.groups_dropped) {
            (Some(kept), Some(dropped)) => {
                eprintln!(" ({} groups kept, {} dropped)", kept, dropped)
            }
            _ => eprintln!(),
        }
    }
    eprintln!("  Rows written: {}", stats.rows_written);
    eprintln!("  Columns written: {}", stats.columns_written);
    eprintln!("  Processing time: {:?}", stats.processing_time);
}
