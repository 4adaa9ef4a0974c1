// src/pipeline/presets.rs - the built-in dataset cleaning jobs
use crate::error::PipelineError;
use crate::pipeline::config::{FilterSpec, PipelineConfig, YearCoverage};
use crate::table::CellValue;

/// Bookkeeping columns that never make it into a cleaned dataset
pub const METADATA_COLUMNS: [&str; 6] = ["VAR", "UNIT", "COU", "YEA", "Flag Codes", "Flags"];

pub const MAX_YEAR: i64 = 2020;
pub const FIRST_REQUIRED_YEAR: i64 = 2010;

pub const PREVENTABLE_MORTALITY: &str = "preventable-mortality";
pub const HEALTH_SOCIAL_EMPLOYMENT: &str = "health-social-employment";

pub const PRESET_NAMES: [&str; 2] = [PREVENTABLE_MORTALITY, HEALTH_SOCIAL_EMPLOYMENT];

const MORTALITY_COUNTRIES: [&str; 9] = [
    "Mexico",
    "Peru",
    "Lithuania",
    "Israel",
    "Austria",
    "Estonia",
    "United States",
    "Latvia",
    "Australia",
];

fn base_spec(measure: &str) -> FilterSpec {
    FilterSpec::default()
        .with_equality("Measure", CellValue::Text(measure.to_string()))
        .with_max_year(MAX_YEAR)
        .with_required_years(YearCoverage::range(FIRST_REQUIRED_YEAR, MAX_YEAR))
        .with_drop_columns(METADATA_COLUMNS)
}

pub fn preventable_mortality_spec() -> FilterSpec {
    base_spec("Deaths per 100 000 population (standardised rates)")
        .with_equality("Variable", CellValue::Text("Preventable mortality".to_string()))
        .with_allowlist(MORTALITY_COUNTRIES)
}

pub fn health_social_employment_spec() -> FilterSpec {
    base_spec("% of total civilian employment")
}

pub fn preventable_mortality() -> PipelineConfig {
    PipelineConfig::new(
        "Dataset1_PreventableMortality/preventable_mortality.csv",
        "Dataset1_PreventableMortality/preventable_mortality_cleaned.csv",
        preventable_mortality_spec(),
    )
}

pub fn health_social_employment() -> PipelineConfig {
    PipelineConfig::new(
        "Dataset2_HealthAndSocialEmployment/health_social_employment.csv",
        "Dataset2_HealthAndSocialEmployment/health_social_employment_cleaned.csv",
        health_social_employment_spec(),
    )
}

pub fn preset(name: &str) -> Result<PipelineConfig, PipelineError> {
    match name {
        PREVENTABLE_MORTALITY => Ok(preventable_mortality()),
        HEALTH_SOCIAL_EMPLOYMENT => Ok(health_social_employment()),
        other => Err(PipelineError::Config(format!(
            "unknown preset '{}' (expected one of: {})",
            other,
            PRESET_NAMES.join(", ")
        ))),
    }
}

pub fn all_presets() -> Vec<(&'static str, PipelineConfig)> {
    vec![
        (PREVENTABLE_MORTALITY, preventable_mortality()),
        (HEALTH_SOCIAL_EMPLOYMENT, health_social_employment()),
    ]
}
