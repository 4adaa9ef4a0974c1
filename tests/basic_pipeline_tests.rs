// tests/basic_pipeline_tests.rs
use std::io::Cursor;
use tabclean::{
    CellValue, CsvSink, CsvSource, FilterPipeline, FilterSpec, PipelineConfig, PipelineError,
    StageReport, Table, TableStage, YearBound, YearCoverage,
};

fn load(csv: &str) -> Table {
    CsvSource::default().read(Cursor::new(csv)).unwrap()
}

fn render(table: &Table) -> String {
    let mut out = Vec::new();
    CsvSink::default().write(table, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

/// Keeps every other row; only used to show custom stages slot in
struct EveryOther;

impl TableStage for EveryOther {
    fn name(&self) -> &str {
        "every_other"
    }

    fn apply(&self, table: Table, _report: &mut StageReport) -> Result<Table, PipelineError> {
        let mut n = 0;
        Ok(table.filter_rows(|_| {
            n += 1;
            n % 2 == 1
        }))
    }
}

#[test]
fn test_basic_year_bound() {
    println!("=== Testing Basic Pipeline: year bound ===");

    let mut pipeline = FilterPipeline::new();
    pipeline.add_stage(Box::new(YearBound::new("Year", 2020)));

    let table = load("Country,Year\nPeru,2020\nPeru,2021\n");
    let (out, stats) = pipeline.process(table).unwrap();

    assert_eq!(stats.rows_read, 2);
    assert_eq!(stats.rows_written, 1);
    assert_eq!(render(&out), "Country,Year\nPeru,2020\n");
    println!("✓ Year bound works");
}

#[test]
fn test_custom_stage_runs_in_order() {
    println!("=== Testing Basic Pipeline: custom stage ===");

    let mut pipeline = FilterPipeline::new();
    pipeline.add_stage(Box::new(EveryOther));
    pipeline.add_stage(Box::new(YearBound::new("Year", 2015)));

    let table = load("Country,Year\nA,2010\nB,2011\nC,2020\nD,2012\n");
    let (out, stats) = pipeline.process(table).unwrap();

    assert_eq!(render(&out), "Country,Year\nA,2010\n");
    assert_eq!(stats.stages[0].rows_out, 2);
    assert_eq!(stats.stages[1].rows_dropped(), 1);
    println!("✓ Custom stage works");
}

#[test]
fn test_numeric_equality_filter() {
    let spec = FilterSpec::default().with_equality("Year", CellValue::Integer(2015));
    let pipeline = FilterPipeline::from_spec(&spec).unwrap();

    let table = load("Country,Year\nPeru,2015\nPeru,2015.0\nPeru,2016\n");
    let (out, _) = pipeline.process(table).unwrap();

    assert_eq!(out.len(), 2);
}

#[test]
fn test_text_filter_keeps_numeric_looking_cells() {
    println!("=== Testing Basic Pipeline: text filter on numeric-looking cells ===");

    let csv = "Measure,Year\n001,2010\nabc,2011\n2015,2012\n";

    let spec = FilterSpec::default().with_equality("Measure", CellValue::Text("001".into()));
    let (out, _) = FilterPipeline::from_spec(&spec).unwrap().process(load(csv)).unwrap();
    assert_eq!(render(&out), "Measure,Year\n001,2010\n");

    let job = PipelineConfig::from_yaml_str(
        "input: in.csv\noutput: out.csv\nfilters:\n  equality_filters:\n    Measure: \"2015\"\n",
    )
    .unwrap();
    let (out, _) = FilterPipeline::from_spec(&job.filters)
        .unwrap()
        .process(load(csv))
        .unwrap();
    assert_eq!(render(&out), "Measure,Year\n2015,2012\n");
    println!("✓ Quoted filter values match cells byte for byte");
}

#[test]
fn test_all_groups_failing_leaves_header_only() {
    let spec = FilterSpec::default()
        .with_required_years(YearCoverage::range(2010, 2020))
        .with_drop_columns(["Flags"]);
    let pipeline = FilterPipeline::from_spec(&spec).unwrap();

    let table = load("Country,Year,Flags\nPeru,2015,\nChile,2016,E\n");
    let (out, stats) = pipeline.process(table).unwrap();

    assert!(out.is_empty());
    assert_eq!(render(&out), "Country,Year\n");
    assert_eq!(stats.stage("year_coverage").unwrap().groups_dropped, Some(2));
}

#[test]
fn test_custom_group_and_year_columns() {
    let mut spec = FilterSpec::default()
        .with_max_year(2020)
        .with_allowlist(["JPN"])
        .with_required_years(YearCoverage::range(2019, 2020));
    spec.year_column = "TIME".to_string();
    spec.group_column = "LOCATION".to_string();
    let pipeline = FilterPipeline::from_spec(&spec).unwrap();

    let table = load("LOCATION,TIME\nJPN,2019\nJPN,2020\nJPN,2021\nKOR,2019\nKOR,2020\n");
    let (out, _) = pipeline.process(table).unwrap();

    assert_eq!(render(&out), "LOCATION,TIME\nJPN,2019\nJPN,2020\n");
}
