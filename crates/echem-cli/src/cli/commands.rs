use super::CliError;
use super::helpers::*;
use super::render::render_summary;
use anyhow::Context;
use echem_core::common::BatchOptions;
use echem_core::common::constants::SNIFF_BYTES;
use echem_core::domain::{EchemError, RecordKind, SourceRecord};
use echem_core::modules::analyzers::{CvAnalyzer, EisAnalyzer, LsvAnalyzer};
use echem_core::modules::batch::BatchAnalyzer;
use echem_core::modules::traits::{BatchObserver, RecordAnalyzer, SilentObserver};
use echem_core::parser::classify_record;
use serde::Serialize;
use std::path::PathBuf;

#[derive(clap::Args)]
pub(super) struct ProcessArgs {
    /// Folder holding the instrument exports
    folder: PathBuf,

    /// Potential tolerance for cycle detection (V)
    #[arg(long)]
    tolerance: Option<f64>,

    /// Potential at which Δj is read, after the potential shift (V)
    #[arg(long)]
    midpoint: Option<f64>,

    /// Skip the ZView impedance exports
    #[arg(long)]
    no_zview: bool,

    /// Hide the progress bar
    #[arg(long)]
    no_progress: bool,

    /// Artifact directory [default: <FOLDER>/processed_data]
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// File-name glob selecting exports, case-insensitive (repeatable)
    #[arg(long, value_name = "GLOB", default_value = DEFAULT_INCLUDE_PATTERN)]
    include: Vec<String>,

    /// Analysis config JSON overriding the built-in defaults
    #[arg(long)]
    config: Option<PathBuf>,
}

impl ProcessArgs {
    fn overrides(&self) -> AnalysisOverrides {
        AnalysisOverrides {
            cycle_tolerance_v: self.tolerance,
            midpoint_potential_v: self.midpoint,
        }
    }

    fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            show_progress: !self.no_progress,
            export_zview: !self.no_zview,
        }
    }
}

#[derive(clap::Args)]
pub(super) struct ClassifyArgs {
    /// Export files to classify
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Leading bytes searched for record markers
    #[arg(long, default_value_t = SNIFF_BYTES)]
    sniff_bytes: usize,
}

#[derive(clap::Args)]
pub(super) struct InspectArgs {
    /// Export file to analyze
    file: PathBuf,

    /// Record kind (cv, lsv or eis); detected from the header when omitted
    #[arg(long, value_parser = parse_record_kind)]
    kind: Option<RecordKind>,

    /// Analysis config JSON overriding the built-in defaults
    #[arg(long)]
    config: Option<PathBuf>,
}

fn parse_record_kind(token: &str) -> Result<RecordKind, String> {
    RecordKind::parse(token).ok_or_else(|| format!("unknown record kind '{token}'"))
}

pub(super) fn run_process_command(args: ProcessArgs) -> Result<i32, CliError> {
    let config = resolve_analysis_config(args.config.as_deref(), args.overrides())?;
    let options = args.batch_options();
    let include = build_include_set(&args.include)?;

    let files = discover_input_files(&args.folder, &include)?;
    let (records, unreadable) = read_batch_records(&files);
    tracing::info!(
        folder = %args.folder.display(),
        files = records.len(),
        unreadable = unreadable.len(),
        "starting batch analysis"
    );

    let observer: Box<dyn BatchObserver> = if options.show_progress {
        Box::new(ProgressObserver::new(records.len()))
    } else {
        Box::new(SilentObserver)
    };
    let report = BatchAnalyzer::new(&config)
        .run_with_unreadable(&records, unreadable, observer.as_ref())
        .map_err(CliError::Compute)?;

    let label = folder_label(&args.folder)?;
    let output_dir = args
        .output_dir
        .unwrap_or_else(|| args.folder.join(OUTPUT_SUBDIR));
    let written = write_batch_artifacts(&output_dir, &label, &report, options)?;

    print!("{}", render_summary(&label, &report));
    println!(
        "Wrote {} artifacts to {}",
        written.len(),
        output_dir.display()
    );
    Ok(0)
}

pub(super) fn run_classify_command(args: ClassifyArgs) -> Result<i32, CliError> {
    for path in &args.files {
        let record = read_source_record(path)?;
        let kind = classify_record(&record.bytes, args.sniff_bytes)
            .map_or("unclassified", RecordKind::as_str);
        println!("{}\t{}", path.display(), kind);
    }
    Ok(0)
}

pub(super) fn run_inspect_command(args: InspectArgs) -> Result<i32, CliError> {
    let config = resolve_analysis_config(args.config.as_deref(), AnalysisOverrides::default())?;
    let record = read_source_record(&args.file)?;

    let kind = match args.kind {
        Some(kind) => kind,
        None => classify_record(&record.bytes, config.sniff_bytes).ok_or_else(|| {
            CliError::Compute(EchemError::input_validation(
                "INPUT.UNCLASSIFIED",
                format!(
                    "'{}' is not a recognised CV, LSV or impedance export; pass --kind",
                    args.file.display()
                ),
            ))
        })?,
    };

    let json = match kind {
        RecordKind::CyclicVoltammetry => analyze_to_json(&CvAnalyzer::new(&config), &record)?,
        RecordKind::LinearSweepVoltammetry => {
            analyze_to_json(&LsvAnalyzer::new(&config), &record)?
        }
        RecordKind::Impedance => analyze_to_json(&EisAnalyzer, &record)?,
    };
    println!("{json}");
    Ok(0)
}

fn analyze_to_json<A>(analyzer: &A, record: &SourceRecord) -> Result<String, CliError>
where
    A: RecordAnalyzer,
    A::Output: Serialize,
{
    let output = analyzer.analyze(record).map_err(CliError::Compute)?;
    let json = serde_json::to_string_pretty(&output)
        .with_context(|| format!("failed to serialize {} result", analyzer.kind()))?;
    Ok(json)
}
