use super::CliError;
use super::render::{
    render_cv_table, render_eis_table, render_lsv_table, render_summary, render_tafel_table,
};
use super::serialization::{artifact_file_component, write_text_artifact};
use anyhow::Context;
use echem_core::common::{AnalysisConfig, BatchOptions, ConfigError, load_analysis_config};
use echem_core::domain::{EchemError, SourceRecord};
use echem_core::modules::batch::{BatchReport, SkippedRecord};
use echem_core::modules::traits::BatchObserver;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

pub(super) const DEFAULT_INCLUDE_PATTERN: &str = "*.txt";
pub(super) const OUTPUT_SUBDIR: &str = "processed_data";
const ZVIEW_SUFFIX: &str = "-for ZView.txt";

#[derive(Debug, Clone, Copy, Default)]
pub(super) struct AnalysisOverrides {
    pub(super) cycle_tolerance_v: Option<f64>,
    pub(super) midpoint_potential_v: Option<f64>,
}

pub(super) fn resolve_analysis_config(
    config_path: Option<&Path>,
    overrides: AnalysisOverrides,
) -> Result<AnalysisConfig, CliError> {
    let mut config = match config_path {
        Some(path) => load_analysis_config(path).map_err(config_error)?,
        None => AnalysisConfig::default(),
    };
    if let Some(tolerance) = overrides.cycle_tolerance_v {
        config.cycle_tolerance_v = tolerance;
    }
    if let Some(midpoint) = overrides.midpoint_potential_v {
        config.midpoint_potential_v = midpoint;
    }
    config.validate().map_err(config_error)?;
    Ok(config)
}

fn config_error(error: ConfigError) -> CliError {
    let message = error.to_string();
    let echem_error = match error {
        ConfigError::Read { .. } => EchemError::io_system("IO.CONFIG_READ", message),
        ConfigError::Parse { .. } => EchemError::input_validation("INPUT.CONFIG_PARSE", message),
        ConfigError::Invalid { .. } => {
            EchemError::input_validation("INPUT.CONFIG_INVALID", message)
        }
    };
    CliError::Compute(echem_error)
}

pub(super) fn build_include_set(patterns: &[String]) -> Result<GlobSet, CliError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .case_insensitive(true)
            .literal_separator(true)
            .build()
            .map_err(|error| {
                CliError::Usage(format!("invalid --include pattern '{pattern}': {error}"))
            })?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|error| CliError::Usage(format!("invalid --include patterns: {error}")))
}

/// Top-level files of `folder` whose names match `include`, sorted by path.
pub(super) fn discover_input_files(folder: &Path, include: &GlobSet) -> Result<Vec<PathBuf>, CliError> {
    if !folder.is_dir() {
        return Err(CliError::Compute(EchemError::input_validation(
            "INPUT.CLI_FOLDER",
            format!("'{}' is not a directory", folder.display()),
        )));
    }

    let entries = fs::read_dir(folder)
        .with_context(|| format!("failed to list input folder '{}'", folder.display()))?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry
            .with_context(|| format!("failed to read entry in '{}'", folder.display()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let matched = path
            .file_name()
            .is_some_and(|name| include.is_match(Path::new(name)));
        if matched {
            files.push(path);
        } else {
            tracing::debug!(path = %path.display(), "file does not match include patterns");
        }
    }
    files.sort();
    Ok(files)
}

fn record_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub(super) fn read_source_record(path: &Path) -> Result<SourceRecord, CliError> {
    let bytes =
        fs::read(path).with_context(|| format!("failed to read '{}'", path.display()))?;
    Ok(SourceRecord::new(record_name(path), bytes))
}

/// Reads every file of a batch; a file that cannot be read is returned as
/// skipped instead of failing the run.
pub(super) fn read_batch_records(files: &[PathBuf]) -> (Vec<SourceRecord>, Vec<SkippedRecord>) {
    let mut records = Vec::with_capacity(files.len());
    let mut unreadable = Vec::new();
    for path in files {
        match fs::read(path) {
            Ok(bytes) => records.push(SourceRecord::new(record_name(path), bytes)),
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "input file skipped: unreadable");
                unreadable.push(SkippedRecord::unreadable(
                    record_name(path),
                    format!("failed to read file: {error}"),
                ));
            }
        }
    }
    (records, unreadable)
}

/// Final path component of `folder`, used to prefix artifact names.
pub(super) fn folder_label(folder: &Path) -> Result<String, CliError> {
    let resolved = fs::canonicalize(folder)
        .with_context(|| format!("failed to resolve folder '{}'", folder.display()))?;
    Ok(resolved
        .file_name()
        .map(|name| artifact_file_component(&name.to_string_lossy()))
        .unwrap_or_else(|| "batch".to_string()))
}

/// Progress bar over the records of one batch.
pub(super) struct ProgressObserver {
    bar: ProgressBar,
}

impl ProgressObserver {
    pub(super) fn new(total: usize) -> Self {
        let bar = ProgressBar::new(total as u64);
        match ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}") {
            Ok(style) => bar.set_style(style.progress_chars("=> ")),
            Err(error) => tracing::debug!(%error, "using default progress style"),
        }
        Self { bar }
    }
}

impl BatchObserver for ProgressObserver {
    fn record_started(&self, index: usize, _total: usize, name: &str) {
        self.bar.set_position(index as u64);
        self.bar.set_message(name.to_string());
    }

    fn record_skipped(&self, name: &str, reason: &str) {
        self.bar.println(format!("skipped {name}: {reason}"));
    }

    fn batch_finished(&self) {
        self.bar.finish_and_clear();
    }
}

/// Returns `{stem}{suffix}`, or `{stem}-2{suffix}`, `{stem}-3{suffix}` and so
/// on when an earlier artifact of the run already took the name.
fn claim_artifact_name(names: &mut BTreeSet<String>, stem: &str, suffix: &str) -> String {
    let mut name = format!("{stem}{suffix}");
    let mut counter = 2_usize;
    while !names.insert(name.clone()) {
        name = format!("{stem}-{counter}{suffix}");
        counter += 1;
    }
    name
}

/// Writes every artifact of `report` into `output_dir` and returns their paths.
pub(super) fn write_batch_artifacts(
    output_dir: &Path,
    label: &str,
    report: &BatchReport,
    options: BatchOptions,
) -> Result<Vec<PathBuf>, CliError> {
    fs::create_dir_all(output_dir).with_context(|| {
        format!("failed to create output directory '{}'", output_dir.display())
    })?;

    let mut names = BTreeSet::new();
    let mut artifacts: Vec<(String, String)> = Vec::new();
    let report_json = serde_json::to_string_pretty(report)
        .context("failed to serialize analysis report")?;
    artifacts.push((
        claim_artifact_name(&mut names, &format!("{label}_analysis_report"), ".json"),
        report_json,
    ));
    artifacts.push((
        claim_artifact_name(&mut names, &format!("{label}_summary"), ".txt"),
        render_summary(label, report),
    ));

    let tables = [
        ("cv_cycles", render_cv_table(report)),
        ("lsv_data", render_lsv_table(report)),
        ("eis_data", render_eis_table(report)),
    ];
    for (suffix, table) in tables {
        if let Some(table) = table {
            let name = claim_artifact_name(&mut names, &format!("{label}_{suffix}"), ".csv");
            artifacts.push((name, table));
        }
    }
    for dataset in &report.tafel {
        let id = artifact_file_component(&dataset.source_id);
        let name = claim_artifact_name(&mut names, &format!("{label}_tafel_{id}"), ".csv");
        artifacts.push((name, render_tafel_table(dataset)));
    }
    if options.export_zview {
        for result in &report.eis {
            let stem = artifact_file_component(&result.file_id);
            let name = claim_artifact_name(&mut names, &stem, ZVIEW_SUFFIX);
            artifacts.push((name, result.zview_text.clone()));
        }
    }

    let mut written = Vec::with_capacity(artifacts.len());
    for (file_name, content) in artifacts {
        let path = output_dir.join(file_name);
        write_text_artifact(&path, &content)
            .with_context(|| format!("failed to write artifact '{}'", path.display()))?;
        tracing::info!(path = %path.display(), "artifact written");
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::{
        AnalysisOverrides, build_include_set, claim_artifact_name, discover_input_files,
        read_batch_records, resolve_analysis_config, write_batch_artifacts,
    };
    use crate::cli::CliError;
    use echem_core::common::{AnalysisConfig, BatchOptions};
    use echem_core::domain::SourceRecord;
    use echem_core::modules::batch::BatchAnalyzer;
    use echem_core::modules::traits::SilentObserver;
    use std::collections::BTreeSet;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn include_patterns_match_case_insensitively() {
        let temp = TempDir::new().expect("tempdir should be created");
        for name in ["b.TXT", "a.txt", "notes.csv"] {
            fs::write(temp.path().join(name), "x").expect("file should be written");
        }
        fs::create_dir(temp.path().join("nested.txt")).expect("dir should be created");

        let include = build_include_set(&["*.txt".to_string()]).expect("pattern should compile");
        let files = discover_input_files(temp.path(), &include).expect("folder should be listed");
        let names: Vec<String> = files
            .iter()
            .filter_map(|path| path.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .collect();

        assert_eq!(names, vec!["a.txt".to_string(), "b.TXT".to_string()]);
    }

    #[test]
    fn missing_folder_is_an_input_error() {
        let temp = TempDir::new().expect("tempdir should be created");
        let include = build_include_set(&["*.txt".to_string()]).expect("pattern should compile");
        let error = discover_input_files(&temp.path().join("absent"), &include)
            .expect_err("missing folder should fail");

        match error {
            CliError::Compute(error) => assert_eq!(error.placeholder(), "INPUT.CLI_FOLDER"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn flag_overrides_are_validated() {
        let overrides = AnalysisOverrides {
            cycle_tolerance_v: Some(-1.0),
            midpoint_potential_v: None,
        };
        let error = resolve_analysis_config(None, overrides).expect_err("negative tolerance");
        match error {
            CliError::Compute(error) => assert_eq!(error.placeholder(), "INPUT.CONFIG_INVALID"),
            other => panic!("unexpected error: {other}"),
        }

        let overrides = AnalysisOverrides {
            cycle_tolerance_v: Some(0.005),
            midpoint_potential_v: Some(0.8),
        };
        let config = resolve_analysis_config(None, overrides).expect("overrides should apply");
        assert_eq!(config.cycle_tolerance_v, 0.005);
        assert_eq!(config.midpoint_potential_v, 0.8);
    }

    #[test]
    fn unreadable_file_is_skipped_not_fatal() {
        let temp = TempDir::new().expect("tempdir should be created");
        let good = temp.path().join("a.txt");
        fs::write(&good, "A.C. Impedance").expect("file should be written");
        let missing = temp.path().join("gone.txt");

        let (records, unreadable) = read_batch_records(&[good, missing]);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "a.txt");
        assert_eq!(unreadable.len(), 1);
        assert_eq!(unreadable[0].name, "gone.txt");
        assert_eq!(unreadable[0].placeholder, "IO.READ");
        assert!(unreadable[0].reason.starts_with("failed to read file:"));
    }

    #[test]
    fn repeated_artifact_names_get_numbered_suffixes() {
        let mut names = BTreeSet::new();
        assert_eq!(claim_artifact_name(&mut names, "run_tafel_x", ".csv"), "run_tafel_x.csv");
        assert_eq!(claim_artifact_name(&mut names, "run_tafel_x", ".csv"), "run_tafel_x-2.csv");
        assert_eq!(claim_artifact_name(&mut names, "run_tafel_x", ".csv"), "run_tafel_x-3.csv");
        assert_eq!(claim_artifact_name(&mut names, "run_tafel_y", ".csv"), "run_tafel_y.csv");
    }

    #[test]
    fn tafel_tables_with_the_same_label_are_all_written() {
        let export = |current: &str| {
            format!(
                "Linear Sweep Voltammetry\nFile: lsv_a\nPotential/V, Current/A\n0.40, -0.001\n0.50, {current}\n"
            )
        };
        let config = AnalysisConfig::default();
        let records = [
            SourceRecord::new("a.txt", export("-0.010")),
            SourceRecord::new("b.txt", export("-0.020")),
        ];
        let report = BatchAnalyzer::new(&config)
            .run(&records, &SilentObserver)
            .expect("batch should succeed");
        let temp = TempDir::new().expect("tempdir should be created");
        let options = BatchOptions {
            show_progress: false,
            export_zview: false,
        };

        let written = write_batch_artifacts(temp.path(), "run", &report, options)
            .expect("artifacts should be written");

        let first = temp.path().join("run_tafel_lsv_a.csv");
        let second = temp.path().join("run_tafel_lsv_a-2.csv");
        assert!(written.contains(&first));
        assert!(written.contains(&second));
        let on_disk = fs::read_dir(temp.path()).expect("output dir should list").count();
        assert_eq!(on_disk, written.len());
        assert_ne!(
            fs::read(&first).expect("first table should exist"),
            fs::read(&second).expect("second table should exist")
        );
    }
}
