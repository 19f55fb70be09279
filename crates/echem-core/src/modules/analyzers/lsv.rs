use crate::common::AnalysisConfig;
use crate::domain::{AnalysisResult, EchemError, ProcessedCycle, RecordKind, SourceRecord};
use crate::modules::points::{OverpotentialPoint, overpotentials_with_config};
use crate::modules::traits::RecordAnalyzer;
use crate::parser::parse_voltammetry_record;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LsvRecordResult {
    pub name: String,
    /// `File:` label from the export, else the file stem.
    pub file_id: String,
    pub sweep: ProcessedCycle,
    pub overpotentials: Vec<OverpotentialPoint>,
}

pub struct LsvAnalyzer<'a> {
    config: &'a AnalysisConfig,
}

impl<'a> LsvAnalyzer<'a> {
    pub fn new(config: &'a AnalysisConfig) -> Self {
        Self { config }
    }
}

impl RecordAnalyzer for LsvAnalyzer<'_> {
    type Output = LsvRecordResult;

    fn kind(&self) -> RecordKind {
        RecordKind::LinearSweepVoltammetry
    }

    fn analyze(&self, record: &SourceRecord) -> AnalysisResult<LsvRecordResult> {
        let parsed = parse_voltammetry_record(&record.text());
        if parsed.samples.is_empty() {
            return Err(EchemError::input_validation(
                "INPUT.LSV_NO_DATA",
                format!("no potential/current samples found in '{}'", record.name),
            ));
        }

        let file_id = parsed.file_id.unwrap_or_else(|| record.stem.clone());
        let sweep = self.config.sample_transform().apply_whole(&parsed.samples);
        let overpotentials = overpotentials_with_config(&sweep, self.config);
        tracing::info!(
            record = %record.name,
            file_id = %file_id,
            samples = sweep.len(),
            "LSV record analyzed"
        );

        Ok(LsvRecordResult {
            name: record.name.clone(),
            file_id,
            sweep,
            overpotentials,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::LsvAnalyzer;
    use crate::common::AnalysisConfig;
    use crate::domain::SourceRecord;
    use crate::modules::traits::RecordAnalyzer;

    const EXPORT: &str = "Linear Sweep Voltammetry\nFile: lsv4\n\nPotential/V, Current/A\n0.40, -0.001\n0.50, -0.010\n0.60, -0.100\n0.70, -0.210\n";

    #[test]
    fn overpotentials_follow_configured_targets() {
        let config = AnalysisConfig::default();
        let record = SourceRecord::new("run 3.txt", EXPORT);

        let result = LsvAnalyzer::new(&config)
            .analyze(&record)
            .expect("LSV record should be analyzed");

        assert_eq!(result.file_id, "lsv4");
        assert_eq!(result.sweep.len(), 4);
        let indices: Vec<Option<usize>> =
            result.overpotentials.iter().map(|p| p.sample_index).collect();
        assert_eq!(indices, vec![Some(1), Some(2), Some(3)]);
        let first = result.overpotentials[0]
            .overpotential_mv
            .expect("overpotential should be present");
        assert!((first - 173.0).abs() <= 1.0e-9);
    }

    #[test]
    fn file_stem_stands_in_for_missing_label() {
        let config = AnalysisConfig::default();
        let record = SourceRecord::new("run 3.txt", EXPORT.replace("File: lsv4\n", ""));

        let result = LsvAnalyzer::new(&config)
            .analyze(&record)
            .expect("LSV record should be analyzed");
        assert_eq!(result.file_id, "run 3");
    }

    #[test]
    fn record_without_samples_is_rejected() {
        let config = AnalysisConfig::default();
        let record = SourceRecord::new("blank.txt", "Linear Sweep Voltammetry\n");
        let error = LsvAnalyzer::new(&config)
            .analyze(&record)
            .expect_err("empty record should be rejected");
        assert_eq!(error.placeholder(), "INPUT.LSV_NO_DATA");
    }
}
