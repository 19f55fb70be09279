//! Folder-level pipeline: classify every record, analyze it in isolation and
//! fold the per-file results into capacitance, Tafel and summary tables.

use crate::common::AnalysisConfig;
use crate::domain::{AnalysisResult, EchemError, RecordKind, SourceRecord};
use crate::modules::analyzers::{
    CvAnalyzer, CvRecordResult, EisAnalyzer, EisRecordResult, LsvAnalyzer, LsvRecordResult,
};
use crate::modules::capacitance::{CapacitanceAnalysis, analyze_capacitance};
use crate::modules::points::OverpotentialPoint;
use crate::modules::tafel::{TafelDataset, TafelTransformer, distinct_resistances};
use crate::modules::traits::{BatchObserver, RecordAnalyzer};
use crate::parser::classify_record;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRecord {
    pub name: String,
    pub kind: Option<RecordKind>,
    pub placeholder: &'static str,
    pub reason: String,
}

impl SkippedRecord {
    /// A file that never reached classification because it could not be read.
    pub fn unreadable(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: None,
            placeholder: "IO.READ",
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverpotentialRow {
    pub file_id: String,
    pub points: Vec<OverpotentialPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResistanceRow {
    pub file_id: String,
    pub solution_resistance_ohm: Option<f64>,
}

/// The condensed table printed at the end of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub overpotentials: Vec<OverpotentialRow>,
    pub solution_resistances: Vec<ResistanceRow>,
    pub cdl_mf_cm2: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub cv: Vec<CvRecordResult>,
    pub lsv: Vec<LsvRecordResult>,
    pub eis: Vec<EisRecordResult>,
    pub capacitance: CapacitanceAnalysis,
    pub resistances_ohm: Vec<f64>,
    pub tafel: Vec<TafelDataset>,
    pub summary: BatchSummary,
    pub unclassified: Vec<String>,
    pub skipped: Vec<SkippedRecord>,
}

impl BatchReport {
    pub fn analyzed_count(&self) -> usize {
        self.cv.len() + self.lsv.len() + self.eis.len()
    }
}

pub struct BatchAnalyzer<'a> {
    config: &'a AnalysisConfig,
}

impl<'a> BatchAnalyzer<'a> {
    pub fn new(config: &'a AnalysisConfig) -> Self {
        Self { config }
    }

    /// Runs every record through its analyzer.
    ///
    /// A record that fails to parse or lacks required metadata lands in
    /// `skipped` and never affects the others. Only an empty input set, or a
    /// set where nothing is recognised, is an error.
    pub fn run(
        &self,
        records: &[SourceRecord],
        observer: &dyn BatchObserver,
    ) -> AnalysisResult<BatchReport> {
        self.run_with_unreadable(records, Vec::new(), observer)
    }

    /// Same as [`run`](Self::run), with files that failed to load carried
    /// into `skipped` ahead of the analyzed records.
    pub fn run_with_unreadable(
        &self,
        records: &[SourceRecord],
        unreadable: Vec<SkippedRecord>,
        observer: &dyn BatchObserver,
    ) -> AnalysisResult<BatchReport> {
        if records.is_empty() && unreadable.is_empty() {
            return Err(EchemError::io_system(
                "IO.NO_INPUT_FILES",
                "no input files to analyze",
            ));
        }

        let cv_analyzer = CvAnalyzer::new(self.config);
        let lsv_analyzer = LsvAnalyzer::new(self.config);
        let mut cv = Vec::new();
        let mut lsv = Vec::new();
        let mut eis = Vec::new();
        let mut unclassified = Vec::new();
        let mut skipped = unreadable;

        for (index, record) in records.iter().enumerate() {
            observer.record_started(index, records.len(), &record.name);
            let Some(kind) = classify_record(&record.bytes, self.config.sniff_bytes) else {
                tracing::debug!(record = %record.name, "record not recognised; ignoring");
                unclassified.push(record.name.clone());
                continue;
            };

            let outcome = match kind {
                RecordKind::CyclicVoltammetry => collect(&cv_analyzer, record, &mut cv),
                RecordKind::LinearSweepVoltammetry => collect(&lsv_analyzer, record, &mut lsv),
                RecordKind::Impedance => collect(&EisAnalyzer, record, &mut eis),
            };
            if let Err(error) = outcome {
                tracing::warn!(
                    record = %record.name,
                    kind = kind.as_str(),
                    placeholder = error.placeholder(),
                    "record excluded: {}",
                    error.message()
                );
                observer.record_skipped(&record.name, error.message());
                skipped.push(SkippedRecord {
                    name: record.name.clone(),
                    kind: Some(kind),
                    placeholder: error.placeholder(),
                    reason: error.message().to_string(),
                });
            }
        }
        observer.batch_finished();

        if cv.is_empty() && lsv.is_empty() && eis.is_empty() && skipped.is_empty() {
            return Err(EchemError::input_validation(
                "INPUT.NO_RECOGNISED_RECORDS",
                format!(
                    "none of the {} input files is a CV, LSV or impedance export",
                    records.len()
                ),
            ));
        }

        cv.sort_by_key(|result: &CvRecordResult| result.scan_rate_mv_per_s);
        let capacitance = analyze_capacitance(
            cv.iter().map(CvRecordResult::capacitance_point),
            self.config.capacitance_scale,
        );

        let resistances_ohm =
            distinct_resistances(eis.iter().filter_map(EisRecordResult::solution_resistance_ohm));
        let transformer = TafelTransformer::from_config(self.config);
        let tafel = lsv
            .iter()
            .map(|result: &LsvRecordResult| {
                transformer.transform(result.file_id.clone(), &result.sweep, &resistances_ohm)
            })
            .collect();

        let summary = BatchSummary {
            overpotentials: lsv
                .iter()
                .map(|result| OverpotentialRow {
                    file_id: result.file_id.clone(),
                    points: result.overpotentials.clone(),
                })
                .collect(),
            solution_resistances: eis
                .iter()
                .map(|result| ResistanceRow {
                    file_id: result.file_id.clone(),
                    solution_resistance_ohm: result.solution_resistance_ohm(),
                })
                .collect(),
            cdl_mf_cm2: capacitance.cdl_mf_cm2,
        };

        tracing::info!(
            cv = cv.len(),
            lsv = lsv.len(),
            eis = eis.len(),
            skipped = skipped.len(),
            unclassified = unclassified.len(),
            "batch analysis finished"
        );

        Ok(BatchReport {
            cv,
            lsv,
            eis,
            capacitance,
            resistances_ohm,
            tafel,
            summary,
            unclassified,
            skipped,
        })
    }
}

fn collect<A: RecordAnalyzer>(
    analyzer: &A,
    record: &SourceRecord,
    results: &mut Vec<A::Output>,
) -> AnalysisResult<()> {
    results.push(analyzer.analyze(record)?);
    Ok(())
}
