use crate::common::AnalysisConfig;
use crate::domain::{AnalysisResult, EchemError, ProcessedCycle, RecordKind, SourceRecord};
use crate::modules::capacitance::CapacitancePoint;
use crate::modules::cycle::{CycleBoundaries, CycleSegmenter};
use crate::modules::points::{MidpointResult, find_midpoint_currents};
use crate::modules::traits::RecordAnalyzer;
use crate::parser::parse_voltammetry_record;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CvRecordResult {
    pub name: String,
    pub file_id: Option<String>,
    pub scan_rate_mv_per_s: u32,
    pub sample_count: usize,
    pub boundaries: CycleBoundaries,
    pub cycle: ProcessedCycle,
    pub midpoint: MidpointResult,
}

impl CvRecordResult {
    pub fn delta_j(&self) -> Option<f64> {
        self.midpoint.delta_j()
    }

    pub fn capacitance_point(&self) -> CapacitancePoint {
        CapacitancePoint {
            scan_rate_mv_per_s: self.scan_rate_mv_per_s,
            delta_j_ma_cm2: self.delta_j(),
        }
    }
}

pub struct CvAnalyzer<'a> {
    config: &'a AnalysisConfig,
}

impl<'a> CvAnalyzer<'a> {
    pub fn new(config: &'a AnalysisConfig) -> Self {
        Self { config }
    }
}

impl RecordAnalyzer for CvAnalyzer<'_> {
    type Output = CvRecordResult;

    fn kind(&self) -> RecordKind {
        RecordKind::CyclicVoltammetry
    }

    fn analyze(&self, record: &SourceRecord) -> AnalysisResult<CvRecordResult> {
        let parsed = parse_voltammetry_record(&record.text());
        if parsed.samples.is_empty() {
            return Err(EchemError::input_validation(
                "INPUT.CV_NO_DATA",
                format!("no potential/current samples found in '{}'", record.name),
            ));
        }
        let Some(scan_rate_mv_per_s) = parsed.metadata.scan_rate_mv_per_s else {
            return Err(EchemError::input_validation(
                "INPUT.CV_SCAN_RATE",
                format!("no scan rate found in '{}'", record.name),
            ));
        };

        let segmenter = CycleSegmenter::from_config(self.config);
        let (boundaries, cycle) =
            segmenter.last_complete_cycle(&parsed.samples, self.config.sample_transform());
        let midpoint = find_midpoint_currents(
            &cycle,
            self.config.midpoint_potential_v,
            self.config.midpoint_tolerance_v,
        );
        tracing::info!(
            record = %record.name,
            scan_rate_mv_per_s,
            samples = parsed.samples.len(),
            cycle_samples = cycle.len(),
            delta_j = ?midpoint.delta_j(),
            "CV record analyzed"
        );

        Ok(CvRecordResult {
            name: record.name.clone(),
            file_id: parsed.file_id,
            scan_rate_mv_per_s,
            sample_count: parsed.samples.len(),
            boundaries,
            cycle,
            midpoint,
        })
    }
}
