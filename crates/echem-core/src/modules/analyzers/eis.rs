use crate::domain::{AnalysisResult, EchemError, RecordKind, SourceRecord};
use crate::modules::crossover::{CrossoverResult, locate_solution_resistance};
use crate::modules::traits::RecordAnalyzer;
use crate::parser::scan_impedance_block;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EisRecordResult {
    pub name: String,
    pub file_id: String,
    pub frequencies_hz: Vec<f64>,
    pub z_real_ohm: Vec<f64>,
    pub minus_z_imag_ohm: Vec<f64>,
    pub crossover: CrossoverResult,
    #[serde(skip)]
    pub zview_text: String,
}

impl EisRecordResult {
    pub fn solution_resistance_ohm(&self) -> Option<f64> {
        self.crossover.solution_resistance_ohm
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EisAnalyzer;

impl RecordAnalyzer for EisAnalyzer {
    type Output = EisRecordResult;

    fn kind(&self) -> RecordKind {
        RecordKind::Impedance
    }

    fn analyze(&self, record: &SourceRecord) -> AnalysisResult<EisRecordResult> {
        let text = record.text();
        let block = scan_impedance_block(&text);
        if block.spectrum.is_empty() {
            let reason = if block.header_found {
                "impedance header has no data rows"
            } else {
                "no impedance column header"
            };
            return Err(EchemError::input_validation(
                "INPUT.EIS_NO_DATA",
                format!("{reason} in '{}'", record.name),
            ));
        }

        let z_real_ohm = block.spectrum.z_real();
        let minus_z_imag_ohm = block.spectrum.minus_z_imag();
        let crossover = locate_solution_resistance(&z_real_ohm, &minus_z_imag_ohm);
        tracing::info!(
            record = %record.name,
            points = block.spectrum.len(),
            rs_ohm = ?crossover.solution_resistance_ohm,
            "impedance record analyzed"
        );

        Ok(EisRecordResult {
            name: record.name.clone(),
            file_id: record.stem.clone(),
            frequencies_hz: block.spectrum.frequencies().to_vec(),
            zview_text: block.zview_text(),
            z_real_ohm,
            minus_z_imag_ohm,
            crossover,
        })
    }
}
