use crate::common::AnalysisConfig;
use crate::domain::ProcessedCycle;
use serde::Serialize;

const MILLIAMP_TO_AMP: f64 = 1.0e-3;

/// Tafel coordinates for one sweep.
///
/// `log_j` holds log10 of |j| in A·cm⁻², NaN where j is exactly zero.
/// `overpotentials_v[k]` is the resistance-corrected overpotential column for
/// `resistances_ohm[k]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TafelDataset {
    pub source_id: String,
    pub resistances_ohm: Vec<f64>,
    pub log_j: Vec<f64>,
    pub overpotentials_v: Vec<Vec<f64>>,
}

impl TafelDataset {
    pub fn column_count(&self) -> usize {
        1 + self.overpotentials_v.len()
    }

    pub fn len(&self) -> usize {
        self.log_j.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log_j.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TafelTransformer {
    pub reference_potential_v: f64,
    pub resistance_correction_scale: f64,
}

impl TafelTransformer {
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            reference_potential_v: config.reference_potential_v,
            resistance_correction_scale: config.resistance_correction_scale,
        }
    }

    pub fn transform(
        &self,
        source_id: impl Into<String>,
        sweep: &ProcessedCycle,
        resistances_ohm: &[f64],
    ) -> TafelDataset {
        let log_j = sweep
            .current_densities()
            .iter()
            .map(|&j_ma| log_current_density(j_ma))
            .collect();

        let overpotentials_v = resistances_ohm
            .iter()
            .map(|&resistance| {
                sweep
                    .potentials()
                    .iter()
                    .zip(sweep.current_densities())
                    .map(|(&potential, &j_ma)| {
                        ((potential - self.reference_potential_v)
                            - j_ma * resistance * self.resistance_correction_scale)
                            .abs()
                    })
                    .collect()
            })
            .collect();

        TafelDataset {
            source_id: source_id.into(),
            resistances_ohm: resistances_ohm.to_vec(),
            log_j,
            overpotentials_v,
        }
    }
}

/// log10 of |j| after mA → A conversion; exactly zero maps to NaN.
pub fn log_current_density(j_ma_cm2: f64) -> f64 {
    if j_ma_cm2 == 0.0 {
        return f64::NAN;
    }
    (j_ma_cm2 * MILLIAMP_TO_AMP).abs().log10()
}

/// Finite resistances in ascending order with exact duplicates removed.
pub fn distinct_resistances(values: impl IntoIterator<Item = f64>) -> Vec<f64> {
    let mut distinct: Vec<f64> = values.into_iter().filter(|value| value.is_finite()).collect();
    distinct.sort_by(f64::total_cmp);
    distinct.dedup();
    distinct
}
