use super::constants::{
    CAPACITANCE_SCALE, CURRENT_SCALE, CYCLE_TOLERANCE_V, MIDPOINT_POTENTIAL_V,
    MIDPOINT_TOLERANCE_V, MIN_CYCLE_SEPARATION, OVERPOTENTIAL_TARGETS_MA_CM2, POTENTIAL_SHIFT_V,
    REFERENCE_POTENTIAL_V, RESISTANCE_CORRECTION_SCALE, SNIFF_BYTES,
};
use crate::domain::SampleTransform;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Tunable parameters for one analysis run.
///
/// Every field has a default, so a JSON config only needs the keys it
/// overrides. The engine never reads ambient state; callers pass this value
/// explicitly to every analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct AnalysisConfig {
    pub cycle_tolerance_v: f64,
    pub min_cycle_separation: usize,
    pub midpoint_potential_v: f64,
    pub midpoint_tolerance_v: f64,
    pub potential_shift_v: f64,
    pub current_scale: f64,
    pub reference_potential_v: f64,
    pub overpotential_targets_ma_cm2: Vec<f64>,
    pub resistance_correction_scale: f64,
    pub capacitance_scale: f64,
    pub sniff_bytes: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            cycle_tolerance_v: CYCLE_TOLERANCE_V,
            min_cycle_separation: MIN_CYCLE_SEPARATION,
            midpoint_potential_v: MIDPOINT_POTENTIAL_V,
            midpoint_tolerance_v: MIDPOINT_TOLERANCE_V,
            potential_shift_v: POTENTIAL_SHIFT_V,
            current_scale: CURRENT_SCALE,
            reference_potential_v: REFERENCE_POTENTIAL_V,
            overpotential_targets_ma_cm2: OVERPOTENTIAL_TARGETS_MA_CM2.to_vec(),
            resistance_correction_scale: RESISTANCE_CORRECTION_SCALE,
            capacitance_scale: CAPACITANCE_SCALE,
            sniff_bytes: SNIFF_BYTES,
        }
    }
}

impl AnalysisConfig {
    pub fn sample_transform(&self) -> SampleTransform {
        SampleTransform {
            potential_shift_v: self.potential_shift_v,
            current_scale: self.current_scale,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("cycleToleranceV", self.cycle_tolerance_v),
            ("midpointToleranceV", self.midpoint_tolerance_v),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be a positive finite number, got {value}"),
                });
            }
        }

        let finite = [
            ("midpointPotentialV", self.midpoint_potential_v),
            ("potentialShiftV", self.potential_shift_v),
            ("currentScale", self.current_scale),
            ("referencePotentialV", self.reference_potential_v),
            ("resistanceCorrectionScale", self.resistance_correction_scale),
            ("capacitanceScale", self.capacitance_scale),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be finite, got {value}"),
                });
            }
        }

        if self.min_cycle_separation == 0 {
            return Err(ConfigError::Invalid {
                field: "minCycleSeparation",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.sniff_bytes == 0 {
            return Err(ConfigError::Invalid {
                field: "sniffBytes",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.overpotential_targets_ma_cm2.is_empty()
            || self
                .overpotential_targets_ma_cm2
                .iter()
                .any(|target| !target.is_finite())
        {
            return Err(ConfigError::Invalid {
                field: "overpotentialTargetsMaCm2",
                reason: "must list at least one finite current density".to_string(),
            });
        }

        Ok(())
    }
}

/// Run-level switches that are not part of the numerical analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    pub show_progress: bool,
    pub export_zview: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            show_progress: false,
            export_zview: true,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read analysis config '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse analysis config '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid analysis config field '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

pub fn load_analysis_config(config_path: impl AsRef<Path>) -> Result<AnalysisConfig, ConfigError> {
    let config_path = config_path.as_ref();
    let source = fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
        path: config_path.to_path_buf(),
        source,
    })?;
    let config: AnalysisConfig =
        serde_json::from_str(&source).map_err(|source| ConfigError::Parse {
            path: config_path.to_path_buf(),
            source,
        })?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::{AnalysisConfig, ConfigError, load_analysis_config};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn partial_json_keeps_defaults_for_missing_fields() {
        let temp = TempDir::new().expect("tempdir should be created");
        let path = temp.path().join("analysis.json");
        fs::write(
            &path,
            r#"{ "cycleToleranceV": 0.002, "overpotentialTargetsMaCm2": [10, 50] }"#,
        )
        .expect("config should be written");

        let config = load_analysis_config(&path).expect("config should load");

        assert_eq!(config.cycle_tolerance_v, 0.002);
        assert_eq!(config.overpotential_targets_ma_cm2, vec![10.0, 50.0]);
        assert_eq!(config.min_cycle_separation, 10);
        assert_eq!(config.potential_shift_v, 0.903);
    }

    #[test]
    fn unknown_keys_are_rejected_as_parse_errors() {
        let temp = TempDir::new().expect("tempdir should be created");
        let path = temp.path().join("analysis.json");
        fs::write(&path, r#"{ "guiMode": true }"#).expect("config should be written");

        let error = load_analysis_config(&path).expect_err("unknown key should fail");
        assert!(matches!(error, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_file_reports_read_error_with_path() {
        let temp = TempDir::new().expect("tempdir should be created");
        let path = temp.path().join("absent.json");

        let error = load_analysis_config(&path).expect_err("missing file should fail");
        assert!(matches!(error, ConfigError::Read { .. }));
        assert!(error.to_string().contains("absent.json"));
    }

    #[test]
    fn validation_rejects_degenerate_values() {
        let config = AnalysisConfig {
            cycle_tolerance_v: 0.0,
            ..AnalysisConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "cycleToleranceV",
                ..
            })
        ));

        let config = AnalysisConfig {
            overpotential_targets_ma_cm2: Vec::new(),
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_err());

        assert!(AnalysisConfig::default().validate().is_ok());
    }
}
