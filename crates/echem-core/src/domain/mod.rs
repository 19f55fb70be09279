pub mod errors;

pub use errors::{AnalysisResult, EchemError, EchemErrorCategory, EchemResult};

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt::{Display, Formatter};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    #[serde(rename = "CV")]
    CyclicVoltammetry,
    #[serde(rename = "LSV")]
    LinearSweepVoltammetry,
    #[serde(rename = "EIS")]
    Impedance,
}

impl RecordKind {
    pub const ALL: [Self; 3] = [
        Self::CyclicVoltammetry,
        Self::LinearSweepVoltammetry,
        Self::Impedance,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CyclicVoltammetry => "CV",
            Self::LinearSweepVoltammetry => "LSV",
            Self::Impedance => "EIS",
        }
    }

    pub fn parse(token: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(token.trim()))
    }
}

impl Display for RecordKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

/// Raw bytes of one instrument export, as handed to the analyzers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRecord {
    pub name: String,
    pub stem: String,
    pub bytes: Vec<u8>,
}

impl SourceRecord {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        let name = name.into();
        let stem = Path::new(&name)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| name.clone());
        Self {
            name,
            stem,
            bytes: bytes.into(),
        }
    }

    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }
}

/// Ordered potential/current samples from one voltammetry run.
///
/// Sample order is scan order; both vectors always have the same length.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Voltammogram {
    potentials: Vec<f64>,
    currents: Vec<f64>,
}

impl Voltammogram {
    pub fn from_pairs(pairs: impl IntoIterator<Item = (f64, f64)>) -> Self {
        let (potentials, currents) = pairs.into_iter().unzip();
        Self {
            potentials,
            currents,
        }
    }

    pub fn potentials(&self) -> &[f64] {
        &self.potentials
    }

    pub fn currents(&self) -> &[f64] {
        &self.currents
    }

    pub fn len(&self) -> usize {
        self.potentials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.potentials.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ScanMetadata {
    pub scan_rate_mv_per_s: Option<u32>,
}

/// Impedance samples in file order.
///
/// `impedance[i].re` is Z′ and `impedance[i].im` is Z″ exactly as exported;
/// the analysis side works on −Z″.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImpedanceSpectrum {
    frequencies: Vec<f64>,
    impedance: Vec<Complex64>,
}

impl ImpedanceSpectrum {
    pub fn push(&mut self, frequency_hz: f64, z_real: f64, z_imag: f64) {
        self.frequencies.push(frequency_hz);
        self.impedance.push(Complex64::new(z_real, z_imag));
    }

    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    pub fn impedance(&self) -> &[Complex64] {
        &self.impedance
    }

    pub fn z_real(&self) -> Vec<f64> {
        self.impedance.iter().map(|z| z.re).collect()
    }

    pub fn minus_z_imag(&self) -> Vec<f64> {
        self.impedance.iter().map(|z| -z.im).collect()
    }

    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }
}

/// Fixed affine map from instrument units to reported units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleTransform {
    pub potential_shift_v: f64,
    pub current_scale: f64,
}

impl SampleTransform {
    pub fn apply(&self, voltammogram: &Voltammogram, start: usize, end: usize) -> ProcessedCycle {
        let end = end.min(voltammogram.len());
        let start = start.min(end);
        ProcessedCycle {
            start_index: start,
            end_index: end,
            potentials: voltammogram.potentials[start..end]
                .iter()
                .map(|potential| potential + self.potential_shift_v)
                .collect(),
            current_densities: voltammogram.currents[start..end]
                .iter()
                .map(|current| current * self.current_scale)
                .collect(),
        }
    }

    pub fn apply_whole(&self, voltammogram: &Voltammogram) -> ProcessedCycle {
        self.apply(voltammogram, 0, voltammogram.len())
    }
}

/// Transformed slice of a voltammogram: potentials in V, current densities in mA·cm⁻².
///
/// Used both for the last complete CV cycle and for whole LSV sweeps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessedCycle {
    pub start_index: usize,
    pub end_index: usize,
    potentials: Vec<f64>,
    current_densities: Vec<f64>,
}

impl ProcessedCycle {
    pub fn potentials(&self) -> &[f64] {
        &self.potentials
    }

    pub fn current_densities(&self) -> &[f64] {
        &self.current_densities
    }

    pub fn len(&self) -> usize {
        self.potentials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.potentials.is_empty()
    }
}
