//! Unit conventions and heuristic defaults shared by the analysis kernels.
//!
//! Potentials are volts, raw currents are amperes and reported current
//! densities are mA·cm⁻².

/// Offset from the instrument reference electrode to the RHE scale.
pub const POTENTIAL_SHIFT_V: f64 = 0.903;
/// Sign flip plus A → mA conversion.
pub const CURRENT_SCALE: f64 = -1000.0;
/// Thermodynamic water-splitting potential.
pub const REFERENCE_POTENTIAL_V: f64 = 1.23;

pub const CYCLE_TOLERANCE_V: f64 = 1.0e-3;
pub const MIN_CYCLE_SEPARATION: usize = 10;
/// Return-to-start search window for the fixed-segment fallback.
pub const FIXED_SEGMENT_SEARCH_LIMIT: usize = 500;

/// −0.150 V before the potential shift.
pub const MIDPOINT_POTENTIAL_V: f64 = 0.753;
pub const MIDPOINT_TOLERANCE_V: f64 = 1.0e-3;
pub const MIDPOINT_RANGE_DIVISOR: f64 = 50.0;

pub const OVERPOTENTIAL_TARGETS_MA_CM2: [f64; 3] = [10.0, 100.0, 200.0];
pub const VOLT_TO_MILLIVOLT: f64 = 1000.0;

/// mA·Ω → V.
pub const RESISTANCE_CORRECTION_SCALE: f64 = 1.0e-3;
/// Δj against scan-rate slope (F·cm⁻²) → mF·cm⁻².
pub const CAPACITANCE_SCALE: f64 = 1000.0;

pub const SNIFF_BYTES: usize = 1000;
