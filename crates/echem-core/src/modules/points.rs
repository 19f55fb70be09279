use crate::common::AnalysisConfig;
use crate::common::constants::{MIDPOINT_RANGE_DIVISOR, VOLT_TO_MILLIVOLT};
use crate::domain::ProcessedCycle;
use crate::numerics::{closest_index, first_sign_flip, value_range};
use serde::Serialize;

/// How forward and reverse branches were told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BranchSplit {
    /// Matches before the first direction change are forward.
    DirectionChange,
    /// No direction change; matches split by position in the trace.
    TraceHalves,
    /// One side was empty; first and last match used.
    FirstAndLast,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MidpointResult {
    pub target_potential_v: f64,
    pub tolerance_v: f64,
    pub forward_current: Option<f64>,
    pub reverse_current: Option<f64>,
    pub split: Option<BranchSplit>,
}

impl MidpointResult {
    /// Unsigned current difference |reverse − forward|.
    pub fn delta_j(&self) -> Option<f64> {
        Some((self.reverse_current? - self.forward_current?).abs())
    }

    fn absent(target_potential_v: f64, tolerance_v: f64) -> Self {
        Self {
            target_potential_v,
            tolerance_v,
            forward_current: None,
            reverse_current: None,
            split: None,
        }
    }
}

/// Forward and reverse branch currents where the cycle crosses `target_v`.
///
/// When no sample lies within `tolerance_v` of the target, the target moves
/// to the middle of the observed potential range and the tolerance widens to
/// `max(2 × tolerance_v, range / 50)`. Fewer than two matching samples leaves
/// both currents absent.
pub fn find_midpoint_currents(
    cycle: &ProcessedCycle,
    target_v: f64,
    tolerance_v: f64,
) -> MidpointResult {
    let potentials = cycle.potentials();
    let currents = cycle.current_densities();
    if potentials.is_empty() || currents.is_empty() {
        return MidpointResult::absent(target_v, tolerance_v);
    }

    let mut target = target_v;
    let mut tolerance = tolerance_v;
    if !potentials.iter().any(|p| (p - target).abs() < tolerance) {
        let Some((min, max)) = value_range(potentials) else {
            return MidpointResult::absent(target_v, tolerance_v);
        };
        target = (min + max) / 2.0;
        tolerance = (tolerance * 2.0).max((max - min) / MIDPOINT_RANGE_DIVISOR);
        tracing::info!(
            requested = target_v,
            target,
            tolerance,
            "midpoint potential not sampled; using range midpoint"
        );
    }

    let matches: Vec<usize> = potentials
        .iter()
        .enumerate()
        .filter(|(_, p)| (*p - target).abs() < tolerance)
        .map(|(index, _)| index)
        .collect();
    if matches.len() < 2 {
        tracing::warn!(
            target,
            matches = matches.len(),
            "not enough samples near midpoint potential"
        );
        return MidpointResult::absent(target, tolerance);
    }

    let (forward, reverse, split) = split_branches(&matches, potentials);
    let result = MidpointResult {
        target_potential_v: target,
        tolerance_v: tolerance,
        forward_current: currents.get(forward).copied(),
        reverse_current: currents.get(reverse).copied(),
        split: Some(split),
    };
    tracing::debug!(
        target,
        forward = ?result.forward_current,
        reverse = ?result.reverse_current,
        "midpoint currents located"
    );
    result
}

fn split_branches(matches: &[usize], potentials: &[f64]) -> (usize, usize, BranchSplit) {
    let first = matches[0];
    let last = matches[matches.len() - 1];

    let (boundary, split) = match first_sign_flip(potentials) {
        Some(vertex) => (vertex, BranchSplit::DirectionChange),
        None => (potentials.len() / 2, BranchSplit::TraceHalves),
    };
    let forward = matches.iter().copied().find(|&index| index < boundary);
    let reverse = matches.iter().copied().rev().find(|&index| index >= boundary);

    match (forward, reverse) {
        (Some(forward), Some(reverse)) => (forward, reverse, split),
        _ => (first, last, BranchSplit::FirstAndLast),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OverpotentialPoint {
    pub target_ma_cm2: f64,
    pub sample_index: Option<usize>,
    pub overpotential_mv: Option<f64>,
}

/// Overpotential in mV at the sample whose current density is closest to
/// each target.
pub fn overpotentials_at(
    sweep: &ProcessedCycle,
    targets_ma_cm2: &[f64],
    reference_potential_v: f64,
) -> Vec<OverpotentialPoint> {
    targets_ma_cm2
        .iter()
        .map(|&target| {
            let sample_index = closest_index(sweep.current_densities(), target);
            let overpotential_mv = sample_index.map(|index| {
                (sweep.potentials()[index] - reference_potential_v) * VOLT_TO_MILLIVOLT
            });
            OverpotentialPoint {
                target_ma_cm2: target,
                sample_index,
                overpotential_mv,
            }
        })
        .collect()
}

pub fn overpotentials_with_config(
    sweep: &ProcessedCycle,
    config: &AnalysisConfig,
) -> Vec<OverpotentialPoint> {
    overpotentials_at(
        sweep,
        &config.overpotential_targets_ma_cm2,
        config.reference_potential_v,
    )
}
