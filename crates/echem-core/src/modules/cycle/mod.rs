//! Cycle boundary detection for repeating voltammetry sweeps.
//!
//! The cycle length is never known up front. [`CycleSegmenter`] runs the
//! [`SegmentationStrategy`] cascade over the raw potential trace, keeps the
//! first proposal that yields at least two candidates, and thins it so kept
//! boundaries are at least `min_separation` samples apart.

mod strategy;

pub use strategy::SegmentationStrategy;

use crate::common::AnalysisConfig;
use crate::common::constants::{CYCLE_TOLERANCE_V, MIN_CYCLE_SEPARATION};
use crate::domain::{ProcessedCycle, SampleTransform, Voltammogram};
use crate::numerics::{turning_points, value_range};
use serde::Serialize;
use std::ops::Range;
use strategy::TraceSummary;

/// Strictly increasing cycle-start indices plus the strategy that found them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct CycleBoundaries {
    indices: Vec<usize>,
    strategy: Option<SegmentationStrategy>,
}

impl CycleBoundaries {
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn strategy(&self) -> Option<SegmentationStrategy> {
        self.strategy
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Sample range of the last complete cycle in a trace of `len` samples.
    ///
    /// Starts at the final boundary. With two or more boundaries the end is
    /// projected by the mean boundary spacing and kept only if it falls
    /// inside the trace. Without boundaries the whole trace is one cycle.
    pub fn last_cycle_range(&self, len: usize) -> Range<usize> {
        let Some(&last) = self.indices.last() else {
            return 0..len;
        };
        let start = last.min(len);
        if self.indices.len() < 2 {
            return start..len;
        }

        let mean_spacing = (last - self.indices[0]) / (self.indices.len() - 1);
        let projected = start + mean_spacing;
        if projected < len {
            start..projected
        } else {
            start..len
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleSegmenter {
    tolerance: f64,
    min_separation: usize,
}

impl Default for CycleSegmenter {
    fn default() -> Self {
        Self::new(CYCLE_TOLERANCE_V)
    }
}

impl CycleSegmenter {
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            min_separation: MIN_CYCLE_SEPARATION,
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.cycle_tolerance_v).with_min_separation(config.min_cycle_separation)
    }

    /// Minimum spacing between kept boundaries.
    ///
    /// The same count is the shortest trace considered at all, the earliest
    /// index a return-to-start may occur at, the tail margin for periodic
    /// candidates, and the floor a fixed segment must exceed.
    pub fn with_min_separation(mut self, min_separation: usize) -> Self {
        self.min_separation = min_separation.max(1);
        self
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn min_separation(&self) -> usize {
        self.min_separation
    }

    pub fn find_boundaries(&self, potentials: &[f64]) -> CycleBoundaries {
        if potentials.len() < self.min_separation {
            tracing::debug!(
                samples = potentials.len(),
                "trace too short for cycle detection"
            );
            return CycleBoundaries::default();
        }
        let Some((min, max)) = value_range(potentials) else {
            return CycleBoundaries::default();
        };

        let turning = turning_points(potentials);
        if turning.is_empty() {
            tracing::warn!("potential never reverses direction; no cycles detected");
            return CycleBoundaries::default();
        }

        let trace = TraceSummary {
            potentials,
            tolerance: self.tolerance,
            min_separation: self.min_separation,
            start: potentials[0],
            min,
            max,
            turning_points: turning,
        };

        let mut fallback: Option<(SegmentationStrategy, Vec<usize>)> = None;
        for strategy in SegmentationStrategy::CASCADE {
            let candidates = strategy.propose(&trace);
            tracing::debug!(
                strategy = strategy.as_str(),
                candidates = candidates.len(),
                "cycle segmentation strategy evaluated"
            );
            if candidates.len() >= 2 {
                return self.accept(strategy, candidates);
            }
            if fallback.is_none() && !candidates.is_empty() {
                fallback = Some((strategy, candidates));
            }
        }

        match fallback {
            Some((strategy, candidates)) => self.accept(strategy, candidates),
            None => {
                tracing::warn!("no cycle segmentation strategy found a boundary");
                CycleBoundaries::default()
            }
        }
    }

    /// Last complete cycle of `voltammogram`, transformed to reported units.
    pub fn last_complete_cycle(
        &self,
        voltammogram: &Voltammogram,
        transform: SampleTransform,
    ) -> (CycleBoundaries, ProcessedCycle) {
        let boundaries = self.find_boundaries(voltammogram.potentials());
        let range = boundaries.last_cycle_range(voltammogram.len());
        let cycle = transform.apply(voltammogram, range.start, range.end);
        (boundaries, cycle)
    }

    fn accept(&self, strategy: SegmentationStrategy, candidates: Vec<usize>) -> CycleBoundaries {
        let indices = thin_candidates(&candidates, self.min_separation);
        tracing::info!(
            strategy = strategy.as_str(),
            boundaries = ?indices,
            "cycle boundaries detected"
        );
        CycleBoundaries {
            indices,
            strategy: Some(strategy),
        }
    }
}

/// Keeps each candidate at least `min_separation` past the previously kept one.
pub fn thin_candidates(candidates: &[usize], min_separation: usize) -> Vec<usize> {
    let mut kept: Vec<usize> = Vec::with_capacity(candidates.len());
    for &candidate in candidates {
        match kept.last() {
            Some(&previous) if candidate < previous + min_separation => {}
            _ => kept.push(candidate),
        }
    }
    kept
}
