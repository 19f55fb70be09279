use crate::common::constants::FIXED_SEGMENT_SEARCH_LIMIT;
use serde::Serialize;

/// One way of guessing where sweep cycles begin.
///
/// Each variant proposes raw candidates; the segmenter applies them in
/// [`SegmentationStrategy::CASCADE`] order and keeps the first proposal with
/// at least two candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SegmentationStrategy {
    /// Every later sample that comes back to the starting potential.
    ReturnToStart,
    /// Samples spaced half a cycle apart, where one cycle is estimated from
    /// the spacing of alternate turning points.
    DirectionPeriodicity,
    /// Recurrences of the extremum nearest the start, shifted back a quarter
    /// cycle.
    ExtremumRecurrence,
    /// Whole-trace repetition at the first return-to-start period.
    FixedSegment,
}

impl SegmentationStrategy {
    pub const CASCADE: [Self; 4] = [
        Self::ReturnToStart,
        Self::DirectionPeriodicity,
        Self::ExtremumRecurrence,
        Self::FixedSegment,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ReturnToStart => "return-to-start",
            Self::DirectionPeriodicity => "direction-periodicity",
            Self::ExtremumRecurrence => "extremum-recurrence",
            Self::FixedSegment => "fixed-segment",
        }
    }

    pub(super) fn propose(self, trace: &TraceSummary<'_>) -> Vec<usize> {
        match self {
            Self::ReturnToStart => return_to_start(trace),
            Self::DirectionPeriodicity => direction_periodicity(trace),
            Self::ExtremumRecurrence => extremum_recurrence(trace),
            Self::FixedSegment => fixed_segment(trace),
        }
    }
}

/// Precomputed facts about a potential trace shared by all strategies.
pub(super) struct TraceSummary<'a> {
    pub(super) potentials: &'a [f64],
    pub(super) tolerance: f64,
    pub(super) min_separation: usize,
    pub(super) start: f64,
    pub(super) min: f64,
    pub(super) max: f64,
    pub(super) turning_points: Vec<usize>,
}

impl TraceSummary<'_> {
    fn near(&self, value: f64, reference: f64) -> bool {
        (value - reference).abs() < self.tolerance
    }

    fn starts_at_extreme(&self) -> bool {
        self.near(self.start, self.min) || self.near(self.start, self.max)
    }
}

fn return_to_start(trace: &TraceSummary<'_>) -> Vec<usize> {
    if trace.starts_at_extreme() {
        return Vec::new();
    }
    (trace.min_separation..trace.potentials.len())
        .filter(|&index| trace.near(trace.potentials[index], trace.start))
        .collect()
}

fn direction_periodicity(trace: &TraceSummary<'_>) -> Vec<usize> {
    let turning = &trace.turning_points;
    if turning.len() < 4 {
        return Vec::new();
    }

    let intervals: Vec<usize> = turning.windows(3).map(|w| w[2] - w[0]).collect();
    let cycle_length = intervals.iter().sum::<usize>() / intervals.len();
    let half_cycle = cycle_length / 2;
    let len = trace.potentials.len();
    let first = turning[0];
    let Some(&reference) = trace.potentials.get(first + half_cycle) else {
        return Vec::new();
    };
    if half_cycle == 0 {
        return Vec::new();
    }

    (first..len)
        .step_by(half_cycle)
        .filter(|&index| {
            index + trace.min_separation < len && trace.near(trace.potentials[index], reference)
        })
        .collect()
}

fn extremum_recurrence(trace: &TraceSummary<'_>) -> Vec<usize> {
    let reference = if (trace.start - trace.max).abs() < (trace.start - trace.min).abs() {
        trace.max
    } else {
        trace.min
    };
    let recurrences: Vec<usize> = trace
        .potentials
        .iter()
        .enumerate()
        .filter(|(_, potential)| trace.near(**potential, reference))
        .map(|(index, _)| index)
        .collect();
    if recurrences.len() < 2 {
        return Vec::new();
    }

    let span = recurrences[recurrences.len() - 1] - recurrences[0];
    let mean_spacing = span / (recurrences.len() - 1);
    recurrences
        .iter()
        .map(|index| index.saturating_sub(mean_spacing / 4))
        .collect()
}

fn fixed_segment(trace: &TraceSummary<'_>) -> Vec<usize> {
    let len = trace.potentials.len();
    let origin = trace.potentials[0];
    let Some(period) = (1..len.min(FIXED_SEGMENT_SEARCH_LIMIT))
        .find(|&index| trace.near(trace.potentials[index], origin))
    else {
        return Vec::new();
    };
    if period <= trace.min_separation {
        return Vec::new();
    }

    let repeats = (period..len)
        .step_by(period)
        .all(|index| trace.near(trace.potentials[index], origin));
    if !repeats {
        return Vec::new();
    }
    (0..len).step_by(period).collect()
}
