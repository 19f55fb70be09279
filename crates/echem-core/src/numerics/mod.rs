pub mod regression;

pub use regression::{
    LinearFit, RegressionError, fit_present_pairs, linear_fit, polynomial_fit,
};

/// Index of the sample closest to `target`; the earliest index wins ties.
///
/// NaN samples never match.
pub fn closest_index(values: &[f64], target: f64) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .filter(|(_, value)| !value.is_nan())
        .fold(None, |best: Option<(usize, f64)>, (index, value)| {
            let distance = (value - target).abs();
            match best {
                Some((_, best_distance)) if best_distance <= distance => best,
                _ => Some((index, distance)),
            }
        })
        .map(|(index, _)| index)
}

pub fn value_range(values: &[f64]) -> Option<(f64, f64)> {
    let mut finite = values.iter().copied().filter(|value| value.is_finite());
    let first = finite.next()?;
    Some(finite.fold((first, first), |(min, max), value| {
        (min.min(value), max.max(value))
    }))
}

/// Vertices where the scan direction reverses.
///
/// Flat steps carry the previous direction forward, so a plateau at a vertex
/// is reported once, at the sample before the first step in the new direction.
pub fn turning_points(values: &[f64]) -> Vec<usize> {
    let mut turning = Vec::new();
    let mut previous_direction = 0.0_f64;
    for (index, window) in values.windows(2).enumerate() {
        let step = window[1] - window[0];
        if step == 0.0 || step.is_nan() {
            continue;
        }
        let direction = step.signum();
        if previous_direction != 0.0 && direction != previous_direction {
            turning.push(index);
        }
        previous_direction = direction;
    }
    turning
}

/// First vertex at which the sign bit of the first difference flips.
///
/// Unlike [`turning_points`], a flat step counts as non-negative here.
pub fn first_sign_flip(values: &[f64]) -> Option<usize> {
    let negative: Vec<bool> = values
        .windows(2)
        .map(|window| (window[1] - window[0]).is_sign_negative())
        .collect();
    negative
        .windows(2)
        .position(|pair| pair[0] != pair[1])
        .map(|position| position + 1)
}
