//! Solution resistance from the zero crossing of −Z″.
//!
//! This is a monotonic proxy, not an interpolation: a bracketing pair is
//! averaged, and without a sign change the sample nearest zero stands in for
//! the crossing. Noisy spectra with several crossings report the first one.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "kind")]
pub enum CrossoverMethod {
    /// −Z″ changes sign between `lower` and `lower + 1`.
    SignChange { lower: usize },
    /// No sign change; smallest strictly positive −Z″.
    SmallestPositive { index: usize },
    /// Nothing positive; the value closest to zero from below.
    ClosestNonPositive { index: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CrossoverResult {
    pub solution_resistance_ohm: Option<f64>,
    pub method: Option<CrossoverMethod>,
}

impl CrossoverResult {
    const ABSENT: Self = Self {
        solution_resistance_ohm: None,
        method: None,
    };
}

pub fn locate_solution_resistance(z_real: &[f64], minus_z_imag: &[f64]) -> CrossoverResult {
    let len = z_real.len().min(minus_z_imag.len());
    if z_real.len() != minus_z_imag.len() {
        tracing::warn!(
            z_real = z_real.len(),
            minus_z_imag = minus_z_imag.len(),
            "impedance columns differ in length; using common prefix"
        );
    }
    let (z_real, minus_z_imag) = (&z_real[..len], &minus_z_imag[..len]);

    if let Some(lower) = first_sign_change(minus_z_imag) {
        let resistance = (z_real[lower] + z_real[lower + 1]) / 2.0;
        tracing::debug!(lower, resistance, "−Z″ sign change bracketed");
        return CrossoverResult {
            solution_resistance_ohm: Some(resistance),
            method: Some(CrossoverMethod::SignChange { lower }),
        };
    }

    let smallest_positive = extremal_index(minus_z_imag, |value| value > 0.0, |a, b| a < b);
    if let Some(index) = smallest_positive {
        tracing::debug!(index, "no −Z″ sign change; using smallest positive sample");
        return CrossoverResult {
            solution_resistance_ohm: Some(z_real[index]),
            method: Some(CrossoverMethod::SmallestPositive { index }),
        };
    }

    let closest_below = extremal_index(minus_z_imag, |value| value <= 0.0, |a, b| a > b);
    match closest_below {
        Some(index) => {
            tracing::debug!(index, "−Z″ never positive; using value closest to zero");
            CrossoverResult {
                solution_resistance_ohm: Some(z_real[index]),
                method: Some(CrossoverMethod::ClosestNonPositive { index }),
            }
        }
        None => CrossoverResult::ABSENT,
    }
}

fn first_sign_change(values: &[f64]) -> Option<usize> {
    values.windows(2).position(|pair| {
        let (current, next) = (pair[0], pair[1]);
        (current > 0.0 && next <= 0.0) || (current < 0.0 && next >= 0.0)
    })
}

/// First index among `keep`-filtered samples that wins under `better`.
fn extremal_index(
    values: &[f64],
    keep: impl Fn(f64) -> bool,
    better: impl Fn(f64, f64) -> bool,
) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, &value) in values.iter().enumerate() {
        if !keep(value) {
            continue;
        }
        match best {
            Some((_, current)) if !better(value, current) => {}
            _ => best = Some((index, value)),
        }
    }
    best.map(|(index, _)| index)
}
