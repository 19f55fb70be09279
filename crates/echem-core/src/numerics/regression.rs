use faer::Mat;
use serde::Serialize;

const SINGULAR_PIVOT_EPSILON: f64 = 1.0e-12;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegressionError {
    #[error("x and y lengths differ: {x_len} vs {y_len}")]
    LengthMismatch { x_len: usize, y_len: usize },
    #[error("degree-{degree} fit requires at least {required} points, got {actual}")]
    InsufficientPoints {
        degree: usize,
        required: usize,
        actual: usize,
    },
    #[error("sample {index} is not finite")]
    NonFiniteSample { index: usize },
    #[error("normal equations are singular at pivot index {pivot_index}")]
    SingularSystem { pivot_index: usize },
}

/// Straight-line least-squares result.
///
/// `r_squared` is NaN when every y value is identical, since the total sum of
/// squares is then zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub points: usize,
}

/// Least-squares polynomial coefficients, constant term first.
///
/// Solves the normal equations `VᵀV c = Vᵀy` with partial pivoting.
pub fn polynomial_fit(x: &[f64], y: &[f64], degree: usize) -> Result<Vec<f64>, RegressionError> {
    if x.len() != y.len() {
        return Err(RegressionError::LengthMismatch {
            x_len: x.len(),
            y_len: y.len(),
        });
    }
    let terms = degree + 1;
    if x.len() < terms {
        return Err(RegressionError::InsufficientPoints {
            degree,
            required: terms,
            actual: x.len(),
        });
    }
    if let Some(index) = x
        .iter()
        .zip(y)
        .position(|(xi, yi)| !xi.is_finite() || !yi.is_finite())
    {
        return Err(RegressionError::NonFiniteSample { index });
    }

    let mut normal = Mat::<f64>::zeros(terms, terms);
    let mut rhs = vec![0.0; terms];
    for (&xi, &yi) in x.iter().zip(y) {
        let powers: Vec<f64> = std::iter::successors(Some(1.0), |power| Some(power * xi))
            .take(2 * terms - 1)
            .collect();
        for row in 0..terms {
            rhs[row] += powers[row] * yi;
            for col in 0..terms {
                normal[(row, col)] += powers[row + col];
            }
        }
    }

    solve_in_place(&mut normal, &mut rhs)?;
    Ok(rhs)
}

pub fn linear_fit(x: &[f64], y: &[f64]) -> Result<LinearFit, RegressionError> {
    let coefficients = polynomial_fit(x, y, 1)?;
    let (intercept, slope) = (coefficients[0], coefficients[1]);

    let mean = y.iter().sum::<f64>() / y.len() as f64;
    let (ss_total, ss_residual) =
        x.iter()
            .zip(y)
            .fold((0.0, 0.0), |(total, residual), (&xi, &yi)| {
                let predicted = slope * xi + intercept;
                (
                    total + (yi - mean).powi(2),
                    residual + (yi - predicted).powi(2),
                )
            });
    let r_squared = if ss_total == 0.0 {
        f64::NAN
    } else {
        1.0 - ss_residual / ss_total
    };

    Ok(LinearFit {
        slope,
        intercept,
        r_squared,
        points: x.len(),
    })
}

/// Fits the pairs whose y value is present.
///
/// Returns `None` when fewer than two usable pairs remain or the system is
/// degenerate (all x equal), never an error.
pub fn fit_present_pairs(pairs: impl IntoIterator<Item = (f64, Option<f64>)>) -> Option<LinearFit> {
    let (x, y): (Vec<f64>, Vec<f64>) = pairs
        .into_iter()
        .filter_map(|(x, y)| y.map(|y| (x, y)))
        .unzip();
    match linear_fit(&x, &y) {
        Ok(fit) => Some(fit),
        Err(error) => {
            tracing::debug!(%error, "linear fit unavailable");
            None
        }
    }
}

fn solve_in_place(matrix: &mut Mat<f64>, rhs: &mut [f64]) -> Result<(), RegressionError> {
    let dimension = matrix.nrows();
    let scale = (0..dimension)
        .flat_map(|row| (0..dimension).map(move |col| (row, col)))
        .map(|(row, col)| matrix[(row, col)].abs())
        .fold(0.0_f64, f64::max)
        .max(1.0);

    for pivot_index in 0..dimension {
        let pivot_row = (pivot_index..dimension)
            .max_by(|&lhs, &rhs_row| {
                matrix[(lhs, pivot_index)]
                    .abs()
                    .total_cmp(&matrix[(rhs_row, pivot_index)].abs())
            })
            .unwrap_or(pivot_index);
        if matrix[(pivot_row, pivot_index)].abs() <= SINGULAR_PIVOT_EPSILON * scale {
            return Err(RegressionError::SingularSystem { pivot_index });
        }
        if pivot_row != pivot_index {
            for col in 0..dimension {
                let value = matrix[(pivot_index, col)];
                matrix[(pivot_index, col)] = matrix[(pivot_row, col)];
                matrix[(pivot_row, col)] = value;
            }
            rhs.swap(pivot_index, pivot_row);
        }

        let pivot = matrix[(pivot_index, pivot_index)];
        for row in pivot_index + 1..dimension {
            let factor = matrix[(row, pivot_index)] / pivot;
            if factor == 0.0 {
                continue;
            }
            for col in pivot_index..dimension {
                matrix[(row, col)] -= factor * matrix[(pivot_index, col)];
            }
            rhs[row] -= factor * rhs[pivot_index];
        }
    }

    for row in (0..dimension).rev() {
        let tail: f64 = (row + 1..dimension)
            .map(|col| matrix[(row, col)] * rhs[col])
            .sum();
        rhs[row] = (rhs[row] - tail) / matrix[(row, row)];
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{RegressionError, fit_present_pairs, linear_fit, polynomial_fit};

    #[test]
    fn exact_line_recovers_slope_intercept_and_unit_r_squared() {
        let fit = linear_fit(&[10.0, 20.0, 30.0], &[1.0, 2.0, 3.0]).expect("fit should succeed");

        assert!((fit.slope - 0.1).abs() <= 1.0e-12);
        assert!(fit.intercept.abs() <= 1.0e-10);
        assert!((fit.r_squared - 1.0).abs() <= 1.0e-12);
        assert_eq!(fit.points, 3);
    }

    #[test]
    fn noisy_line_has_r_squared_below_one() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [2.1, 3.9, 6.2, 7.8];
        let fit = linear_fit(&x, &y).expect("fit should succeed");

        assert!((fit.slope - 1.94).abs() <= 1.0e-9);
        assert!((fit.intercept - 0.15).abs() <= 1.0e-9);
        assert!(fit.r_squared < 1.0 && fit.r_squared > 0.99);
    }

    #[test]
    fn quadratic_coefficients_are_constant_first() {
        let x = [-1.0, 0.0, 1.0, 2.0];
        let y: Vec<f64> = x.iter().map(|v| 1.0 - 2.0 * v + 0.5 * v * v).collect();
        let coefficients = polynomial_fit(&x, &y, 2).expect("fit should succeed");

        assert!((coefficients[0] - 1.0).abs() <= 1.0e-10);
        assert!((coefficients[1] + 2.0).abs() <= 1.0e-10);
        assert!((coefficients[2] - 0.5).abs() <= 1.0e-10);
    }

    #[test]
    fn fewer_than_two_present_pairs_gives_no_fit() {
        assert_eq!(fit_present_pairs([(10.0, Some(1.0)), (20.0, None)]), None);
        assert_eq!(fit_present_pairs(std::iter::empty()), None);
    }

    #[test]
    fn absent_y_values_are_filtered_before_fitting() {
        let fit = fit_present_pairs([
            (10.0, Some(1.0)),
            (15.0, None),
            (20.0, Some(2.0)),
            (30.0, Some(3.0)),
        ])
        .expect("three present pairs should fit");
        assert!((fit.slope - 0.1).abs() <= 1.0e-12);
        assert_eq!(fit.points, 3);
    }

    #[test]
    fn constant_y_reports_nan_r_squared() {
        let fit = linear_fit(&[1.0, 2.0, 3.0], &[4.0, 4.0, 4.0]).expect("fit should succeed");
        assert!(fit.slope.abs() <= 1.0e-12);
        assert!(fit.r_squared.is_nan());
    }

    #[test]
    fn repeated_x_is_singular() {
        let error = linear_fit(&[50.0, 50.0], &[1.0, 2.0]).expect_err("fit should fail");
        assert!(matches!(error, RegressionError::SingularSystem { .. }));
        assert_eq!(fit_present_pairs([(50.0, Some(1.0)), (50.0, Some(2.0))]), None);
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let error = linear_fit(&[1.0, 2.0], &[1.0]).expect_err("fit should fail");
        assert_eq!(error, RegressionError::LengthMismatch { x_len: 2, y_len: 1 });
    }
}
