use crate::numerics::{LinearFit, fit_present_pairs};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CapacitancePoint {
    pub scan_rate_mv_per_s: u32,
    pub delta_j_ma_cm2: Option<f64>,
}

/// Double-layer capacitance from Δj against scan rate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapacitanceAnalysis {
    pub points: Vec<CapacitancePoint>,
    pub fit: Option<LinearFit>,
    pub cdl_mf_cm2: Option<f64>,
}

/// Sorts `points` by scan rate (stable) and fits the ones with a Δj.
///
/// `capacitance_scale` converts the fitted slope to mF·cm⁻².
pub fn analyze_capacitance(
    points: impl IntoIterator<Item = CapacitancePoint>,
    capacitance_scale: f64,
) -> CapacitanceAnalysis {
    let mut points: Vec<CapacitancePoint> = points.into_iter().collect();
    points.sort_by_key(|point| point.scan_rate_mv_per_s);

    let fit = fit_present_pairs(
        points
            .iter()
            .map(|point| (f64::from(point.scan_rate_mv_per_s), point.delta_j_ma_cm2)),
    );
    let cdl_mf_cm2 = fit.map(|fit| fit.slope * capacitance_scale);
    if let Some(cdl) = cdl_mf_cm2 {
        tracing::info!(cdl_mf_cm2 = cdl, points = points.len(), "double-layer capacitance fitted");
    } else {
        tracing::warn!(points = points.len(), "not enough Δj values to fit capacitance");
    }

    CapacitanceAnalysis {
        points,
        fit,
        cdl_mf_cm2,
    }
}

#[cfg(test)]
mod tests {
    use super::{CapacitancePoint, analyze_capacitance};

    fn point(scan_rate_mv_per_s: u32, delta_j_ma_cm2: Option<f64>) -> CapacitancePoint {
        CapacitancePoint {
            scan_rate_mv_per_s,
            delta_j_ma_cm2,
        }
    }

    #[test]
    fn slope_is_scaled_to_millifarads() {
        let analysis = analyze_capacitance(
            [point(30, Some(0.3)), point(10, Some(0.1)), point(20, Some(0.2))],
            1000.0,
        );

        let rates: Vec<u32> = analysis.points.iter().map(|p| p.scan_rate_mv_per_s).collect();
        assert_eq!(rates, vec![10, 20, 30]);
        let cdl = analysis.cdl_mf_cm2.expect("capacitance should be fitted");
        assert!((cdl - 10.0).abs() <= 1.0e-9);
    }

    #[test]
    fn missing_delta_j_points_are_kept_but_not_fitted() {
        let analysis = analyze_capacitance([point(10, Some(0.1)), point(20, None)], 1000.0);

        assert_eq!(analysis.points.len(), 2);
        assert_eq!(analysis.fit, None);
        assert_eq!(analysis.cdl_mf_cm2, None);
    }

    #[test]
    fn equal_scan_rates_keep_input_order() {
        let analysis = analyze_capacitance(
            [point(50, Some(2.0)), point(10, Some(1.0)), point(50, Some(3.0))],
            1000.0,
        );
        let deltas: Vec<Option<f64>> = analysis.points.iter().map(|p| p.delta_j_ma_cm2).collect();
        assert_eq!(deltas, vec![Some(1.0), Some(2.0), Some(3.0)]);
    }
}
