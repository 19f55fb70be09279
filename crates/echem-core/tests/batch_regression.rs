use echem_core::common::AnalysisConfig;
use echem_core::domain::SourceRecord;
use echem_core::modules::batch::BatchAnalyzer;
use echem_core::modules::traits::SilentObserver;
use std::fmt::Write;

/// Three-period CV export between -0.20 and -0.10 V whose capacitive current
/// scales with the scan rate.
fn cv_export(scan_rate_mv_per_s: u32) -> String {
    let current = f64::from(scan_rate_mv_per_s) * 1.0e-8;
    let mut text = format!(
        "Cyclic Voltammetry\nFile: cv_{scan_rate_mv_per_s}\nScan Rate (V/s) = {}\n\nPotential/V, Current/A\n",
        f64::from(scan_rate_mv_per_s) / 1000.0
    );
    for index in 0..=60_u32 {
        let phase = index % 20;
        let step = if phase <= 10 { phase } else { 20 - phase };
        let potential = -0.20 + f64::from(step) * 0.01;
        let sample = if phase < 10 { -current } else { current };
        let _ = writeln!(text, "{potential:.3}, {sample:.3e}");
    }
    text
}

fn eis_export(z_imag: [f64; 3]) -> String {
    format!(
        "A.C. Impedance\nFreq/Hz, Z'/ohm, Z\"/ohm\n1e5, 2.0, {}\n1e4, 2.5, {}\n1e3, 3.0, {}\n",
        z_imag[0], z_imag[1], z_imag[2]
    )
}

const LSV_EXPORT: &str = "Linear Sweep Voltammetry\nFile: lsv_a\nPotential/V, Current/A\n0.327, 0.0\n0.500, -0.010\n0.600, -0.100\n0.700, -0.200\n";

#[test]
fn capacitance_is_fitted_across_scan_rates() {
    let config = AnalysisConfig::default();
    let records = [
        SourceRecord::new("cv_40.txt", cv_export(40)),
        SourceRecord::new("cv_10.txt", cv_export(10)),
        SourceRecord::new("cv_20.txt", cv_export(20)),
    ];

    let report = BatchAnalyzer::new(&config)
        .run(&records, &SilentObserver)
        .expect("CV batch should succeed");

    let rates: Vec<u32> = report.cv.iter().map(|result| result.scan_rate_mv_per_s).collect();
    assert_eq!(rates, vec![10, 20, 40]);
    for result in &report.cv {
        assert_eq!(result.boundaries.indices(), &[20, 40]);
        let delta = result.delta_j().expect("Δj should be present");
        let expected = 2.0e-5 * f64::from(result.scan_rate_mv_per_s);
        assert!((delta - expected).abs() <= 1.0e-12, "Δj {delta} != {expected}");
    }

    let fit = report.capacitance.fit.expect("capacitance fit should exist");
    assert!((fit.slope - 2.0e-5).abs() <= 1.0e-12);
    assert!(fit.intercept.abs() <= 1.0e-12);
    assert!((fit.r_squared - 1.0).abs() <= 1.0e-9);
    let cdl = report.summary.cdl_mf_cm2.expect("Cdl should be reported");
    assert!((cdl - 0.02).abs() <= 1.0e-9);
}

#[test]
fn mixed_folder_produces_tafel_and_summary_tables() {
    let config = AnalysisConfig::default();
    let records = [
        SourceRecord::new("lsv.txt", LSV_EXPORT),
        SourceRecord::new("eis_1.txt", eis_export([-0.5, 0.5, 1.0])),
        SourceRecord::new("cv_no_rate.txt", cv_export(10).replace("Scan Rate (V/s) = 0.01\n", "")),
        SourceRecord::new("eis_2.txt", eis_export([-0.5, 0.5, 1.0])),
    ];

    let report = BatchAnalyzer::new(&config)
        .run(&records, &SilentObserver)
        .expect("mixed batch should succeed");

    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].placeholder, "INPUT.CV_SCAN_RATE");
    assert!(report.cv.is_empty());
    assert_eq!(report.capacitance.cdl_mf_cm2, None);

    assert_eq!(report.resistances_ohm, vec![2.25]);
    let tafel = &report.tafel[0];
    assert_eq!(tafel.source_id, "lsv_a");
    assert_eq!(tafel.column_count(), 2);
    assert!(tafel.log_j[0].is_nan());
    assert!((tafel.log_j[1] + 2.0).abs() <= 1.0e-12);
    // |(1.403 - 1.23) - 10 mA·cm⁻² × 2.25 Ω × 1e-3|
    assert!((tafel.overpotentials_v[0][1] - 0.1505).abs() <= 1.0e-9);

    let rs: Vec<Option<f64>> = report
        .summary
        .solution_resistances
        .iter()
        .map(|row| row.solution_resistance_ohm)
        .collect();
    assert_eq!(rs, vec![Some(2.25), Some(2.25)]);
    let first = &report.summary.overpotentials[0];
    assert_eq!(first.file_id, "lsv_a");
    assert_eq!(first.points[0].sample_index, Some(1));
}

#[test]
fn report_serializes_to_json_tree() {
    let config = AnalysisConfig::default();
    let records = [SourceRecord::new("eis_1.txt", eis_export([-0.5, 0.5, 1.0]))];

    let report = BatchAnalyzer::new(&config)
        .run(&records, &SilentObserver)
        .expect("impedance batch should succeed");
    let value = serde_json::to_value(&report).expect("report should serialize");

    assert_eq!(value["resistances_ohm"][0], 2.25);
    assert_eq!(value["eis"][0]["crossover"]["method"]["kind"], "sign-change");
    assert!(value["eis"][0].get("zview_text").is_none());
    assert!(value["cv"].as_array().is_some_and(Vec::is_empty));
}
