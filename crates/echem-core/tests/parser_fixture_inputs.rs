use echem_core::common::AnalysisConfig;
use echem_core::domain::{RecordKind, SourceRecord};
use echem_core::modules::analyzers::{EisAnalyzer, LsvAnalyzer};
use echem_core::modules::traits::RecordAnalyzer;
use echem_core::parser::{
    classify_record, parse_impedance_spectrum, parse_voltammetry_record, scan_impedance_block,
};
use std::fs;
use std::path::{Path, PathBuf};

fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn read_fixture(name: &str) -> SourceRecord {
    let path = fixture_path(name);
    let bytes = fs::read(&path)
        .unwrap_or_else(|error| panic!("fixture {} should be readable: {}", path.display(), error));
    SourceRecord::new(name, bytes)
}

#[test]
fn fixtures_are_routed_to_their_record_kind() {
    let expectations = [
        ("eis_spectrum.txt", RecordKind::Impedance),
        ("lsv_oer.txt", RecordKind::LinearSweepVoltammetry),
        ("cv_tabbed.txt", RecordKind::CyclicVoltammetry),
    ];

    for (name, kind) in expectations {
        let record = read_fixture(name);
        assert_eq!(
            classify_record(&record.bytes, 1000),
            Some(kind),
            "fixture {name} should classify as {kind}"
        );
    }
}

#[test]
fn impedance_block_stops_at_first_corrupt_row() {
    let record = read_fixture("eis_spectrum.txt");
    let text = record.text();
    let block = scan_impedance_block(&text);

    assert!(block.header_found);
    assert_eq!(block.spectrum.len(), 4);
    assert_eq!(block.spectrum.frequencies(), &[1.0e5, 5.0e4, 2.5e4, 1.0e4]);
    assert_eq!(
        block.data_lines.first().copied(),
        Some("1.000e+5, 1.602e+0, 3.110e-1, 1.632e+0, 1.099e+1")
    );
    assert!(!block.zview_text().contains("oops"));
    assert_eq!(parse_impedance_spectrum(&text), block.spectrum);
}

#[test]
fn impedance_fixture_resolves_solution_resistance() {
    let record = read_fixture("eis_spectrum.txt");
    let result = EisAnalyzer
        .analyze(&record)
        .expect("impedance fixture should be analyzed");

    assert_eq!(result.file_id, "eis_spectrum");
    let rs = result
        .solution_resistance_ohm()
        .expect("solution resistance should be located");
    assert!((rs - 1.678).abs() <= 1.0e-9, "unexpected Rs {rs}");
}

#[test]
fn lsv_fixture_reports_labelled_id_and_overpotentials() {
    let record = read_fixture("lsv_oer.txt");
    let parsed = parse_voltammetry_record(&record.text());
    assert_eq!(parsed.samples.len(), 7);
    assert_eq!(parsed.metadata.scan_rate_mv_per_s, Some(5));

    let config = AnalysisConfig::default();
    let result = LsvAnalyzer::new(&config)
        .analyze(&record)
        .expect("LSV fixture should be analyzed");
    assert_eq!(result.file_id, "lsv_ni_5mV");

    let overpotentials: Vec<f64> = result
        .overpotentials
        .iter()
        .map(|point| point.overpotential_mv.unwrap_or(f64::NAN))
        .collect();
    for (actual, expected) in overpotentials.iter().zip([173.0, 373.0, 473.0]) {
        assert!(
            (actual - expected).abs() <= 1.0e-6,
            "overpotential {actual} should be {expected}"
        );
    }
}

#[test]
fn tab_separated_cv_skips_noise_lines() {
    let record = read_fixture("cv_tabbed.txt");
    let parsed = parse_voltammetry_record(&record.text());

    assert_eq!(parsed.samples.len(), 5);
    assert_eq!(parsed.metadata.scan_rate_mv_per_s, Some(25));
    assert_eq!(parsed.file_id, None);
    assert_eq!(parsed.samples.potentials()[4], -0.2);
}
