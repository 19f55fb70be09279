use super::serialization::{format_fixed_f64, format_scientific_f64};
use echem_core::modules::batch::BatchReport;
use echem_core::modules::tafel::TafelDataset;
use std::fmt::Write;

const CELL_PRECISION: usize = 6;
const ID_WIDTH: usize = 24;
const VALUE_WIDTH: usize = 12;

/// One named column of a side-by-side CSV table.
pub(super) struct Column<'a> {
    pub(super) header: String,
    pub(super) values: &'a [f64],
}

impl<'a> Column<'a> {
    pub(super) fn new(header: impl Into<String>, values: &'a [f64]) -> Self {
        Self {
            header: header.into(),
            values,
        }
    }
}

/// Columns of unequal length are padded with empty cells.
pub(super) fn render_columns(columns: &[Column<'_>]) -> String {
    let mut table = String::new();
    let headers: Vec<&str> = columns.iter().map(|column| column.header.as_str()).collect();
    table.push_str(&headers.join(","));
    table.push('\n');

    let rows = columns.iter().map(|column| column.values.len()).max().unwrap_or(0);
    for row in 0..rows {
        let cells: Vec<String> = columns
            .iter()
            .map(|column| {
                column
                    .values
                    .get(row)
                    .map(|&value| format_scientific_f64(value, CELL_PRECISION))
                    .unwrap_or_default()
            })
            .collect();
        table.push_str(&cells.join(","));
        table.push('\n');
    }
    table
}

pub(super) fn render_cv_table(report: &BatchReport) -> Option<String> {
    if report.cv.is_empty() {
        return None;
    }
    let columns: Vec<Column<'_>> = report
        .cv
        .iter()
        .flat_map(|result| {
            let rate = result.scan_rate_mv_per_s;
            [
                Column::new(format!("E {rate} mV/s (V)"), result.cycle.potentials()),
                Column::new(
                    format!("j {rate} mV/s (mA/cm2)"),
                    result.cycle.current_densities(),
                ),
            ]
        })
        .collect();
    Some(render_columns(&columns))
}

pub(super) fn render_lsv_table(report: &BatchReport) -> Option<String> {
    if report.lsv.is_empty() {
        return None;
    }
    let columns: Vec<Column<'_>> = report
        .lsv
        .iter()
        .flat_map(|result| {
            [
                Column::new(format!("E {} (V)", result.file_id), result.sweep.potentials()),
                Column::new(
                    format!("j {} (mA/cm2)", result.file_id),
                    result.sweep.current_densities(),
                ),
            ]
        })
        .collect();
    Some(render_columns(&columns))
}

pub(super) fn render_eis_table(report: &BatchReport) -> Option<String> {
    if report.eis.is_empty() {
        return None;
    }
    let columns: Vec<Column<'_>> = report
        .eis
        .iter()
        .flat_map(|result| {
            [
                Column::new(format!("Freq {} (Hz)", result.file_id), &result.frequencies_hz[..]),
                Column::new(format!("Z' {} (ohm)", result.file_id), &result.z_real_ohm[..]),
                Column::new(
                    format!("-Z'' {} (ohm)", result.file_id),
                    &result.minus_z_imag_ohm[..],
                ),
            ]
        })
        .collect();
    Some(render_columns(&columns))
}

pub(super) fn render_tafel_table(dataset: &TafelDataset) -> String {
    let mut columns = vec![Column::new("log j (A/cm2)", &dataset.log_j[..])];
    let resistance_columns = dataset
        .resistances_ohm
        .iter()
        .zip(&dataset.overpotentials_v);
    for (resistance, overpotentials) in resistance_columns {
        columns.push(Column::new(
            format!("eta Rs={resistance} ohm (V)"),
            &overpotentials[..],
        ));
    }
    render_columns(&columns)
}

fn optional_cell(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(value) => format_fixed_f64(value, VALUE_WIDTH, precision),
        None => format!("{:>VALUE_WIDTH$}", "NaN"),
    }
}

/// Plain-text analysis report: overpotentials, Rs and Cdl.
pub(super) fn render_summary(label: &str, report: &BatchReport) -> String {
    let mut text = String::new();
    let _ = writeln!(text, "Analysis report: {label}");
    let _ = writeln!(
        text,
        "Records: {} CV, {} LSV, {} EIS; {} skipped, {} unclassified",
        report.cv.len(),
        report.lsv.len(),
        report.eis.len(),
        report.skipped.len(),
        report.unclassified.len()
    );

    if !report.summary.overpotentials.is_empty() {
        text.push('\n');
        let _ = write!(text, "{:<ID_WIDTH$}", "LSV overpotential (mV)");
        if let Some(row) = report.summary.overpotentials.first() {
            for point in &row.points {
                let header = format!("@{} mA/cm2", point.target_ma_cm2);
                let _ = write!(text, "{header:>VALUE_WIDTH$}");
            }
        }
        text.push('\n');
        for row in &report.summary.overpotentials {
            let _ = write!(text, "{:<ID_WIDTH$}", row.file_id);
            for point in &row.points {
                text.push_str(&optional_cell(point.overpotential_mv, 1));
            }
            text.push('\n');
        }
    }

    if !report.summary.solution_resistances.is_empty() {
        text.push('\n');
        let _ = writeln!(text, "{:<ID_WIDTH$}{:>VALUE_WIDTH$}", "EIS", "Rs (ohm)");
        for row in &report.summary.solution_resistances {
            let _ = writeln!(
                text,
                "{:<ID_WIDTH$}{}",
                row.file_id,
                optional_cell(row.solution_resistance_ohm, 4)
            );
        }
    }

    text.push('\n');
    let cdl = match report.summary.cdl_mf_cm2 {
        Some(cdl) => format_fixed_f64(cdl, VALUE_WIDTH, 4),
        None => format!("{:>VALUE_WIDTH$}  (fewer than 2 Δj values)", "n/a"),
    };
    let _ = writeln!(text, "{:<ID_WIDTH$}{cdl}", "Cdl (mF/cm2)");
    if let Some(fit) = &report.capacitance.fit {
        let _ = writeln!(
            text,
            "{:<ID_WIDTH$}{}",
            "Cdl fit R^2",
            format_fixed_f64(fit.r_squared, VALUE_WIDTH, 4)
        );
    }

    if !report.skipped.is_empty() {
        text.push('\n');
        let _ = writeln!(text, "Skipped records:");
        for skipped in &report.skipped {
            let _ = writeln!(
                text,
                "  {} [{}] {}",
                skipped.name, skipped.placeholder, skipped.reason
            );
        }
    }
    text
}
