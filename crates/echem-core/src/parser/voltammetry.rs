use super::{compile_pattern, parse_float};
use crate::domain::{ScanMetadata, Voltammogram};
use regex::Regex;
use std::sync::LazyLock;

const DATA_MARKER: &str = "Potential/V, Current/A";

static SCAN_RATE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"Scan Rate \(V/s\) = ([\d.]+)",
        r"[Ss]can [Rr]ate\s*[:=]\s*([\d.]+)\s*[Vv]/s",
    ]
    .into_iter()
    .filter_map(compile_pattern)
    .collect()
});

static FILE_ID_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile_pattern(r"File:\s*([^\r\n,]+)"));

static NUMERIC_PAIR_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile_pattern(r"(-?\d+\.?\d*)\s*,\s*(-?\d+\.?\d*)"));

#[derive(Debug, Clone, PartialEq, Default)]
pub struct VoltammetryRecord {
    pub samples: Voltammogram,
    pub metadata: ScanMetadata,
    pub file_id: Option<String>,
}

pub fn parse_voltammetry_record(content: &str) -> VoltammetryRecord {
    VoltammetryRecord {
        samples: parse_voltammogram(content),
        metadata: ScanMetadata {
            scan_rate_mv_per_s: extract_scan_rate(content),
        },
        file_id: extract_file_id(content),
    }
}

/// Scan rate in mV/s, rounded half-to-even from the labelled V/s value.
pub fn extract_scan_rate(content: &str) -> Option<u32> {
    SCAN_RATE_PATTERNS.iter().find_map(|pattern| {
        let token = pattern.captures(content)?.get(1)?.as_str();
        let volts_per_second = token.parse::<f64>().ok()?;
        let millivolts = (volts_per_second * 1000.0).round_ties_even();
        (millivolts.is_finite() && millivolts >= 0.0 && millivolts <= f64::from(u32::MAX))
            .then_some(millivolts as u32)
    })
}

pub fn extract_file_id(content: &str) -> Option<String> {
    let pattern = FILE_ID_PATTERN.as_ref()?;
    let id = pattern.captures(content)?.get(1)?.as_str().trim();
    (!id.is_empty()).then(|| id.to_string())
}

pub fn parse_voltammogram(content: &str) -> Voltammogram {
    match locate_data_block(content) {
        DataBlock::Section(section) => parse_data_lines(section),
        DataBlock::PairScan => scan_numeric_pairs(content),
    }
}

enum DataBlock<'a> {
    Section(&'a str),
    PairScan,
}

fn locate_data_block(content: &str) -> DataBlock<'_> {
    if let Some(section) = content.split(DATA_MARKER).nth(1) {
        return DataBlock::Section(section);
    }

    let trimmed = content.trim();
    let mut offset = 0;
    for line in trimmed.split_inclusive('\n') {
        offset += line.len();
        let lowered = line.to_ascii_lowercase();
        if lowered.contains("potential") && lowered.contains("current") {
            let rest = &trimmed[offset..];
            if rest.is_empty() {
                break;
            }
            tracing::debug!(header = line.trim(), "located voltammetry column header");
            return DataBlock::Section(rest);
        }
    }

    tracing::debug!("no voltammetry column header, scanning for numeric pairs");
    DataBlock::PairScan
}

fn split_fields(line: &str) -> Vec<&str> {
    if line.contains(',') {
        line.split(',').collect()
    } else if line.contains('\t') {
        line.split('\t').collect()
    } else {
        line.split_whitespace().collect()
    }
}

fn parse_data_lines(section: &str) -> Voltammogram {
    let mut skipped = 0_usize;
    let samples = Voltammogram::from_pairs(section.lines().filter_map(|line| {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let fields = split_fields(line);
        let pair = match fields.as_slice() {
            [potential, current, ..] => parse_float(potential).zip(parse_float(current)),
            _ => None,
        };
        if pair.is_none() {
            skipped += 1;
        }
        pair
    }));

    tracing::debug!(
        accepted = samples.len(),
        skipped,
        "parsed voltammetry data lines"
    );
    samples
}

fn scan_numeric_pairs(content: &str) -> Voltammogram {
    let Some(pattern) = NUMERIC_PAIR_PATTERN.as_ref() else {
        return Voltammogram::default();
    };
    Voltammogram::from_pairs(pattern.captures_iter(content).filter_map(|captures| {
        let potential = parse_float(captures.get(1)?.as_str())?;
        let current = parse_float(captures.get(2)?.as_str())?;
        Some((potential, current))
    }))
}
