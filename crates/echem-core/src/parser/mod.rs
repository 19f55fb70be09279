//! Text-record parsing for instrument exports.
//!
//! Parsers never fail on malformed content: they log what they skipped and
//! hand back whatever samples they could recover, possibly none.

pub mod classify;
pub mod impedance;
pub mod voltammetry;

pub use classify::{classify_header, classify_record};
pub use impedance::{IMPEDANCE_HEADERS, ImpedanceBlock, parse_impedance_spectrum, scan_impedance_block};
pub use voltammetry::{
    VoltammetryRecord, extract_file_id, extract_scan_rate, parse_voltammetry_record,
    parse_voltammogram,
};

use regex::Regex;
use std::borrow::Cow;

/// Decodes raw bytes, replacing undecodable sequences instead of failing.
pub fn decode_lossy(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}

pub(crate) fn compile_pattern(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(regex) => Some(regex),
        Err(error) => {
            tracing::error!(pattern, %error, "built-in record pattern failed to compile");
            None
        }
    }
}

pub(crate) fn parse_float(token: &str) -> Option<f64> {
    token.trim().parse::<f64>().ok()
}
