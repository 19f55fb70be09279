use super::parse_float;
use crate::domain::ImpedanceSpectrum;

/// Column headers that open the impedance data block.
pub const IMPEDANCE_HEADERS: [&str; 5] = [
    "Freq/Hz, Z'/ohm, Z\"/ohm",
    "Frequency/Hz,Z'/ohm,Z\"/ohm",
    "Freq,Z',Z\"",
    "Frequency,Zreal,Zimag",
    "f/Hz,Z'/Ω,Z\"/Ω",
];

/// Data block of an impedance export.
///
/// `data_lines` holds the accepted lines verbatim (trimmed) and is what the
/// ZView export writes out.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImpedanceBlock<'a> {
    pub header_found: bool,
    pub spectrum: ImpedanceSpectrum,
    pub data_lines: Vec<&'a str>,
}

impl ImpedanceBlock<'_> {
    pub fn zview_text(&self) -> String {
        let mut text = String::new();
        for line in &self.data_lines {
            text.push_str(line);
            text.push('\n');
        }
        text
    }
}

/// Scans `content` for the impedance block.
///
/// Nothing is read before one of [`IMPEDANCE_HEADERS`] appears. After it,
/// blank and comment lines (`//`, `#`) and lines with fewer than three comma
/// fields are passed over, and the first line whose leading three fields do
/// not all parse as numbers ends the block.
pub fn scan_impedance_block(content: &str) -> ImpedanceBlock<'_> {
    let mut block = ImpedanceBlock::default();

    for line in content.lines() {
        let line = line.trim();
        if !block.header_found {
            if IMPEDANCE_HEADERS.iter().any(|header| line.contains(header)) {
                tracing::debug!(header = line, "located impedance column header");
                block.header_found = true;
            }
            continue;
        }

        if line.is_empty() || line.starts_with("//") || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split(',').collect();
        let [frequency, z_real, z_imag, ..] = fields.as_slice() else {
            continue;
        };
        match (parse_float(frequency), parse_float(z_real), parse_float(z_imag)) {
            (Some(frequency), Some(z_real), Some(z_imag)) => {
                block.spectrum.push(frequency, z_real, z_imag);
                block.data_lines.push(line);
            }
            _ => {
                tracing::debug!(line, "impedance block ends at first unparsable line");
                break;
            }
        }
    }

    if !block.header_found {
        tracing::warn!("no impedance column header found");
    } else if block.spectrum.is_empty() {
        tracing::warn!("impedance header found but no data rows followed");
    }
    block
}

pub fn parse_impedance_spectrum(content: &str) -> ImpedanceSpectrum {
    scan_impedance_block(content).spectrum
}
