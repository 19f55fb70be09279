use super::decode_lossy;
use crate::domain::RecordKind;

struct KindRule {
    kind: RecordKind,
    markers: &'static [&'static str],
    exclusions: &'static [&'static str],
}

const KIND_RULES: [KindRule; 3] = [
    KindRule {
        kind: RecordKind::CyclicVoltammetry,
        markers: &["Cyclic Voltammetry", "CYCLIC VOLTAMMETRY"],
        exclusions: &[
            "Linear Sweep Voltammetry",
            "A.C. Impedance",
            "LSV",
            "Chronoamperometry",
            "Open Circuit",
            "EIS",
            "Tafel",
        ],
    },
    KindRule {
        kind: RecordKind::LinearSweepVoltammetry,
        markers: &["Linear Sweep Voltammetry", "LINEAR SWEEP VOLTAMMETRY", "LSV"],
        exclusions: &[
            "Cyclic Voltammetry",
            "A.C. Impedance",
            "CV",
            "Chronoamperometry",
            "Open Circuit",
            "EIS",
            "Tafel",
        ],
    },
    KindRule {
        kind: RecordKind::Impedance,
        markers: &["A.C. Impedance", "Electrochemical Impedance", "EIS"],
        exclusions: &[],
    },
];

/// Keyword sniffing over the leading text of an export.
///
/// Rules are tried in CV, LSV, impedance order and the first hit wins.
pub fn classify_header(header: &str) -> Option<RecordKind> {
    KIND_RULES
        .iter()
        .find(|rule| {
            rule.markers.iter().any(|marker| header.contains(marker))
                && !rule.exclusions.iter().any(|keyword| header.contains(keyword))
        })
        .map(|rule| rule.kind)
}

pub fn classify_record(bytes: &[u8], sniff_bytes: usize) -> Option<RecordKind> {
    let end = bytes.len().min(sniff_bytes);
    classify_header(&decode_lossy(&bytes[..end]))
}
