use crate::domain::{AnalysisResult, RecordKind, SourceRecord};

/// Per-kind analysis of one classified record.
///
/// An `Err` excludes the record from the batch; it never aborts other records.
pub trait RecordAnalyzer {
    type Output;

    fn kind(&self) -> RecordKind;

    fn analyze(&self, record: &SourceRecord) -> AnalysisResult<Self::Output>;
}

/// Hook for observing batch progress. All methods default to no-ops.
pub trait BatchObserver {
    fn record_started(&self, _index: usize, _total: usize, _name: &str) {}

    fn record_skipped(&self, _name: &str, _reason: &str) {}

    fn batch_finished(&self) {}
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentObserver;

impl BatchObserver for SilentObserver {}

#[cfg(test)]
mod tests {
    use super::RecordAnalyzer;
    use crate::domain::{
        AnalysisResult, EchemError, EchemErrorCategory, RecordKind, SourceRecord,
    };

    struct RejectingAnalyzer;

    impl RecordAnalyzer for RejectingAnalyzer {
        type Output = ();

        fn kind(&self) -> RecordKind {
            RecordKind::Impedance
        }

        fn analyze(&self, record: &SourceRecord) -> AnalysisResult<()> {
            Err(EchemError::input_validation(
                "INPUT.NO_DATA_BLOCK",
                format!("'{}' has no data block", record.name),
            ))
        }
    }

    #[test]
    fn analyzers_report_exclusions_through_shared_error_type() {
        let record = SourceRecord::new("empty.txt", Vec::new());
        let error = RejectingAnalyzer
            .analyze(&record)
            .expect_err("analyzer should reject empty record");

        assert_eq!(RejectingAnalyzer.kind(), RecordKind::Impedance);
        assert_eq!(error.category(), EchemErrorCategory::InputValidationError);
        assert_eq!(error.placeholder(), "INPUT.NO_DATA_BLOCK");
        assert!(error.message().contains("empty.txt"));
    }
}
