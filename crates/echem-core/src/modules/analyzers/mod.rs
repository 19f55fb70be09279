//! [`RecordAnalyzer`](super::traits::RecordAnalyzer) implementations, one per
//! record kind.

mod cv;
mod eis;
mod lsv;

pub use cv::{CvAnalyzer, CvRecordResult};
pub use eis::{EisAnalyzer, EisRecordResult};
pub use lsv::{LsvAnalyzer, LsvRecordResult};
