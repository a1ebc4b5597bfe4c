use crate::record::ErrorRecord;
use crate::sink::{RecordSink, SinkError};
use std::path::PathBuf;

/// A sink that simply drops all records.
///
/// Useful for measuring the overhead of normalization and trace capture
/// without any file I/O, and for tests that don't care about persistence.
#[derive(Clone, Default)]
pub struct NoopSink;

impl RecordSink for NoopSink {
    fn emit(&self, _record: &ErrorRecord) -> Result<Option<PathBuf>, SinkError> {
        Ok(None)
    }
}
