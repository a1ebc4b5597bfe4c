use crate::context;
use crate::exception::ExceptionInfo;
use crate::severity::Severity;
use std::collections::BTreeMap;

/// A log event normalized away from any particular logging library.
///
/// Adapters (the `tracing` layer, the panic hook) build one of these and
/// hand it to [`ErrorRecordWriter::on_event`](crate::writer::ErrorRecordWriter::on_event).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorEvent {
    pub severity: Severity,
    /// The rendered message of the log call.
    pub message: String,
    pub exception: Option<ExceptionInfo>,
    pub context: BTreeMap<String, String>,
}

impl ErrorEvent {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        ErrorEvent {
            severity,
            message: message.into(),
            exception: None,
            context: BTreeMap::new(),
        }
    }

    pub fn with_exception(mut self, exception: ExceptionInfo) -> Self {
        self.exception = Some(exception);
        self
    }

    /// Merge `context` into the event; existing keys are overwritten.
    pub fn with_context(mut self, context: BTreeMap<String, String>) -> Self {
        self.context.extend(context);
        self
    }

    /// Merge the current thread's [`context`] under the event's own entries.
    pub fn with_thread_context(mut self) -> Self {
        let mut merged = context::snapshot();
        merged.append(&mut self.context);
        self.context = merged;
        self
    }
}
