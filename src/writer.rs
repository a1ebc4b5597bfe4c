use crate::config::GecConfig;
use crate::event::ErrorEvent;
use crate::exception::ExceptionInfo;
use crate::file_sink::FileSink;
use crate::record::{ErrorRecord, ExceptionRecord, RecordIdentity};
use crate::severity::Severity;
use crate::sink::RecordSink;
use crate::trace;
use crate::types::ErrorTypeRegistry;
use std::collections::HashSet;
use std::error::Error;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Rewrites the normalized exception of a record before it is written.
pub type PrepareException = Arc<dyn Fn(&mut ExceptionRecord) + Send + Sync>;

/// Turns [`ErrorEvent`]s into [`ErrorRecord`]s and hands them to a
/// [`RecordSink`].
///
/// The writer is called synchronously from the logging thread and never
/// returns an error or panics into it: failures are reported on stderr,
/// counted in `failed_records`, and the event is dropped.
pub struct ErrorRecordWriter {
    identity: RecordIdentity,
    threshold: Severity,
    passthrough: HashSet<String>,
    types: ErrorTypeRegistry,
    sink: Arc<dyn RecordSink>,
    prepare_exception: Option<PrepareException>,
    /// Records handed to the sink successfully.
    pub written_records: Arc<AtomicU64>,
    /// Records dropped because the sink failed.
    pub failed_records: Arc<AtomicU64>,
    /// Events below the threshold without an exception.
    pub skipped_events: Arc<AtomicU64>,
}

impl ErrorRecordWriter {
    /// Build a writer that emits into `config.output_directory`.
    ///
    /// Pure setup: no directory is created and nothing is written.
    /// Passthrough names that don't resolve against `types` are reported
    /// and skipped.
    pub fn configure(config: &GecConfig, types: ErrorTypeRegistry) -> Self {
        let sink = FileSink::new(&config.output_directory, config.id_strategy);
        Self::with_sink(config, types, Arc::new(sink))
    }

    /// Like [`configure`](Self::configure) with a custom sink.
    pub fn with_sink(config: &GecConfig, types: ErrorTypeRegistry, sink: Arc<dyn RecordSink>) -> Self {
        let mut writer = ErrorRecordWriter {
            identity: RecordIdentity {
                project: config.project.clone(),
                environment: config.environment.clone(),
                server_name: config.server_name.clone(),
            },
            threshold: config.threshold,
            passthrough: HashSet::new(),
            types,
            sink,
            prepare_exception: None,
            written_records: Arc::new(AtomicU64::new(0)),
            failed_records: Arc::new(AtomicU64::new(0)),
            skipped_events: Arc::new(AtomicU64::new(0)),
        };

        for name in &config.passthrough_types {
            if !writer.add_passthrough_type(name) {
                eprintln!("gec: unknown passthrough error type `{}`, ignoring", name);
            }
        }
        writer
    }

    /// Mark a registered error type as passthrough by name.
    ///
    /// **Returns**
    /// - `true` if `name` resolved against the type registry.
    /// - `false` otherwise; the writer is left unchanged.
    pub fn add_passthrough_type(&mut self, name: &str) -> bool {
        match self.types.resolve(name) {
            Some(ty) => {
                self.passthrough.insert(ty.name().to_string());
                true
            }
            None => false,
        }
    }

    /// Register `E` and mark it as passthrough.
    pub fn add_passthrough<E: Error + 'static>(&mut self) {
        let name = self.types.register::<E>();
        self.passthrough.insert(name.to_string());
    }

    /// Run `hook` on every record built from an exception, after
    /// passthrough resolution. Events without an exception are untouched.
    pub fn set_prepare_exception<F>(&mut self, hook: F)
    where
        F: Fn(&mut ExceptionRecord) + Send + Sync + 'static,
    {
        self.prepare_exception = Some(Arc::new(hook));
    }

    pub fn is_passthrough(&self, type_name: &str) -> bool {
        self.passthrough.contains(type_name)
    }

    pub fn threshold(&self) -> Severity {
        self.threshold
    }

    /// Whether an event would produce a record.
    pub fn accepts(&self, severity: Severity, has_exception: bool) -> bool {
        has_exception || severity >= self.threshold
    }

    /// Convert an error and its sources into an exception chain named by
    /// this writer's type registry.
    pub fn exception_from_error(&self, err: &(dyn Error + 'static)) -> ExceptionInfo {
        ExceptionInfo::from_error(err, &self.types)
    }

    /// Build the record for `event`, or `None` when it is filtered out.
    ///
    /// Events without an exception get a trace of the current call stack.
    pub fn build_record(&self, event: &ErrorEvent) -> Option<ErrorRecord> {
        if !self.accepts(event.severity, event.exception.is_some()) {
            return None;
        }

        let exception = match &event.exception {
            Some(exception) => {
                let mut record = ExceptionRecord::normalize(exception, &self.passthrough, event.severity);
                if let Some(prepare) = &self.prepare_exception {
                    prepare(&mut record);
                }
                record
            }
            None => ExceptionRecord::synthesized(
                &event.message,
                &trace::capture_frames(),
                event.severity,
            ),
        };

        Some(ErrorRecord::new(
            &self.identity,
            exception,
            event.message.clone(),
            event.context.clone(),
        ))
    }

    /// Write one record for `event`.
    ///
    /// **Returns**
    /// - `true` when the sink accepted the record.
    /// - `false` when the event was filtered out or the sink failed.
    pub fn on_event(&self, event: ErrorEvent) -> bool {
        let Some(record) = self.build_record(&event) else {
            self.skipped_events.fetch_add(1, Ordering::Relaxed);
            return false;
        };

        match self.sink.emit(&record) {
            Ok(_) => {
                self.written_records.fetch_add(1, Ordering::Relaxed);
                true
            }
            Err(e) => {
                self.failed_records.fetch_add(1, Ordering::Relaxed);
                eprintln!("gec: dropping error record: {}", e);
                false
            }
        }
    }
}
