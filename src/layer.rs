use crate::context;
use crate::event::ErrorEvent;
use crate::exception::ExceptionInfo;
use crate::severity::Severity;
use crate::trace;
use crate::writer::ErrorRecordWriter;
use std::collections::BTreeMap;
use std::error::Error;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id, Record};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// `tracing_subscriber` layer that turns error events into `.gec.json`
/// records through an [`ErrorRecordWriter`].
///
/// An event produces a record when it carries an error field (recorded
/// with `record_error`, e.g. `error = &err as &dyn Error`) or when its
/// level is at or above the writer's threshold. Everything runs on the
/// logging thread; there is no queue.
///
/// Record context is assembled from the thread-local [`context`] store,
/// the fields of every span in the event's scope (root first) and the
/// event's own fields, later sources overriding earlier ones.
pub struct GecLayer {
    writer: Arc<ErrorRecordWriter>,
    /// Total events seen by the layer (before filtering by level).
    pub total_events: Arc<AtomicU64>,
}

impl GecLayer {
    pub fn new(writer: Arc<ErrorRecordWriter>) -> Self {
        GecLayer {
            writer,
            total_events: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn writer(&self) -> &Arc<ErrorRecordWriter> {
        &self.writer
    }
}

/// Span fields stored in the span's extensions.
struct SpanFields(BTreeMap<String, String>);

impl<S> Layer<S> for GecLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else { return };
        let mut fields = BTreeMap::new();
        attrs.record(&mut StringVisitor { fields: &mut fields });
        span.extensions_mut().insert(SpanFields(fields));
    }

    fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else { return };
        let mut extensions = span.extensions_mut();
        if let Some(SpanFields(fields)) = extensions.get_mut::<SpanFields>() {
            values.record(&mut StringVisitor { fields });
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        self.total_events.fetch_add(1, Ordering::Relaxed);

        let meta = event.metadata();
        let severity = Severity::from(meta.level());

        let mut visitor = EventVisitor {
            writer: &self.writer,
            fields: BTreeMap::new(),
            message: None,
            exception: None,
        };
        event.record(&mut visitor);

        // Skip context assembly and stack capture for events that would be dropped anyway.
        if !self.writer.accepts(severity, visitor.exception.is_some()) {
            return;
        }

        let mut context = context::snapshot();
        if let Some(scope) = ctx.event_scope(event) {
            for span in scope.from_root() {
                if let Some(SpanFields(fields)) = span.extensions().get::<SpanFields>() {
                    context.extend(fields.iter().map(|(k, v)| (k.clone(), v.clone())));
                }
            }
        }
        context.append(&mut visitor.fields);

        let message = visitor.message.unwrap_or_else(|| meta.name().to_string());
        let mut error_event = ErrorEvent::new(severity, message).with_context(context);
        if let Some(exception) = visitor.exception {
            error_event = error_event.with_exception(exception.with_frames(trace::capture_frames()));
        }

        self.writer.on_event(error_event);
    }
}

/// Records every field as a string.
struct StringVisitor<'a> {
    fields: &'a mut BTreeMap<String, String>,
}

impl<'a> Visit for StringVisitor<'a> {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.fields.insert(field.name().to_string(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.fields.insert(field.name().to_string(), format!("{:?}", value));
    }
}

/// Splits an event into message, first error field and remaining fields.
struct EventVisitor<'a> {
    writer: &'a ErrorRecordWriter,
    fields: BTreeMap<String, String>,
    message: Option<String>,
    exception: Option<ExceptionInfo>,
}

impl<'a> Visit for EventVisitor<'a> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.fields.insert(field.name().to_string(), value.to_string());
        }
    }

    fn record_error(&mut self, field: &Field, value: &(dyn Error + 'static)) {
        if self.exception.is_none() {
            self.exception = Some(self.writer.exception_from_error(value));
        } else {
            self.fields.insert(field.name().to_string(), value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{:?}", value));
        } else {
            self.fields.insert(field.name().to_string(), format!("{:?}", value));
        }
    }
}
