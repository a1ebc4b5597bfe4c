use crate::event::ErrorEvent;
use crate::exception::ExceptionInfo;
use crate::severity::Severity;
use crate::trace;
use crate::writer::ErrorRecordWriter;
use std::sync::Arc;

/// `type` of records produced for panics.
pub const PANIC_TYPE: &str = "panic";

/// Record every panic through `writer`, then run the previously installed
/// hook (by default the one printing the panic to stderr).
pub fn install_panic_hook(writer: Arc<ErrorRecordWriter>) {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let payload = info.payload();
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "Box<dyn Any>".to_string()
        };

        let thread = std::thread::current();
        let thread_name = thread.name().unwrap_or("<unnamed>");
        let log_message = match info.location() {
            Some(location) => format!("thread '{}' panicked at {}", thread_name, location),
            None => format!("thread '{}' panicked", thread_name),
        };

        let exception = ExceptionInfo::new(PANIC_TYPE, message).with_frames(trace::capture_frames());
        writer.on_event(
            ErrorEvent::new(Severity::Error, log_message)
                .with_exception(exception)
                .with_thread_context(),
        );

        previous(info);
    }));
}
