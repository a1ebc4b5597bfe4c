use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use tracing_gec_sink::config::GecConfig;
use tracing_gec_sink::context;
use tracing_gec_sink::event::ErrorEvent;
use tracing_gec_sink::exception::ExceptionInfo;
use tracing_gec_sink::file_sink::{RECORD_SUFFIX, WRITING_SUFFIX};
use tracing_gec_sink::ids::IdStrategy;
use tracing_gec_sink::layer::GecLayer;
use tracing_gec_sink::severity::Severity;
use tracing_gec_sink::types::ErrorTypeRegistry;
use tracing_gec_sink::writer::ErrorRecordWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

#[derive(Debug, thiserror::Error)]
#[error("reflective call failed")]
struct InvocationError(#[source] std::num::ParseIntError);

fn writer_for(dir: &Path) -> ErrorRecordWriter {
    let config = GecConfig::new("secretTown", "prod", "secretTown FE 1", dir);
    ErrorRecordWriter::configure(&config, ErrorTypeRegistry::default())
}

fn files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    files.sort();
    files
}

fn read_single(dir: &Path) -> Value {
    let files = files(dir);
    assert_eq!(files.len(), 1, "expected exactly one record, got {:?}", files);
    serde_json::from_str(&fs::read_to_string(&files[0]).unwrap()).unwrap()
}

fn keys(value: &Value) -> BTreeSet<String> {
    value.as_object().unwrap().keys().cloned().collect()
}

#[test]
fn non_exception_backtrace_names_the_caller() {
    let dir = tempfile::tempdir().unwrap();
    let writer = writer_for(dir.path());

    assert!(writer.on_event(ErrorEvent::new(Severity::Error, "Error while rendering request")));

    let record = read_single(dir.path());
    assert_eq!(record["type"], "N/A");
    assert_eq!(record["message"], "Error while rendering request");
    assert_eq!(record["logMessage"], "Error while rendering request");
    let backtrace = record["backtrace"].as_str().unwrap();
    assert!(backtrace.contains("non_exception_backtrace_names_the_caller"), "{backtrace}");
    assert!(!backtrace.contains("ErrorRecordWriter::on_event"), "{backtrace}");
    assert!(!backtrace.contains("ErrorRecordWriter::build_record"), "{backtrace}");
    assert!(!backtrace.contains("capture_frames"), "{backtrace}");
}

#[test]
fn exception_record_reports_the_exception() {
    let dir = tempfile::tempdir().unwrap();
    let writer = writer_for(dir.path());
    let exception = ExceptionInfo::new("app::IllegalArgument", "Illegal in 50 states")
        .with_frames(vec!["app::render (src/render.rs:12:9)".to_string()]);

    writer.on_event(
        ErrorEvent::new(Severity::Error, "Error while rendering request").with_exception(exception.clone()),
    );

    let record = read_single(dir.path());
    assert_eq!(record["project"], "secretTown");
    assert_eq!(record["environment"], "prod");
    assert_eq!(record["serverName"], "secretTown FE 1");
    assert_eq!(record["type"], "app::IllegalArgument");
    assert_eq!(record["message"], "Illegal in 50 states");
    assert_eq!(record["logMessage"], "Error while rendering request");
    assert_eq!(record["backtrace"], exception.render_trace());
    assert_eq!(
        keys(&record),
        ["backtrace", "environment", "logMessage", "message", "project", "serverName", "type"]
            .iter()
            .map(|k| k.to_string())
            .collect::<BTreeSet<String>>()
    );
}

#[test]
fn passthrough_wrapper_reports_cause_with_outer_backtrace() {
    let dir = tempfile::tempdir().unwrap();
    let mut writer = writer_for(dir.path());
    writer.add_passthrough::<InvocationError>();

    let err = InvocationError("forty-two".parse::<i64>().unwrap_err());
    let exception = writer
        .exception_from_error(&err)
        .with_frames(vec!["app::invoke_handler".to_string()]);
    writer.on_event(ErrorEvent::new(Severity::Error, "handler blew up").with_exception(exception.clone()));

    let record = read_single(dir.path());
    assert_eq!(record["type"], "std::num::ParseIntError");
    assert_eq!(record["message"], "invalid digit found in string");
    let backtrace = record["backtrace"].as_str().unwrap();
    assert_eq!(backtrace, exception.render_trace());
    assert!(backtrace.contains("InvocationError: reflective call failed\n"));
    assert!(backtrace.contains("Caused by: std::num::ParseIntError"));
}

#[test]
fn passthrough_configured_by_name_unwraps_io_errors() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = GecConfig::new("secretTown", "prod", "secretTown FE 1", dir.path());
    config.passthrough_types = vec!["std::io::Error".to_string()];
    let writer = ErrorRecordWriter::configure(&config, ErrorTypeRegistry::default());

    let err = std::io::Error::other("12a".parse::<u16>().unwrap_err());
    let exception = writer
        .exception_from_error(&err)
        .with_frames(vec!["app::read_port (src/config.rs:40:5)".to_string()]);
    writer.on_event(ErrorEvent::new(Severity::Error, "bad port in config").with_exception(exception.clone()));

    let record = read_single(dir.path());
    assert_eq!(record["type"], "std::num::ParseIntError");
    assert_eq!(record["message"], "invalid digit found in string");
    assert_eq!(record["logMessage"], "bad port in config");
    let backtrace = record["backtrace"].as_str().unwrap();
    assert_eq!(backtrace, exception.render_trace());
    assert!(backtrace.starts_with("std::io::Error: invalid digit found in string\n\tat app::read_port"));
    assert!(backtrace.contains("Caused by: std::num::ParseIntError"));
}

#[test]
fn below_threshold_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let writer = writer_for(dir.path());

    assert!(!writer.on_event(ErrorEvent::new(Severity::Warn, "cache miss storm")));
    assert!(!writer.on_event(ErrorEvent::new(Severity::Info, "started")));
    assert!(files(dir.path()).is_empty());
}

#[test]
fn thread_context_lands_in_record() {
    let dir = tempfile::tempdir().unwrap();
    let writer = writer_for(dir.path());

    context::clear();
    context::put("requestId", "abc");
    writer.on_event(ErrorEvent::new(Severity::Error, "with context").with_thread_context());
    let record = read_single(dir.path());
    assert_eq!(record["context"], serde_json::json!({ "requestId": "abc" }));

    for file in files(dir.path()) {
        fs::remove_file(file).unwrap();
    }

    context::clear();
    writer.on_event(ErrorEvent::new(Severity::Error, "without context").with_thread_context());
    let record = read_single(dir.path());
    assert!(record.get("context").is_none());
}

#[test]
fn fatal_events_carry_error_level() {
    let dir = tempfile::tempdir().unwrap();
    let writer = writer_for(dir.path());
    writer.on_event(ErrorEvent::new(Severity::Fatal, "out of memory"));

    let record = read_single(dir.path());
    assert_eq!(record["errorLevel"], "FATAL");
    assert_eq!(keys(&record).len(), 8);
}

#[test]
fn concurrent_events_produce_distinct_files() {
    for strategy in [IdStrategy::Sequential, IdStrategy::Uuid] {
        let dir = tempfile::tempdir().unwrap();
        let mut config = GecConfig::new("p", "e", "s", dir.path());
        config.id_strategy = strategy;
        let writer = Arc::new(ErrorRecordWriter::configure(&config, ErrorTypeRegistry::default()));

        let threads = 8;
        let per_thread = 25;
        std::thread::scope(|scope| {
            for t in 0..threads {
                let writer = Arc::clone(&writer);
                scope.spawn(move || {
                    for i in 0..per_thread {
                        assert!(writer.on_event(ErrorEvent::new(Severity::Error, format!("thread {t} event {i}"))));
                    }
                });
            }
        });

        let files = files(dir.path());
        assert_eq!(files.len(), threads * per_thread);
        for file in &files {
            let name = file.file_name().unwrap().to_string_lossy();
            assert!(name.ends_with(RECORD_SUFFIX), "{name}");
            assert!(!name.ends_with(WRITING_SUFFIX), "{name}");
            let _: Value = serde_json::from_str(&fs::read_to_string(file).unwrap()).unwrap();
        }
    }
}

#[test]
fn layer_writes_record_files() {
    let dir = tempfile::tempdir().unwrap();
    let writer = Arc::new(writer_for(dir.path()));
    let subscriber = Registry::default().with(GecLayer::new(Arc::clone(&writer)));

    tracing::subscriber::with_default(subscriber, || {
        let span = tracing::error_span!("request", path = "/checkout");
        let _entered = span.enter();
        tracing::info!("not recorded");
        let err = "NaN".parse::<u8>().unwrap_err();
        tracing::error!(error = &err as &dyn std::error::Error, "could not parse quantity");
    });

    let record = read_single(dir.path());
    assert_eq!(record["type"], "std::num::ParseIntError");
    assert_eq!(record["logMessage"], "could not parse quantity");
    assert_eq!(record["context"]["path"], "/checkout");
    assert!(record["backtrace"]
        .as_str()
        .unwrap()
        .contains("layer_writes_record_files"));
}
