use crate::exception::ExceptionInfo;
use crate::severity::Severity;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// `type` value for records that carry no exception.
pub const NO_EXCEPTION_TYPE: &str = "N/A";

/// Normalized identity and trace of the error behind a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionRecord {
    pub type_name: String,
    pub message: String,
    pub backtrace: String,
    /// Set when the event severity is anything but `ERROR`.
    pub error_level: Option<String>,
}

impl ExceptionRecord {
    /// Type and message come from the root reached through passthrough
    /// links; the backtrace is always the outermost exception's.
    pub fn normalize(
        exception: &ExceptionInfo,
        passthrough: &HashSet<String>,
        severity: Severity,
    ) -> Self {
        let root = exception.resolve_root(passthrough);
        ExceptionRecord {
            type_name: root.type_name.clone(),
            message: root.message.clone(),
            backtrace: exception.render_trace(),
            error_level: error_level(severity),
        }
    }

    /// Record for an event without an exception, traced from `frames`.
    pub fn synthesized(message: &str, frames: &[String], severity: Severity) -> Self {
        let mut backtrace = String::new();
        for frame in frames {
            backtrace.push_str(frame);
            backtrace.push('\n');
        }
        ExceptionRecord {
            type_name: NO_EXCEPTION_TYPE.to_string(),
            message: message.to_string(),
            backtrace,
            error_level: error_level(severity),
        }
    }
}

fn error_level(severity: Severity) -> Option<String> {
    if severity == Severity::Error {
        None
    } else {
        Some(severity.as_str().to_string())
    }
}

/// Who is reporting: copied verbatim into every record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecordIdentity {
    pub project: String,
    pub environment: String,
    pub server_name: String,
}

/// The JSON document written to one `.gec.json` file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorRecord {
    pub project: String,
    pub environment: String,
    pub server_name: String,
    pub backtrace: String,
    pub message: String,
    pub log_message: String,
    #[serde(rename = "type")]
    pub error_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_level: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub context: BTreeMap<String, String>,
}

impl ErrorRecord {
    pub fn new(
        identity: &RecordIdentity,
        exception: ExceptionRecord,
        log_message: impl Into<String>,
        context: BTreeMap<String, String>,
    ) -> Self {
        ErrorRecord {
            project: identity.project.clone(),
            environment: identity.environment.clone(),
            server_name: identity.server_name.clone(),
            backtrace: exception.backtrace,
            message: exception.message,
            log_message: log_message.into(),
            error_type: exception.type_name,
            error_level: exception.error_level,
            context,
        }
    }
}
