use crate::record::ErrorRecord;
use std::error::Error;
use std::path::PathBuf;

/// Synchronous destination for [`ErrorRecord`]s produced by the writer.
///
/// Implementations are called on whatever thread logged the event, so
/// they must be cheap to share and must not block beyond ordinary file I/O.
/// The writer never retries: an `Err` means the record is dropped.
pub trait RecordSink: Send + Sync {
    /// Persist a single record.
    ///
    /// **Returns**
    /// - `Ok(Some(path))` when the record landed in a file at `path`.
    /// - `Ok(None)` when the record was accepted without a file.
    /// - `Err(..)` if the record could not be persisted.
    fn emit(&self, record: &ErrorRecord) -> Result<Option<PathBuf>, SinkError>;
}

/// Error returned by a [`RecordSink`].
#[derive(thiserror::Error, Debug)]
pub enum SinkError {
    #[error("could not create {}: {source}", .path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not serialize record into {}: {source}", .path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not rename {} to {}: {source}", .from.display(), .to.display())]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Other(Box<dyn Error + Send + Sync>),
}
