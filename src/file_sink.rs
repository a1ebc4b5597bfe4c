use crate::ids::{IdStrategy, RecordIdGenerator};
use crate::record::ErrorRecord;
use crate::sink::{RecordSink, SinkError};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Suffix of a finished record file.
pub const RECORD_SUFFIX: &str = ".gec.json";

/// Suffix appended while a record is still being written.
pub const WRITING_SUFFIX: &str = ".writing";

type Encoder = fn(&mut BufWriter<File>, &ErrorRecord) -> serde_json::Result<()>;

fn encode_json(out: &mut BufWriter<File>, record: &ErrorRecord) -> serde_json::Result<()> {
    serde_json::to_writer(out, record)
}

/// Writes each record to its own file in `directory`.
///
/// The record is written to `<id>.gec.json.writing` and renamed to
/// `<id>.gec.json` once the file is complete and closed, so a reader that
/// ignores `.writing` files only ever sees whole documents.
#[derive(Debug)]
pub struct FileSink {
    directory: PathBuf,
    ids: RecordIdGenerator,
}

impl FileSink {
    /// Construct a sink for `directory`. Performs no I/O.
    pub fn new(directory: impl Into<PathBuf>, strategy: IdStrategy) -> Self {
        Self::with_ids(directory, RecordIdGenerator::new(strategy))
    }

    pub fn with_ids(directory: impl Into<PathBuf>, ids: RecordIdGenerator) -> Self {
        FileSink {
            directory: directory.into(),
            ids,
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Create the output directory (and parents) if it does not exist.
    pub fn ensure_directory(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.directory)
    }

    /// Final and temporary paths for a record id.
    pub fn paths_for(&self, id: &str) -> (PathBuf, PathBuf) {
        let final_name = format!("{}{}", id, RECORD_SUFFIX);
        let temp_name = format!("{}{}", final_name, WRITING_SUFFIX);
        (self.directory.join(final_name), self.directory.join(temp_name))
    }

    fn write_temp(path: &Path, record: &ErrorRecord, encode: Encoder) -> Result<(), SinkError> {
        // create_new: an id collision fails here instead of interleaving two writers.
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|source| SinkError::Create {
                path: path.to_path_buf(),
                source,
            })?;

        let mut writer = BufWriter::new(file);
        encode(&mut writer, record).map_err(|source| SinkError::Serialize {
            path: path.to_path_buf(),
            source,
        })?;
        writer.flush().map_err(|source| SinkError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(())
    }
}

impl RecordSink for FileSink {
    fn emit(&self, record: &ErrorRecord) -> Result<Option<PathBuf>, SinkError> {
        self.emit_encoded(record, encode_json)
    }
}

impl FileSink {
    fn emit_encoded(&self, record: &ErrorRecord, encode: Encoder) -> Result<Option<PathBuf>, SinkError> {
        let id = self.ids.next_id();
        let (final_path, temp_path) = self.paths_for(&id);

        if let Err(e) = Self::write_temp(&temp_path, record, encode) {
            // A half-written temp file is useless; the collision case never created one.
            if !matches!(e, SinkError::Create { .. }) {
                let _ = fs::remove_file(&temp_path);
            }
            return Err(e);
        }

        // On failure the temp file stays behind for manual inspection.
        fs::rename(&temp_path, &final_path).map_err(|source| SinkError::Rename {
            from: temp_path.clone(),
            to: final_path.clone(),
            source,
        })?;

        Ok(Some(final_path))
    }
}
