use crate::config::GecConfig;
use crate::file_sink::FileSink;
use crate::layer::GecLayer;
use crate::panic::install_panic_hook;
use crate::types::ErrorTypeRegistry;
use crate::writer::ErrorRecordWriter;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Options for the global subscriber installed by [`init_tracing_with_config`].
///
/// **Fields**
/// - `enable_stdout`: if `true`, a `tracing_subscriber::fmt::Layer` is added
///   next to [`GecLayer`] so events are also printed to the console.
/// - `capture_panics`: if `true`, [`install_panic_hook`] records panics
///   through the same writer.
#[derive(Clone, Debug)]
pub struct LayerConfig {
    pub enable_stdout: bool,
    pub capture_panics: bool,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            enable_stdout: true,
            capture_panics: true,
        }
    }
}

/// Error returned by [`init_tracing`] and [`init_tracing_with_config`].
#[derive(thiserror::Error, Debug)]
pub enum InitError {
    #[error("could not create output directory {}: {source}", .path.display())]
    OutputDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    SetGlobalDefault(#[from] SetGlobalDefaultError),
}

/// Initialize the global `tracing` subscriber with a [`GecLayer`].
///
/// **Parameters**
/// - `config`: writer configuration; its output directory is created if
///   missing.
/// - `types`: error types known to the writer, including any passthrough
///   types named in `config`.
/// - `layer_config`: console output and panic capture toggles.
///
/// **Returns**
/// - The shared writer, so callers can inspect its counters.
/// - `Err(..)` if the directory cannot be created or a global subscriber
///   is already installed.
pub fn init_tracing_with_config(
    config: &GecConfig,
    types: ErrorTypeRegistry,
    layer_config: LayerConfig,
) -> Result<Arc<ErrorRecordWriter>, InitError> {
    let sink = FileSink::new(&config.output_directory, config.id_strategy);
    sink.ensure_directory().map_err(|source| InitError::OutputDirectory {
        path: config.output_directory.clone(),
        source,
    })?;

    let writer = Arc::new(ErrorRecordWriter::with_sink(config, types, Arc::new(sink)));
    let layer = GecLayer::new(Arc::clone(&writer));

    // The two subscriber shapes have different types, so each branch installs its own.
    if layer_config.enable_stdout {
        let fmt_layer = tracing_subscriber::fmt::layer();
        let subscriber = Registry::default().with(layer).with(fmt_layer);
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = Registry::default().with(layer);
        tracing::subscriber::set_global_default(subscriber)?;
    }

    if layer_config.capture_panics {
        install_panic_hook(Arc::clone(&writer));
    }

    Ok(writer)
}

/// Initialize tracing with sensible defaults.
///
/// Equivalent to [`init_tracing_with_config`] with the default
/// [`ErrorTypeRegistry`] and [`LayerConfig::default`]. This is the
/// recommended entrypoint for typical services.
pub fn init_tracing(config: &GecConfig) -> Result<Arc<ErrorRecordWriter>, InitError> {
    init_tracing_with_config(config, ErrorTypeRegistry::default(), LayerConfig::default())
}
