use crate::env::*;
use crate::ids::{IdStrategy, ParseIdStrategyError};
use crate::severity::{ParseSeverityError, Severity};
use serde::Deserialize;
use std::path::PathBuf;

/// Configuration for [`ErrorRecordWriter`](crate::writer::ErrorRecordWriter).
///
/// Deserializable so it can live in the host application's own config
/// file; `threshold`, `id_strategy` and `passthrough_types` are optional.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GecConfig {
    pub project: String,
    pub environment: String,
    pub server_name: String,
    pub output_directory: PathBuf,
    /// Wrapper error types reported through their cause.
    #[serde(default)]
    pub passthrough_types: Vec<String>,
    /// Events without an error below this severity are ignored.
    #[serde(default)]
    pub threshold: Severity,
    #[serde(default)]
    pub id_strategy: IdStrategy,
}

/// Error returned when loading a [`GecConfig`] from the environment.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),

    #[error("invalid GEC_THRESHOLD: {0}")]
    InvalidSeverity(#[from] ParseSeverityError),

    #[error("invalid GEC_ID_STRATEGY: {0}")]
    InvalidIdStrategy(#[from] ParseIdStrategyError),
}

impl GecConfig {
    /// Config with the default threshold (`ERROR`), sequential ids and no
    /// passthrough types.
    pub fn new(
        project: impl Into<String>,
        environment: impl Into<String>,
        server_name: impl Into<String>,
        output_directory: impl Into<PathBuf>,
    ) -> Self {
        GecConfig {
            project: project.into(),
            environment: environment.into(),
            server_name: server_name.into(),
            output_directory: output_directory.into(),
            passthrough_types: Vec::new(),
            threshold: Severity::default(),
            id_strategy: IdStrategy::default(),
        }
    }

    /// Load from the `GEC_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through an arbitrary variable lookup.
    ///
    /// `GEC_PROJECT` and `GEC_OUTPUT_DIR` are required; `GEC_ENVIRONMENT`
    /// defaults to `dev` and `GEC_SERVER_NAME` to `HOSTNAME`, then
    /// `localhost`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let project = get(GEC_PROJECT_ENV).ok_or(ConfigError::MissingVar(GEC_PROJECT_ENV))?;
        let output_directory =
            get(GEC_OUTPUT_DIR_ENV).ok_or(ConfigError::MissingVar(GEC_OUTPUT_DIR_ENV))?;
        let environment = get(GEC_ENVIRONMENT_ENV).unwrap_or_else(|| "dev".to_string());
        let server_name = get(GEC_SERVER_NAME_ENV)
            .or_else(|| get("HOSTNAME"))
            .unwrap_or_else(|| "localhost".to_string());

        let mut config = GecConfig::new(project, environment, server_name, output_directory);
        if let Some(list) = get(GEC_PASSTHROUGH_ENV) {
            config.passthrough_types = list
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(threshold) = get(GEC_THRESHOLD_ENV) {
            config.threshold = threshold.parse()?;
        }
        if let Some(strategy) = get(GEC_ID_STRATEGY_ENV) {
            config.id_strategy = strategy.parse()?;
        }
        Ok(config)
    }
}
