//! Environment variable names read by [`GecConfig::from_env`](crate::config::GecConfig::from_env).
//!
//! These are purely helpers; the writer itself never touches the
//! environment.

/// Project the errors belong to. Required.
pub const GEC_PROJECT_ENV: &str = "GEC_PROJECT";

/// Deployment environment, e.g. `prod` or `staging`.
pub const GEC_ENVIRONMENT_ENV: &str = "GEC_ENVIRONMENT";

/// Name of this server. Falls back to `HOSTNAME`.
pub const GEC_SERVER_NAME_ENV: &str = "GEC_SERVER_NAME";

/// Directory the uploader polls. Required.
pub const GEC_OUTPUT_DIR_ENV: &str = "GEC_OUTPUT_DIR";

/// Comma-separated passthrough error type names.
pub const GEC_PASSTHROUGH_ENV: &str = "GEC_PASSTHROUGH";

/// Minimum severity for events without an error attached.
pub const GEC_THRESHOLD_ENV: &str = "GEC_THRESHOLD";

/// `sequential` or `uuid`.
pub const GEC_ID_STRATEGY_ENV: &str = "GEC_ID_STRATEGY";

