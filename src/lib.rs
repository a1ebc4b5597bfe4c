pub mod severity;
pub mod context;
pub mod types;
pub mod trace;
pub mod exception;
pub mod event;
pub mod record;
pub mod ids;
pub mod sink;
pub mod file_sink;
pub mod noop_sink;
pub mod writer;
pub mod layer;
pub mod panic;

pub mod config;
pub mod env;
pub mod init;
