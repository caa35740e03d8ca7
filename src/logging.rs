//! Tracing subscriber setup
//!
//! Logs go to stderr so stdout only carries the report.

use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};

/// Filter directive for the given verbosity, falling back to the configured level
pub fn filter_directive(config: &LoggingConfig, verbose: u8) -> String {
    match verbose {
        0 => config.level.clone(),
        1 => "check_workflow=info".to_string(),
        2 => "check_workflow=debug".to_string(),
        _ => "debug".to_string(),
    }
}

/// Install the global subscriber; RUST_LOG takes precedence over configuration
pub fn init(config: &LoggingConfig, verbose: u8) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(config, verbose)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match config.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}
