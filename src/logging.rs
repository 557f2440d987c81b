// src/logging.rs

//! Logging setup for `wsrun` using `tracing` + `tracing-subscriber`.
//!
//! wsrun writes two kinds of output:
//! - stdout carries what the user asked for: the target listing, the
//!   (prefixed) output of the scripts themselves and the final report.
//! - stderr carries diagnostics from this module's subscriber.
//!
//! Keeping them apart means `wsrun build | tee build.log` captures the run
//! without wsrun's own chatter, and `WSRUN_LOG=off` silences it entirely.
//!
//! Priority for determining the log level:
//! 1. `--log-level` CLI flag (if provided)
//! 2. `WSRUN_LOG` environment variable (`off`, `error`, ..., `trace`)
//! 3. default to `warn`, so a normal run only shows ignored inputs such as
//!    unreadable manifests or unknown dependencies.

use anyhow::Result;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt;

use crate::cli::LogLevel;

/// Environment variable consulted when `--log-level` is absent.
pub const LOG_ENV_VAR: &str = "WSRUN_LOG";

/// Initialise global logging subscriber.
///
/// Safe to call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env_value = std::env::var(LOG_ENV_VAR).ok();
    let level = resolve_level(cli_level, env_value.as_deref());

    fmt()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

/// Flag beats environment beats default; an unparsable env value falls back
/// to the default.
fn resolve_level(cli_level: Option<LogLevel>, env_value: Option<&str>) -> LevelFilter {
    match cli_level {
        Some(lvl) => level_from_log_level(lvl),
        None => env_value
            .and_then(parse_level_str)
            .unwrap_or(LevelFilter::WARN),
    }
}

fn level_from_log_level(lvl: LogLevel) -> LevelFilter {
    match lvl {
        LogLevel::Error => LevelFilter::ERROR,
        LogLevel::Warn => LevelFilter::WARN,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Trace => LevelFilter::TRACE,
    }
}

fn parse_level_str(s: &str) -> Option<LevelFilter> {
    match s.trim().to_lowercase().as_str() {
        "off" | "none" => Some(LevelFilter::OFF),
        "error" => Some(LevelFilter::ERROR),
        "warn" | "warning" => Some(LevelFilter::WARN),
        "info" => Some(LevelFilter::INFO),
        "debug" => Some(LevelFilter::DEBUG),
        "trace" => Some(LevelFilter::TRACE),
        _ => None,
    }
}
