//! Logging service
//!
//! Every structured event the scanner emits goes through one of the `log_*`
//! helpers below, each tagged with an `event` field naming it.

use crate::models::LogLevel;
use anyhow::Result;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::EnvFilter;

/// Initialize logging to stderr, and to `log_file` when given.
/// `RUST_LOG` overrides `level` when set.
pub fn init_logging(level: LogLevel, log_file: Option<&Path>) -> Result<()> {
    let level = level.as_str();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("warn,scanner={level},scanner_core={level}"))
    });

    let (writer, ansi) = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| anyhow::anyhow!("Failed to open log file {}: {}", path.display(), e))?;
            (
                BoxMakeWriter::new(std::io::stderr.and(Mutex::new(file))),
                false,
            )
        }
        None => (BoxMakeWriter::new(std::io::stderr), true),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

pub fn log_startup(current_mode: &str, modes: &[&str]) {
    tracing::info!(
        event = "startup",
        current_mode = current_mode,
        modes = ?modes,
        "Scanner started"
    );
}

pub fn log_mode_switch(new_mode: &str, trigger: &str) {
    tracing::info!(
        event = "mode_switch",
        new_mode = new_mode,
        trigger = trigger,
        "Mode switched"
    );
}

pub fn log_auto_revert(to_mode: &str, reason: &str) {
    tracing::info!(
        event = "mode_auto_revert",
        to_mode = to_mode,
        reason = reason,
        "Mode reverted"
    );
}

pub fn log_sent(mode: &str, endpoint: &str, method: &str, status: u16, payload: &str) {
    tracing::info!(
        event = "sent",
        mode = mode,
        endpoint = endpoint,
        method = method,
        status = status,
        payload = payload,
        "Payload sent"
    );
}

/// Non-2xx response
pub fn log_error_response(mode: &str, endpoint: &str, method: &str, status: u16, response: &str) {
    tracing::warn!(
        event = "error",
        mode = mode,
        endpoint = endpoint,
        method = method,
        status = status,
        response = response,
        "Endpoint rejected payload"
    );
}

/// Transport failure: no response received
pub fn log_exception(mode: &str, method: &str, error: &str) {
    tracing::warn!(
        event = "exception",
        mode = mode,
        method = method,
        error = error,
        "Request failed"
    );
}

pub fn log_stdin_eof() {
    tracing::info!(event = "stdin_eof", "End of input");
}

pub fn log_shutdown(current_mode: &str) {
    tracing::info!(
        event = "shutdown",
        current_mode = current_mode,
        "Scanner stopped"
    );
}
