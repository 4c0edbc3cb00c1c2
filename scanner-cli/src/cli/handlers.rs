//! Command handlers

use crate::cli::format::format_mode_table;
use anyhow::{Context, Result};
use scanner_core::catalog::{load_catalog, ModeCatalog};
use scanner_core::console::Console;
use scanner_core::models::Settings;
use scanner_core::pipeline::{spawn_stdin_reader, ExitReason, ScanPipeline};
use scanner_core::state::ModeStateMachine;
use scanner_core::transport::ReqwestTransport;
use std::sync::Arc;

fn load_modes(settings: &Settings) -> Result<ModeCatalog> {
    load_catalog(&settings.modes_dir).with_context(|| {
        format!(
            "Failed to load modes from {}",
            settings.modes_dir.display()
        )
    })
}

/// Print the mode table
pub fn handle_list_modes(settings: &Settings) -> Result<()> {
    let catalog = load_modes(settings)?;
    print!("{}", format_mode_table(&catalog));
    Ok(())
}

/// Route stdin scans until end of input or Ctrl+C
pub async fn handle_run(settings: &Settings) -> Result<()> {
    let catalog = Arc::new(load_modes(settings)?);
    let machine = ModeStateMachine::new(catalog, &settings.default_mode)?;
    let transport = ReqwestTransport::new(settings.request_timeout())
        .context("Failed to create HTTP client")?;

    Console::new(std::io::stdout()).banner(env!("CARGO_PKG_VERSION"));

    let mut pipeline = ScanPipeline::new(
        machine,
        settings.idle_timeout(),
        spawn_stdin_reader(),
        transport,
        std::io::stdout(),
    );

    match pipeline.run(shutdown_signal()).await {
        ExitReason::EndOfInput => tracing::debug!("Input closed"),
        ExitReason::Interrupted => tracing::debug!("Interrupted"),
    }

    Ok(())
}

/// Resolves on Ctrl+C. If the handler cannot be installed, never resolves.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}
