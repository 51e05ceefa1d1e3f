//! Entry point: logging, terminal setup, and the TUI loop.

use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;

mod app;
mod config;
mod events;
mod input;
mod landing;
mod layout;
mod lead;
mod money;
mod phone;
mod photos;
mod pricing;
mod shortcuts;
mod sink;
mod ui;
mod validation;
mod vin;
mod worker;

/// Log to a file so the TUI keeps stdout; the guard must stay alive.
fn init_logging() -> Result<WorkerGuard> {
    let log_file = "buyout_tui.log";
    let file_appender = tracing_appender::rolling::never(".", log_file);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to init logging: {e}"))?;
    tracing::info!("logging to {}", log_file);
    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    let _log_guard = init_logging()?;
    tracing::info!("app starting");

    let mut guard = ui::TerminalGuard::enter()?;
    let res = app::run_app(&mut guard.terminal).await;
    // Restore the terminal before anything is printed.
    drop(guard);

    if let Err(ref e) = res {
        tracing::error!("app error: {e:#}");
    }
    tracing::info!("app exiting");
    res
}
