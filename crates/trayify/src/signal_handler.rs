//! Process signal handling.
//!
//! Turns SIGINT/SIGTERM into an `AppCommand::Shutdown` so the application
//! restores every hidden window before the process exits.

use crate::{AppCommand, AppError, AppResult};

use std::panic::Location;

use error_location::ErrorLocation;
use tokio::sync::{mpsc, watch};
use tracing::{info, instrument};

/// Forwards termination signals to the application loop.
pub struct SignalHandler {
    command_tx: mpsc::Sender<AppCommand>,
}

impl SignalHandler {
    /// Create a handler sending to `command_tx`.
    pub fn new(command_tx: mpsc::Sender<AppCommand>) -> Self {
        Self { command_tx }
    }

    /// Wait for a signal or for the application to shut down on its own.
    #[instrument(skip(self, shutdown_rx))]
    pub async fn run(&self, mut shutdown_rx: watch::Receiver<bool>) -> AppResult<()> {
        tokio::select! {
            _ = shutdown_rx.changed() => {
                info!("Signal handler shutting down");
            }
            signal = next_signal() => {
                let reason = signal?;
                info!(signal = reason, "Termination signal received");

                self.command_tx
                    .send(AppCommand::Shutdown { reason })
                    .await
                    .map_err(|e| AppError::ChannelSendFailed {
                        message: format!("Failed to send Shutdown: {}", e),
                        location: ErrorLocation::from(Location::caller()),
                    })?;
            }
        }

        Ok(())
    }
}

#[cfg(unix)]
async fn next_signal() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;

    tokio::select! {
        _ = interrupt.recv() => Ok("SIGINT"),
        _ = terminate.recv() => Ok("SIGTERM"),
    }
}

#[cfg(not(unix))]
async fn next_signal() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await?;
    Ok("Ctrl-C")
}
