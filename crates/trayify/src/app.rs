use crate::{AppCommand, AppResult, TrayCommand};

use std::{sync::Arc, time::Duration};

use tao::event_loop::EventLoopProxy;
use tokio::sync::{mpsc, watch};
use tracing::{Instrument, debug, error, info, info_span, instrument, warn};
use tray_icon::menu::MenuEvent;
use trayify_core::{EntryRegistry, MenuAction};
use uuid::Uuid;

/// Main application state.
///
/// Runs on the async runtime thread. Tray mutations reach the main thread
/// through the registry's `TrayHandle`; only the final `Shutdown` is sent
/// straight through `tray_proxy`.
pub struct App {
    pub(crate) registry: Arc<EntryRegistry>,
    pub(crate) tray_proxy: EventLoopProxy<TrayCommand>,
    pub(crate) command_rx: mpsc::Receiver<AppCommand>,
    pub(crate) shutdown_tx: watch::Sender<bool>,
}

impl App {
    /// Run the main application event loop.
    #[instrument(skip(self))]
    pub(crate) async fn run(mut self) -> AppResult<()> {
        info!("Trayify starting");

        self.registry.set_main_entry().await;

        // MenuEvent::receiver() blocks on recv(), so one blocking task
        // forwards clicks. It stops once tray_event_rx is dropped.
        let (tray_event_tx, mut tray_event_rx) = mpsc::channel(32);
        let tray_handle = tokio::task::spawn_blocking(move || {
            let receiver = MenuEvent::receiver();
            while let Ok(event) = receiver.recv() {
                if tray_event_tx.blocking_send(event).is_err() {
                    break;
                }
            }
        });

        loop {
            tokio::select! {
                Some(event) = tray_event_rx.recv() => {
                    let Some(action) = MenuAction::from_menu_id(event.id.as_ref()) else {
                        warn!(menu_id = ?event.id, "Unknown menu item clicked");
                        continue;
                    };

                    if action == MenuAction::Exit {
                        info!("Exit requested from tray menu");
                        break;
                    }

                    self.dispatch(action);
                }

                Some(cmd) = self.command_rx.recv() => {
                    match cmd {
                        AppCommand::Shutdown { reason } => {
                            info!(reason, "Shutdown requested");
                            break;
                        }
                    }
                }

                else => {
                    info!("All channels closed, shutting down");
                    break;
                }
            }
        }

        drop(tray_event_rx);

        match tokio::time::timeout(Duration::from_secs(1), tray_handle).await {
            Ok(Ok(())) => info!("Tray event forwarder stopped cleanly"),
            Ok(Err(e)) => error!(error = ?e, "Tray event forwarder task panicked"),
            Err(_) => debug!(
                "Tray event forwarder still waiting for a click, \
                     will be cleaned up on exit"
            ),
        }

        self.registry.shutdown().await;

        let _ = self.shutdown_tx.send(true);
        if self.tray_proxy.send_event(TrayCommand::Shutdown).is_err() {
            warn!("Tray event loop already closed");
        }

        info!("Trayify shut down successfully");

        Ok(())
    }

    /// Run one menu action on its own task so a pending selection or kill
    /// prompt never blocks other clicks.
    fn dispatch(&self, action: MenuAction) {
        let registry = Arc::clone(&self.registry);
        let action_id = Uuid::new_v4();
        let span = info_span!("menu_action", action_id = %action_id, action = ?action);

        tokio::spawn(
            async move {
                match action {
                    MenuAction::Trayify => {
                        if let Err(e) = registry.trayify().await {
                            error!(error = ?e, "Trayify failed");
                        }
                    }
                    MenuAction::UnhideAll => {
                        let restored = registry.unhide_all().await;
                        debug!(restored, "Unhide all finished");
                    }
                    MenuAction::Restore(window_id) => {
                        if let Err(e) = registry.restore(&window_id).await {
                            error!(error = ?e, "Restore failed");
                        }
                    }
                    MenuAction::Kill(window_id) => match registry.kill(&window_id).await {
                        Ok(state) => debug!(?state, "Kill finished"),
                        Err(e) => error!(error = ?e, "Kill failed"),
                    },
                    MenuAction::Exit => {}
                }
            }
            .instrument(span),
        );
    }
}
