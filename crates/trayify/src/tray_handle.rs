//! [`TrayHost`] implementation that forwards to the main-thread tray loop.

use crate::{TrayCommand, tray_command::TrayReply, window_icon::window_icon};

use std::{
    panic::Location,
    path::PathBuf,
    sync::{
        Mutex,
        atomic::{AtomicU64, Ordering},
    },
};

use async_trait::async_trait;
use error_location::ErrorLocation;
use tao::event_loop::EventLoopProxy;
use tokio::sync::oneshot;
use tracing::instrument;
use trayify_core::{
    CoreResult, EntryHandle, MenuSpec, MenuTarget, TrayHost, TrayifyError, WindowId,
};

/// Sends tray commands to the event loop and waits for each to be applied.
pub struct TrayHandle {
    // EventLoopProxy is not Sync on every platform.
    proxy: Mutex<EventLoopProxy<TrayCommand>>,
    next_entry: AtomicU64,
    default_icon_path: PathBuf,
}

impl TrayHandle {
    /// Create a handle for the event loop behind `proxy`.
    pub fn new(proxy: EventLoopProxy<TrayCommand>, default_icon_path: PathBuf) -> Self {
        Self {
            proxy: Mutex::new(proxy),
            next_entry: AtomicU64::new(1),
            default_icon_path,
        }
    }

    fn send(&self, command: TrayCommand) -> CoreResult<()> {
        let proxy = self.proxy.lock().map_err(|_| TrayifyError::DisplayFailed {
            reason: "Tray proxy lock poisoned".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

        proxy
            .send_event(command)
            .map_err(|_| TrayifyError::DisplayFailed {
                reason: "Tray event loop closed".to_string(),
                location: ErrorLocation::from(Location::caller()),
            })
    }

    async fn request(&self, command: impl FnOnce(TrayReply) -> TrayCommand) -> CoreResult<()> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(command(reply_tx))?;

        match reply_rx.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(TrayifyError::DisplayFailed {
                reason: e.to_string(),
                location: ErrorLocation::from(Location::caller()),
            }),
            Err(_) => Err(TrayifyError::DisplayFailed {
                reason: "Tray event loop dropped the request".to_string(),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }
}

#[async_trait]
impl TrayHost for TrayHandle {
    #[instrument(skip(self, menu))]
    async fn create_entry(
        &self,
        window_id: &WindowId,
        title: &str,
        menu: MenuSpec,
    ) -> CoreResult<EntryHandle> {
        let icon = window_icon(window_id, &self.default_icon_path).await;
        let entry = self.next_entry.fetch_add(1, Ordering::Relaxed);
        let title = title.to_string();

        self.request(|reply| TrayCommand::CreateEntry {
            entry,
            title,
            icon,
            menu,
            reply,
        })
        .await?;

        Ok(EntryHandle::new(entry))
    }

    #[instrument(skip(self, menu))]
    async fn update_menu(&self, target: MenuTarget<'_>, menu: MenuSpec) -> CoreResult<()> {
        let entry = match target {
            MenuTarget::Primary => None,
            MenuTarget::Entry(handle) => Some(handle.raw()),
        };

        self.request(|reply| TrayCommand::UpdateMenu { entry, menu, reply }).await
    }

    #[instrument(skip(self))]
    async fn destroy_entry(&self, handle: EntryHandle) -> CoreResult<()> {
        let entry = handle.raw();
        self.request(|reply| TrayCommand::DestroyEntry { entry, reply }).await
    }
}
