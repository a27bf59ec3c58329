//! The window-to-tray-entry registry.
//!
//! All map mutations and their paired tray-host calls happen under one
//! `tokio::sync::Mutex`. Window-controller calls (show, terminate with its
//! confirmation prompt) always run with the lock released: an entry is first
//! *claimed* under the lock, the controller is called, then the removal is
//! *committed* under the lock again.

use crate::{
    CoreResult, EntryHandle, MenuSynchronizer, RegistrySnapshot, TrayHost, TrayifyError,
    WindowController, WindowEvent, WindowId, WindowState, menu::entry_menu,
};

use std::{
    collections::{HashMap, HashSet},
    panic::Location,
    sync::Arc,
    time::Duration,
};

use error_location::ErrorLocation;
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, instrument, warn};

/// Default time `shutdown` waits for in-flight restore/kill operations.
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Tunables for an [`EntryRegistry`].
#[derive(Debug, Clone)]
pub struct RegistryOptions {
    /// How long `shutdown` lets in-flight operations finish before forcing
    /// their windows visible.
    pub shutdown_grace: Duration,
    /// List every hidden window in the primary menu.
    pub show_window_list: bool,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
            show_window_list: false,
        }
    }
}

struct TrayEntry {
    title: String,
    handle: EntryHandle,
    // Claimed by a restore or kill that is talking to the window controller.
    in_flight: bool,
}

#[derive(Default)]
struct Entries {
    map: HashMap<WindowId, TrayEntry>,
    // Ids whose entry the host is still displaying.
    pending: HashSet<WindowId>,
    closed: bool,
    revision: u64,
}

impl Entries {
    fn snapshot(&self) -> RegistrySnapshot {
        let mut entries: Vec<(WindowId, String)> = self
            .map
            .iter()
            .map(|(id, entry)| (id.clone(), entry.title.clone()))
            .collect();
        entries.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));

        RegistrySnapshot {
            revision: self.revision,
            entries,
        }
    }

    fn in_flight(&self) -> usize {
        self.map.values().filter(|entry| entry.in_flight).count() + self.pending.len()
    }
}

/// Owns every hidden window's tray entry.
///
/// Invariant: a window id is a key exactly while its window is hidden.
/// An id being created is reserved, not a key, until the host displays its
/// entry.
pub struct EntryRegistry {
    controller: Arc<dyn WindowController>,
    host: Arc<dyn TrayHost>,
    menu: MenuSynchronizer,
    entries: Mutex<Entries>,
    in_flight_tx: watch::Sender<usize>,
    shutdown_grace: Duration,
}

impl EntryRegistry {
    /// Create an empty registry.
    pub fn new(
        controller: Arc<dyn WindowController>,
        host: Arc<dyn TrayHost>,
        options: RegistryOptions,
    ) -> Self {
        let (in_flight_tx, _) = watch::channel(0);

        Self {
            controller,
            menu: MenuSynchronizer::new(Arc::clone(&host), options.show_window_list),
            host,
            entries: Mutex::new(Entries::default()),
            in_flight_tx,
            shutdown_grace: options.shutdown_grace,
        }
    }

    pub(crate) fn controller(&self) -> &dyn WindowController {
        self.controller.as_ref()
    }

    /// Record that the primary entry exists and publish its first menu.
    #[instrument(skip(self))]
    pub async fn set_main_entry(&self) {
        self.menu.set_primary_ready();
        self.refresh_menu().await;
    }

    /// Consistent copy of the tracked windows.
    pub async fn snapshot(&self) -> RegistrySnapshot {
        self.entries.lock().await.snapshot()
    }

    /// Number of tracked windows.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.map.len()
    }

    /// Whether no window is tracked.
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.map.is_empty()
    }

    /// Whether `window_id` has a tray entry.
    pub async fn contains(&self, window_id: &WindowId) -> bool {
        self.entries.lock().await.map.contains_key(window_id)
    }

    /// Add a tray entry for a window that has just been hidden.
    ///
    /// The id is reserved under the lock, the host displays the entry with
    /// the lock released, then the entry is inserted. Returns once the host
    /// reports the entry as displayed.
    ///
    /// # Errors
    ///
    /// `AlreadyTracked` if the window has or is getting an entry,
    /// `ShuttingDown` if [`shutdown`](Self::shutdown) started before the entry
    /// was inserted, `DisplayFailed` if the host could not display the entry.
    /// Nothing is inserted on error.
    #[instrument(skip(self))]
    pub async fn create(&self, window_id: WindowId, title: &str) -> CoreResult<()> {
        {
            let mut entries = self.entries.lock().await;

            if entries.closed {
                return Err(TrayifyError::ShuttingDown {
                    location: ErrorLocation::from(Location::caller()),
                });
            }

            if entries.map.contains_key(&window_id) || entries.pending.contains(&window_id) {
                debug!("Window already tracked");
                return Err(TrayifyError::AlreadyTracked {
                    window_id,
                    location: ErrorLocation::from(Location::caller()),
                });
            }

            entries.pending.insert(window_id.clone());
            self.publish_in_flight(&entries);
        }

        let handle = match self
            .host
            .create_entry(&window_id, title, entry_menu(&window_id, title))
            .await
        {
            Ok(handle) => handle,
            Err(e) => {
                self.release_reservation(&window_id).await;
                return Err(e);
            }
        };

        let rejected = {
            let mut entries = self.entries.lock().await;

            if entries.closed {
                Some(handle)
            } else {
                entries.pending.remove(&window_id);
                entries.map.insert(
                    window_id.clone(),
                    TrayEntry {
                        title: title.to_string(),
                        handle,
                        in_flight: false,
                    },
                );
                entries.revision += 1;
                self.publish_in_flight(&entries);
                None
            }
        };

        if let Some(handle) = rejected {
            debug!("Shutdown started while the entry was displayed, dropping it");
            self.release_handle(handle).await;
            self.release_reservation(&window_id).await;
            return Err(TrayifyError::ShuttingDown {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        info!("Tray entry created");
        self.refresh_menu().await;

        Ok(())
    }

    /// Show a tracked window and drop its entry.
    ///
    /// A failing `show` is logged; the entry is removed regardless.
    ///
    /// # Errors
    ///
    /// `NotTracked` or `OperationInProgress`.
    #[instrument(skip(self))]
    pub async fn restore(&self, window_id: &WindowId) -> CoreResult<WindowState> {
        self.claim(window_id).await?;

        if let Err(e) = self.controller.show(window_id).await {
            warn!(error = ?e, "Failed to show window, removing entry anyway");
        }

        if self.commit_removal(window_id).await {
            self.refresh_menu().await;
        }

        info!("Window restored");
        Ok(after_hidden(WindowEvent::Restore))
    }

    /// Terminate a tracked window after the controller's confirmation prompt.
    ///
    /// The entry is removed whatever the user answers. When the kill is
    /// declined or fails the window is shown again so it never stays hidden
    /// without an entry.
    ///
    /// # Errors
    ///
    /// `NotTracked`, `OperationInProgress`, or the controller's
    /// `ControlFailed` after cleanup.
    #[instrument(skip(self))]
    pub async fn kill(&self, window_id: &WindowId) -> CoreResult<WindowState> {
        let title = self.claim(window_id).await?;

        let outcome = self.controller.terminate(window_id, &title).await;

        if self.commit_removal(window_id).await {
            self.refresh_menu().await;
        }

        match outcome {
            Ok(confirmed) => {
                let state = after_hidden(WindowEvent::Kill { confirmed });
                if state.is_terminal() {
                    info!("Window terminated");
                } else {
                    info!("Kill declined, showing window again");
                    self.show_best_effort(window_id).await;
                }
                Ok(state)
            }
            Err(e) => {
                warn!(error = ?e, "Kill failed, showing window again");
                self.show_best_effort(window_id).await;
                Err(e)
            }
        }
    }

    /// Drop a window's entry without touching the window. No-op if untracked.
    #[instrument(skip(self))]
    pub async fn remove(&self, window_id: &WindowId) {
        let removed = {
            let mut entries = self.entries.lock().await;
            match entries.map.remove(window_id) {
                Some(entry) => {
                    self.release_handle(entry.handle).await;
                    entries.revision += 1;
                    self.publish_in_flight(&entries);
                    true
                }
                None => false,
            }
        };

        if removed {
            debug!("Tray entry removed");
            self.refresh_menu().await;
        }
    }

    /// Show every tracked window and clear the registry.
    ///
    /// Entries claimed by an in-flight restore or kill are left to that
    /// operation. The primary menu is refreshed once. Returns the number of
    /// windows restored.
    #[instrument(skip(self))]
    pub async fn unhide_all(&self) -> usize {
        let drained = {
            let mut entries = self.entries.lock().await;
            let ids: Vec<WindowId> = entries
                .map
                .iter()
                .filter(|(_, entry)| !entry.in_flight)
                .map(|(id, _)| id.clone())
                .collect();

            if ids.is_empty() {
                return 0;
            }

            for id in &ids {
                if let Some(entry) = entries.map.remove(id) {
                    self.release_handle(entry.handle).await;
                }
            }
            entries.revision += 1;
            ids
        };

        for id in &drained {
            self.show_best_effort(id).await;
        }

        self.refresh_menu().await;

        info!(count = drained.len(), "All windows restored");
        drained.len()
    }

    /// Restore every window and stop accepting new entries.
    ///
    /// In-flight restore/kill operations get the configured grace period to
    /// finish (a kill confirmation may still be answered); whatever is left
    /// afterwards is released and shown without waiting further.
    #[instrument(skip(self))]
    pub async fn shutdown(&self) {
        self.entries.lock().await.closed = true;

        let restored = self.unhide_all().await;

        let mut in_flight = self.in_flight_tx.subscribe();
        let settled = matches!(
            tokio::time::timeout(self.shutdown_grace, in_flight.wait_for(|n| *n == 0)).await,
            Ok(Ok(_))
        );

        if !settled {
            warn!(
                grace_ms = self.shutdown_grace.as_millis(),
                "In-flight operations did not settle, forcing release"
            );
            self.force_release().await;
        }

        info!(restored, "Registry shut down");
    }

    /// Mark an entry as owned by the calling operation and return its title.
    async fn claim(&self, window_id: &WindowId) -> CoreResult<String> {
        let mut entries = self.entries.lock().await;

        let entry = entries
            .map
            .get_mut(window_id)
            .ok_or_else(|| TrayifyError::NotTracked {
                window_id: window_id.clone(),
                location: ErrorLocation::from(Location::caller()),
            })?;

        if entry.in_flight {
            return Err(TrayifyError::OperationInProgress {
                window_id: window_id.clone(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        entry.in_flight = true;
        let title = entry.title.clone();
        self.publish_in_flight(&entries);

        Ok(title)
    }

    /// Remove a claimed entry. Returns false if shutdown already released it.
    async fn commit_removal(&self, window_id: &WindowId) -> bool {
        let mut entries = self.entries.lock().await;

        let claimed = entries
            .map
            .get(window_id)
            .is_some_and(|entry| entry.in_flight);
        if !claimed {
            return false;
        }

        if let Some(entry) = entries.map.remove(window_id) {
            self.release_handle(entry.handle).await;
        }
        entries.revision += 1;
        self.publish_in_flight(&entries);

        true
    }

    async fn force_release(&self) {
        let released: Vec<WindowId> = {
            let mut entries = self.entries.lock().await;
            let drained: Vec<(WindowId, TrayEntry)> = entries.map.drain().collect();
            if drained.is_empty() {
                return;
            }

            let mut ids = Vec::with_capacity(drained.len());
            for (id, entry) in drained {
                self.release_handle(entry.handle).await;
                ids.push(id);
            }
            entries.revision += 1;
            self.publish_in_flight(&entries);
            ids
        };

        for id in &released {
            self.show_best_effort(id).await;
        }

        self.refresh_menu().await;
    }

    async fn release_reservation(&self, window_id: &WindowId) {
        let mut entries = self.entries.lock().await;
        entries.pending.remove(window_id);
        self.publish_in_flight(&entries);
    }

    async fn release_handle(&self, handle: EntryHandle) {
        if let Err(e) = self.host.destroy_entry(handle).await {
            warn!(error = ?e, "Failed to destroy tray entry");
        }
    }

    async fn show_best_effort(&self, window_id: &WindowId) {
        if let Err(e) = self.controller.show(window_id).await {
            warn!(window_id = %window_id, error = ?e, "Failed to show window");
        }
    }

    async fn refresh_menu(&self) {
        let snapshot = self.snapshot().await;
        self.menu.refresh(&snapshot).await;
    }

    fn publish_in_flight(&self, entries: &Entries) {
        self.in_flight_tx.send_replace(entries.in_flight());
    }
}

// Restore and kill only ever run on tracked, hence hidden, windows.
fn after_hidden(event: WindowEvent) -> WindowState {
    WindowState::Hidden.apply(event).unwrap_or(WindowState::Hidden)
}
