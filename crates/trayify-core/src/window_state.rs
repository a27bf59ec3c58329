//! Per-window state machine and the hide-and-track entry point.

use crate::{CoreResult, EntryRegistry, SelectedWindow, TrayifyError, WindowId};

use std::panic::Location;

use error_location::ErrorLocation;
use tracing::{debug, error, info, instrument, warn};

/// State of a window as seen by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    /// Mapped and not tracked.
    Visible,
    /// Unmapped with a tray entry.
    Hidden,
    /// Destroyed through a confirmed kill.
    Terminated,
}

/// Something that happens to a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    /// The window was hidden and an entry created.
    Hide,
    /// The entry's restore action ran.
    Restore,
    /// The entry's kill action ran.
    Kill {
        /// Whether the user confirmed the kill.
        confirmed: bool,
    },
}

impl WindowState {
    /// The state reached by applying `event`, or `None` if the transition is
    /// not allowed.
    pub fn apply(self, event: WindowEvent) -> Option<WindowState> {
        match (self, event) {
            (WindowState::Visible, WindowEvent::Hide) => Some(WindowState::Hidden),
            (WindowState::Hidden, WindowEvent::Restore) => Some(WindowState::Visible),
            (WindowState::Hidden, WindowEvent::Kill { confirmed: true }) => {
                Some(WindowState::Terminated)
            }
            (WindowState::Hidden, WindowEvent::Kill { confirmed: false }) => {
                Some(WindowState::Visible)
            }
            _ => None,
        }
    }

    /// Whether no further transition is possible.
    pub fn is_terminal(self) -> bool {
        self == WindowState::Terminated
    }
}

impl EntryRegistry {
    /// Current state of `window_id` from the registry's point of view.
    pub async fn state_of(&self, window_id: &WindowId) -> WindowState {
        if self.contains(window_id).await {
            WindowState::Hidden
        } else {
            WindowState::Visible
        }
    }

    /// Let the user pick a window, hide it and give it a tray entry.
    ///
    /// If the entry cannot be created the window is shown again so it is
    /// never left invisible and untracked. A window that is already tracked
    /// is left alone, since it cannot be hidden twice.
    ///
    /// # Errors
    ///
    /// `SelectionFailed` and `ControlFailed` from the controller, or the
    /// error returned by [`create`](Self::create).
    #[instrument(skip(self))]
    pub async fn trayify(&self) -> CoreResult<SelectedWindow> {
        let SelectedWindow { window_id, title } = self.controller().select_window().await?;
        debug!(window_id = %window_id, title = %title, "Window selected");

        if self.state_of(&window_id).await.apply(WindowEvent::Hide).is_none() {
            debug!(window_id = %window_id, "Window already in tray");
            return Err(TrayifyError::AlreadyTracked {
                window_id,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        self.controller().hide(&window_id).await?;

        match self.create(window_id.clone(), &title).await {
            Ok(()) => {
                info!(window_id = %window_id, "Window moved to tray");
                Ok(SelectedWindow { window_id, title })
            }
            Err(e @ TrayifyError::AlreadyTracked { .. }) => {
                debug!(window_id = %window_id, "Window already in tray");
                Err(e)
            }
            Err(e) => {
                warn!(window_id = %window_id, error = ?e, "Entry creation failed, showing window again");
                if let Err(show_err) = self.controller().show(&window_id).await {
                    error!(
                        window_id = %window_id,
                        error = ?show_err,
                        "Window could not be shown again and is untracked"
                    );
                }
                Err(e)
            }
        }
    }
}
