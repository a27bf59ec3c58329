use crate::{AppResult, IconImage};

use tokio::sync::oneshot;
use trayify_core::MenuSpec;

/// Reply channel for a tray command; answered once the main thread applied it.
pub type TrayReply = oneshot::Sender<AppResult<()>>;

/// Commands sent from the async runtime to the main UI thread.
///
/// The main thread owns `TrayManager` (because `TrayIcon` is `!Send`),
/// so all tray mutations and process lifecycle events flow through this enum.
#[derive(Debug)]
pub enum TrayCommand {
    /// Display a new per-window entry.
    CreateEntry {
        /// Host-assigned entry number.
        entry: u64,
        /// Tooltip and title of the entry.
        title: String,
        /// Entry icon.
        icon: IconImage,
        /// Entry context menu.
        menu: MenuSpec,
        /// Readiness signal.
        reply: TrayReply,
    },
    /// Replace a menu. `entry: None` targets the primary entry.
    UpdateMenu {
        /// Entry to update, or the primary entry.
        entry: Option<u64>,
        /// New menu.
        menu: MenuSpec,
        /// Completion signal.
        reply: TrayReply,
    },
    /// Hide and drop a per-window entry.
    DestroyEntry {
        /// Entry to drop.
        entry: u64,
        /// Completion signal.
        reply: TrayReply,
    },
    /// Shut down the application. The main thread will exit the event loop.
    Shutdown,
}
