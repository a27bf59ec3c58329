//! Menu descriptions and the primary-menu synchronizer.
//!
//! Menus are plain data: every clickable item carries a [`MenuAction`] command
//! object, and the host encodes it into the item's id so one handler can
//! dispatch every click without per-entry closures.

use crate::{MenuTarget, TrayHost, WindowId};

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

const TRAYIFY_ID: &str = "trayify";
const UNHIDE_ALL_ID: &str = "unhide_all";
const EXIT_ID: &str = "exit";
const RESTORE_PREFIX: &str = "restore:";
const KILL_PREFIX: &str = "kill:";

/// Label of the primary entry's selection action.
pub const TRAYIFY_LABEL: &str = "Trayify Window";
/// Label of the primary entry's exit action.
pub const EXIT_LABEL: &str = "Exit";

/// What a menu item does when clicked.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MenuAction {
    /// Start interactive selection of a window to hide.
    Trayify,
    /// Restore every tracked window.
    UnhideAll,
    /// Restore everything and exit.
    Exit,
    /// Restore one window.
    Restore(WindowId),
    /// Terminate one window after confirmation.
    Kill(WindowId),
}

impl MenuAction {
    /// Stable menu-item id for this action.
    pub fn menu_id(&self) -> String {
        match self {
            MenuAction::Trayify => TRAYIFY_ID.to_string(),
            MenuAction::UnhideAll => UNHIDE_ALL_ID.to_string(),
            MenuAction::Exit => EXIT_ID.to_string(),
            MenuAction::Restore(id) => format!("{RESTORE_PREFIX}{id}"),
            MenuAction::Kill(id) => format!("{KILL_PREFIX}{id}"),
        }
    }

    /// Decode a menu-item id produced by [`MenuAction::menu_id`].
    pub fn from_menu_id(id: &str) -> Option<Self> {
        match id {
            TRAYIFY_ID => return Some(MenuAction::Trayify),
            UNHIDE_ALL_ID => return Some(MenuAction::UnhideAll),
            EXIT_ID => return Some(MenuAction::Exit),
            _ => {}
        }

        if let Some(raw) = id.strip_prefix(RESTORE_PREFIX) {
            return (!raw.is_empty()).then(|| MenuAction::Restore(WindowId::new(raw)));
        }
        if let Some(raw) = id.strip_prefix(KILL_PREFIX) {
            return (!raw.is_empty()).then(|| MenuAction::Kill(WindowId::new(raw)));
        }

        None
    }
}

/// One row of a menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuItemSpec {
    /// A clickable item.
    Action {
        /// Text shown to the user.
        label: String,
        /// Command dispatched on click.
        action: MenuAction,
    },
    /// A visual divider.
    Separator,
}

/// An ordered menu description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuSpec {
    items: Vec<MenuItemSpec>,
}

impl MenuSpec {
    /// An empty menu.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a clickable item.
    pub fn push_action(&mut self, label: impl Into<String>, action: MenuAction) {
        self.items.push(MenuItemSpec::Action {
            label: label.into(),
            action,
        });
    }

    /// Append a divider.
    pub fn push_separator(&mut self) {
        self.items.push(MenuItemSpec::Separator);
    }

    /// All rows in display order.
    pub fn items(&self) -> &[MenuItemSpec] {
        &self.items
    }

    /// Label of the first item bound to `action`.
    pub fn label_of(&self, action: &MenuAction) -> Option<&str> {
        self.items.iter().find_map(|item| match item {
            MenuItemSpec::Action { label, action: a } if a == action => Some(label.as_str()),
            _ => None,
        })
    }
}

/// Menu attached to a per-window entry.
pub fn entry_menu(window_id: &WindowId, title: &str) -> MenuSpec {
    let mut menu = MenuSpec::new();
    menu.push_action(
        format!("Restore \"{title}\""),
        MenuAction::Restore(window_id.clone()),
    );
    menu.push_separator();
    menu.push_action(format!("Kill {title}"), MenuAction::Kill(window_id.clone()));
    menu
}

/// Consistent view of the registry taken under its lock.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrySnapshot {
    /// Registry revision at the time of the snapshot.
    pub revision: u64,
    /// Tracked windows, ordered by title then id.
    pub entries: Vec<(WindowId, String)>,
}

impl RegistrySnapshot {
    /// Number of tracked windows.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no window is tracked.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Build the primary entry's menu for a snapshot.
pub fn build_menu(snapshot: &RegistrySnapshot, show_window_list: bool) -> MenuSpec {
    let mut menu = MenuSpec::new();
    menu.push_action(TRAYIFY_LABEL, MenuAction::Trayify);

    if !snapshot.is_empty() {
        menu.push_action(
            format!("Unhide All ({})", snapshot.len()),
            MenuAction::UnhideAll,
        );

        if show_window_list {
            menu.push_separator();
            for (window_id, title) in &snapshot.entries {
                menu.push_action(
                    format!("Restore \"{title}\""),
                    MenuAction::Restore(window_id.clone()),
                );
            }
        }
    }

    menu.push_separator();
    menu.push_action(EXIT_LABEL, MenuAction::Exit);
    menu
}

/// Keeps the primary entry's menu in step with registry contents.
pub struct MenuSynchronizer {
    host: Arc<dyn TrayHost>,
    show_window_list: bool,
    primary_ready: AtomicBool,
    // Revision of the last menu the host accepted.
    published: Mutex<Option<u64>>,
}

impl MenuSynchronizer {
    /// Create a synchronizer publishing through `host`.
    pub fn new(host: Arc<dyn TrayHost>, show_window_list: bool) -> Self {
        Self {
            host,
            show_window_list,
            primary_ready: AtomicBool::new(false),
            published: Mutex::new(None),
        }
    }

    /// Record that the primary entry exists and can receive menus.
    pub fn set_primary_ready(&self) {
        self.primary_ready.store(true, Ordering::Release);
    }

    /// Whether the primary entry has been set.
    pub fn is_primary_ready(&self) -> bool {
        self.primary_ready.load(Ordering::Acquire)
    }

    /// Republish the primary menu for `snapshot`.
    ///
    /// No-op before the primary entry is set. A snapshot older than the last
    /// published one is dropped. Host failures are logged and swallowed.
    #[instrument(skip_all, fields(revision = snapshot.revision, entries = snapshot.len()))]
    pub async fn refresh(&self, snapshot: &RegistrySnapshot) {
        if !self.is_primary_ready() {
            debug!("Primary entry not set yet, skipping menu refresh");
            return;
        }

        let mut published = self.published.lock().await;
        if matches!(*published, Some(last) if snapshot.revision < last) {
            debug!("Skipping stale menu snapshot");
            return;
        }

        let menu = build_menu(snapshot, self.show_window_list);
        match self.host.update_menu(MenuTarget::Primary, menu).await {
            Ok(()) => {
                *published = Some(snapshot.revision);
                debug!("Primary menu refreshed");
            }
            Err(e) => warn!(error = ?e, "Failed to refresh primary menu"),
        }
    }
}
