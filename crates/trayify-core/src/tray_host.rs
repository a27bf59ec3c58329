//! The tray display capability consumed by the registry.

use crate::{CoreResult, MenuSpec, WindowId};

use async_trait::async_trait;

/// Opaque token for one displayed tray entry.
///
/// Not `Clone`: the registry owns each handle exclusively and gives it back
/// to [`TrayHost::destroy_entry`] exactly once.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct EntryHandle(u64);

impl EntryHandle {
    /// Wrap a host-assigned entry number.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The host-assigned entry number.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Which displayed entry a menu update applies to.
#[derive(Debug, Clone, Copy)]
pub enum MenuTarget<'a> {
    /// The always-present summary entry.
    Primary,
    /// A per-window entry.
    Entry(&'a EntryHandle),
}

/// Displays tray entries and their menus.
///
/// Every call resolves only after the display side has applied it, so a
/// returned [`EntryHandle`] is already visible.
#[async_trait]
pub trait TrayHost: Send + Sync {
    /// Materialize an entry titled `title` for `window_id` with the given menu.
    async fn create_entry(
        &self,
        window_id: &WindowId,
        title: &str,
        menu: MenuSpec,
    ) -> CoreResult<EntryHandle>;

    /// Replace the menu of the primary entry or of a per-window entry.
    async fn update_menu(&self, target: MenuTarget<'_>, menu: MenuSpec) -> CoreResult<()>;

    /// Hide and release an entry.
    async fn destroy_entry(&self, handle: EntryHandle) -> CoreResult<()>;
}
