//! Window identity and the window-controller capability.

use crate::CoreResult;

use std::fmt;

use async_trait::async_trait;

/// Identifier of a window in the host windowing system (e.g. `0x3e00004`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(String);

impl WindowId {
    /// Wrap a raw window identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier as passed to the windowing tools.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WindowId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for WindowId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A window picked by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedWindow {
    /// Identifier of the picked window.
    pub window_id: WindowId,
    /// Display name of the picked window.
    pub title: String,
}

/// Selection, visibility and termination primitives for individual windows.
///
/// Implementations never hold a reference back to the registry; menu actions
/// call [`EntryRegistry`](crate::EntryRegistry) methods directly.
#[async_trait]
pub trait WindowController: Send + Sync {
    /// Block until the user picks a window, or fail with `SelectionFailed`.
    async fn select_window(&self) -> CoreResult<SelectedWindow>;

    /// Map the window so it becomes visible again.
    async fn show(&self, window_id: &WindowId) -> CoreResult<()>;

    /// Unmap the window without destroying it.
    async fn hide(&self, window_id: &WindowId) -> CoreResult<()>;

    /// Ask the user for confirmation, then destroy the window if confirmed.
    ///
    /// Returns whether the user confirmed.
    async fn terminate(&self, window_id: &WindowId, title: &str) -> CoreResult<bool>;
}
