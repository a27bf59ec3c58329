//! Trayify Core Library
//!
//! Tracks windows hidden into the system tray: one tray entry per hidden
//! window, restore and kill actions, and a primary menu that mirrors the
//! registry. Window control and tray display are supplied by the caller
//! through [`WindowController`] and [`TrayHost`].
//!
//! # Example
//!
//! ```no_run
//! use trayify_core::{
//!     CoreResult, EntryRegistry, RegistryOptions, TrayHost, WindowController,
//! };
//!
//! use std::sync::Arc;
//!
//! async fn run(
//!     controller: Arc<dyn WindowController>,
//!     host: Arc<dyn TrayHost>,
//! ) -> CoreResult<()> {
//!     let registry = EntryRegistry::new(controller, host, RegistryOptions::default());
//!     registry.set_main_entry().await;
//!
//!     let picked = registry.trayify().await?;
//!     registry.restore(&picked.window_id).await?;
//!
//!     registry.shutdown().await;
//!     Ok(())
//! }
//! ```

mod error;
mod menu;
mod registry;
mod tray_host;
mod window;
mod window_state;

pub use {
    error::Result as CoreResult,
    error::TrayifyError,
    menu::{
        EXIT_LABEL, MenuAction, MenuItemSpec, MenuSpec, MenuSynchronizer, RegistrySnapshot,
        TRAYIFY_LABEL, build_menu, entry_menu,
    },
    registry::{DEFAULT_SHUTDOWN_GRACE, EntryRegistry, RegistryOptions},
    tray_host::{EntryHandle, MenuTarget, TrayHost},
    window::{SelectedWindow, WindowController, WindowId},
    window_state::{WindowEvent, WindowState},
};

#[cfg(test)]
mod tests;
