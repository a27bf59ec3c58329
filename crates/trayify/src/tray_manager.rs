//! System tray icons owned by the main thread.
//!
//! Holds the primary entry and one icon per hidden window, and applies the
//! `TrayCommand`s sent by `TrayHandle`.

use crate::{AppError, AppResult, IconImage, TrayCommand};

use std::{collections::HashMap, panic::Location};

use error_location::ErrorLocation;
use tracing::{debug, error, info, instrument};
use tray_icon::menu::{Menu, MenuItem, PredefinedMenuItem};
use tray_icon::{TrayIcon, TrayIconBuilder};
use trayify_core::{MenuItemSpec, MenuSpec, RegistrySnapshot, build_menu};

const PRIMARY_TOOLTIP: &str = "Trayify";

/// System tray icon manager.
pub struct TrayManager {
    primary: TrayIcon,
    entries: HashMap<u64, TrayIcon>,
}

impl TrayManager {
    /// Create the primary entry with the menu of an empty registry.
    #[track_caller]
    #[instrument]
    pub fn new(icon: IconImage) -> AppResult<Self> {
        let menu = Self::build_menu(&build_menu(&RegistrySnapshot::default(), false))?;

        let primary = TrayIconBuilder::new()
            .with_tooltip(PRIMARY_TOOLTIP)
            .with_title(PRIMARY_TOOLTIP)
            .with_menu(Box::new(menu))
            .with_icon(icon.into_tray_icon()?)
            .build()
            .map_err(|e| AppError::TrayError {
                reason: format!("Failed to create tray icon: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!("System tray icon initialized");

        Ok(Self {
            primary,
            entries: HashMap::new(),
        })
    }

    /// Apply a command and answer its reply channel.
    pub fn apply(&mut self, command: TrayCommand) {
        let (result, reply) = match command {
            TrayCommand::CreateEntry {
                entry,
                title,
                icon,
                menu,
                reply,
            } => (self.create_entry(entry, &title, icon, &menu), reply),
            TrayCommand::UpdateMenu { entry, menu, reply } => {
                (self.update_menu(entry, &menu), reply)
            }
            TrayCommand::DestroyEntry { entry, reply } => (self.destroy_entry(entry), reply),
            TrayCommand::Shutdown => return,
        };

        if let Err(e) = &result {
            error!(error = ?e, "Tray command failed");
        }
        // The requester may have given up waiting.
        let _ = reply.send(result);
    }

    #[track_caller]
    #[instrument(skip(self, icon, menu))]
    fn create_entry(
        &mut self,
        entry: u64,
        title: &str,
        icon: IconImage,
        menu: &MenuSpec,
    ) -> AppResult<()> {
        let tray_icon = TrayIconBuilder::new()
            .with_tooltip(title)
            .with_title(title)
            .with_menu(Box::new(Self::build_menu(menu)?))
            .with_icon(icon.into_tray_icon()?)
            .build()
            .map_err(|e| AppError::TrayError {
                reason: format!("Failed to create entry for {}: {}", title, e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        self.entries.insert(entry, tray_icon);
        debug!(live_entries = self.entries.len(), "Tray entry displayed");

        Ok(())
    }

    #[track_caller]
    #[instrument(skip(self, menu))]
    fn update_menu(&mut self, entry: Option<u64>, menu: &MenuSpec) -> AppResult<()> {
        let menu = Self::build_menu(menu)?;

        let tray_icon = match entry {
            None => &self.primary,
            Some(entry) => self.entries.get(&entry).ok_or_else(|| AppError::TrayError {
                reason: format!("Unknown tray entry {}", entry),
                location: ErrorLocation::from(Location::caller()),
            })?,
        };

        tray_icon.set_menu(Some(Box::new(menu)));
        Ok(())
    }

    #[track_caller]
    #[instrument(skip(self))]
    fn destroy_entry(&mut self, entry: u64) -> AppResult<()> {
        let tray_icon = self.entries.remove(&entry).ok_or_else(|| AppError::TrayError {
            reason: format!("Unknown tray entry {}", entry),
            location: ErrorLocation::from(Location::caller()),
        })?;

        tray_icon
            .set_visible(false)
            .map_err(|e| AppError::TrayError {
                reason: format!("Failed to hide tray entry: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        // Dropping the icon removes it from the tray.
        drop(tray_icon);
        debug!(live_entries = self.entries.len(), "Tray entry destroyed");

        Ok(())
    }

    #[track_caller]
    fn build_menu(spec: &MenuSpec) -> AppResult<Menu> {
        let menu = Menu::new();

        for item in spec.items() {
            let appended = match item {
                MenuItemSpec::Action { label, action } => {
                    menu.append(&MenuItem::with_id(action.menu_id(), label, true, None))
                }
                MenuItemSpec::Separator => menu.append(&PredefinedMenuItem::separator()),
            };

            appended.map_err(|e| AppError::TrayError {
                reason: format!("Failed to add menu item: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;
        }

        Ok(menu)
    }
}
