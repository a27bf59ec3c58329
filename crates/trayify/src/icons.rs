//! Icon bitmaps for the primary and per-window tray entries.
//!
//! Images travel between threads as raw RGBA and only become
//! `tray_icon::Icon`s on the main thread.

use crate::{AppError, AppResult, config::TrayConfig};

use std::{panic::Location, path::Path};

use error_location::ErrorLocation;
use tracing::{debug, instrument};
use tray_icon::Icon;

const PLACEHOLDER_SIZE: u32 = 32;

/// An RGBA bitmap.
#[derive(Clone, PartialEq, Eq)]
pub struct IconImage {
    /// Pixels, 4 bytes each, row-major.
    pub rgba: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl std::fmt::Debug for IconImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IconImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl IconImage {
    /// Decode an image file.
    #[track_caller]
    #[instrument]
    pub fn load(path: &Path) -> AppResult<Self> {
        let img = image::open(path).map_err(|e| AppError::IconError {
            reason: format!("Failed to decode {}: {}", path.display(), e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let rgba = img.into_rgba8();
        let (width, height) = (rgba.width(), rgba.height());

        Ok(Self {
            rgba: rgba.into_raw(),
            width,
            height,
        })
    }

    /// Icon for the primary entry.
    ///
    /// A configured path that cannot be loaded is an error; without one the
    /// built-in icon is used.
    #[track_caller]
    pub fn main_icon(config: &TrayConfig) -> AppResult<Self> {
        match &config.main_icon_path {
            Some(path) => Self::load(path),
            None => Ok(Self::placeholder()),
        }
    }

    /// The configured fallback icon, or the built-in one if it cannot be read.
    pub fn fallback(path: &Path) -> Self {
        match Self::load(path) {
            Ok(icon) => icon,
            Err(e) => {
                debug!(error = ?e, "Default window icon unavailable, using built-in icon");
                Self::placeholder()
            }
        }
    }

    /// Built-in icon: a window outline with a filled title bar.
    pub fn placeholder() -> Self {
        let size = PLACEHOLDER_SIZE as usize;
        let mut rgba = vec![0u8; size * size * 4];

        for y in 0..size {
            for x in 0..size {
                let border = x < 3 || y < 3 || x >= size - 3 || y >= size - 3;
                let title_bar = y < 10;
                let (r, g, b, a) = match (border, title_bar) {
                    (true, _) | (false, true) => (52, 101, 164, 255),
                    (false, false) => (238, 238, 236, 255),
                };

                let idx = (y * size + x) * 4;
                rgba[idx] = r;
                rgba[idx + 1] = g;
                rgba[idx + 2] = b;
                rgba[idx + 3] = a;
            }
        }

        Self {
            rgba,
            width: PLACEHOLDER_SIZE,
            height: PLACEHOLDER_SIZE,
        }
    }

    /// Convert into a tray icon. Call on the main thread.
    #[track_caller]
    pub fn into_tray_icon(self) -> AppResult<Icon> {
        Icon::from_rgba(self.rgba, self.width, self.height).map_err(|e| AppError::IconError {
            reason: format!("Failed to create icon from RGBA: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })
    }
}
