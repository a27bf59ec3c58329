//! Per-window icons read from the `_NET_WM_ICON` property.

use crate::IconImage;

use std::path::Path;

use tokio::process::Command;
use tracing::{debug, instrument};
use trayify_core::WindowId;

// Larger claims are treated as corrupt property data.
const MAX_ICON_SIDE: u32 = 1024;

/// Icon of `window_id`, falling back to `fallback_path` and then the
/// built-in icon.
#[instrument(skip(fallback_path))]
pub async fn window_icon(window_id: &WindowId, fallback_path: &Path) -> IconImage {
    let output = Command::new("xprop")
        .args(["-notype", "32c", "_NET_WM_ICON", "-id", window_id.as_str()])
        .output()
        .await;

    match output {
        Ok(output) if output.status.success() => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            if let Some(icon) = parse_net_wm_icon(&stdout) {
                debug!(width = icon.width, height = icon.height, "Window icon extracted");
                return icon;
            }
            debug!("Window exposes no usable icon");
        }
        Ok(output) => debug!(status = ?output.status, "xprop failed"),
        Err(e) => debug!(error = ?e, "xprop could not be run"),
    }

    IconImage::fallback(fallback_path)
}

/// Decode `xprop` output for `_NET_WM_ICON` into the first icon it contains.
///
/// The property is `width, height, pixels...` with one ARGB value per pixel,
/// possibly followed by further icons of other sizes.
pub fn parse_net_wm_icon(output: &str) -> Option<IconImage> {
    let (_, values) = output.split_once('=')?;

    let mut numbers = values
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(str::parse::<u32>);

    let width = numbers.next()?.ok()?;
    let height = numbers.next()?.ok()?;
    if width == 0 || height == 0 || width > MAX_ICON_SIDE || height > MAX_ICON_SIDE {
        return None;
    }

    let pixel_count = (width * height) as usize;
    let mut rgba = Vec::with_capacity(pixel_count * 4);
    for _ in 0..pixel_count {
        let argb = numbers.next()?.ok()?;
        rgba.extend_from_slice(&[
            ((argb >> 16) & 0xFF) as u8,
            ((argb >> 8) & 0xFF) as u8,
            (argb & 0xFF) as u8,
            ((argb >> 24) & 0xFF) as u8,
        ]);
    }

    Some(IconImage {
        rgba,
        width,
        height,
    })
}
