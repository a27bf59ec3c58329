//! X11 window control through `xwininfo`, `xdotool` and `zenity`.

use std::{panic::Location, process::Output};

use async_trait::async_trait;
use error_location::ErrorLocation;
use tokio::process::Command;
use tracing::{debug, info, instrument};
use trayify_core::{CoreResult, SelectedWindow, TrayifyError, WindowController, WindowId};

const UNNAMED_WINDOW: &str = "(has no name)";

/// Drives X11 windows with the standard command-line tools.
pub struct X11WindowController {
    confirm_kill: bool,
}

impl X11WindowController {
    /// Create a controller. With `confirm_kill` off, kills skip the prompt.
    pub fn new(confirm_kill: bool) -> Self {
        Self { confirm_kill }
    }

    async fn xdotool(&self, action: &str, window_id: &WindowId) -> CoreResult<()> {
        let output = run("xdotool", &[action, window_id.as_str()])
            .await
            .map_err(|reason| TrayifyError::ControlFailed {
                reason,
                location: ErrorLocation::from(Location::caller()),
            })?;

        if !output.status.success() {
            return Err(TrayifyError::ControlFailed {
                reason: format!(
                    "xdotool {} {} exited with {}: {}",
                    action,
                    window_id,
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(())
    }

    async fn confirm(&self, title: &str) -> CoreResult<bool> {
        if !self.confirm_kill {
            return Ok(true);
        }

        let question = format!("Are you sure you want to Terminate {}?", title);
        let output = run("zenity", &["--question", "--text", &question])
            .await
            .map_err(|reason| TrayifyError::ControlFailed {
                reason,
                location: ErrorLocation::from(Location::caller()),
            })?;

        // zenity exits 0 on "Yes"; "No", Escape and closing the dialog are all non-zero.
        Ok(output.status.success())
    }
}

#[async_trait]
impl WindowController for X11WindowController {
    #[instrument(skip(self))]
    async fn select_window(&self) -> CoreResult<SelectedWindow> {
        let output = run("xwininfo", &[])
            .await
            .map_err(|reason| TrayifyError::SelectionFailed {
                reason,
                location: ErrorLocation::from(Location::caller()),
            })?;

        if !output.status.success() {
            return Err(TrayifyError::SelectionFailed {
                reason: format!(
                    "xwininfo exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        parse_xwininfo(&String::from_utf8_lossy(&output.stdout)).ok_or_else(|| {
            TrayifyError::SelectionFailed {
                reason: "No window id found".to_string(),
                location: ErrorLocation::from(Location::caller()),
            }
        })
    }

    #[instrument(skip(self))]
    async fn show(&self, window_id: &WindowId) -> CoreResult<()> {
        self.xdotool("windowmap", window_id).await?;
        debug!("Window mapped");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn hide(&self, window_id: &WindowId) -> CoreResult<()> {
        self.xdotool("windowunmap", window_id).await?;
        debug!("Window unmapped");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn terminate(&self, window_id: &WindowId, title: &str) -> CoreResult<bool> {
        if !self.confirm(title).await? {
            info!("Termination declined");
            return Ok(false);
        }

        self.xdotool("windowkill", window_id).await?;
        info!("Window killed");
        Ok(true)
    }
}

async fn run(program: &str, args: &[&str]) -> Result<Output, String> {
    Command::new(program)
        .args(args)
        .output()
        .await
        .map_err(|e| format!("Failed to run {}: {}", program, e))
}

/// Extract the window id and name from `xwininfo` output.
///
/// The relevant line reads `xwininfo: Window id: 0x3e00004 "Title"`. Windows
/// without a name are labelled with their id.
pub fn parse_xwininfo(output: &str) -> Option<SelectedWindow> {
    let line = output.lines().find(|line| line.contains("Window id:"))?;
    let (_, rest) = line.split_once("Window id:")?;
    let rest = rest.trim();

    let id = rest.split_whitespace().next()?;
    let name = rest[id.len()..].trim();
    let name = name
        .strip_prefix('"')
        .and_then(|n| n.strip_suffix('"'))
        .unwrap_or(name);

    let title = if name.is_empty() || name == UNNAMED_WINDOW {
        id.to_string()
    } else {
        name.to_string()
    };

    Some(SelectedWindow {
        window_id: WindowId::new(id),
        title,
    })
}
