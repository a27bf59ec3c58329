use crate::config::default_window_icon;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Tray appearance configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrayConfig {
    /// PNG for the primary entry (None = built-in icon).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_icon_path: Option<PathBuf>,

    /// Icon for windows that expose no icon of their own.
    #[serde(default = "default_window_icon")]
    pub default_icon_path: PathBuf,

    /// List every hidden window in the primary menu.
    #[serde(default)]
    pub show_window_list: bool,
}

impl Default for TrayConfig {
    fn default() -> Self {
        Self {
            main_icon_path: None,
            default_icon_path: default_window_icon(),
            show_window_list: false,
        }
    }
}
