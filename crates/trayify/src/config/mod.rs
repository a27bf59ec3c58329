mod behaviour_config;
#[allow(clippy::module_inception)]
mod config;
mod tray_config;

pub(crate) use {behaviour_config::BehaviourConfig, config::Config, tray_config::TrayConfig};

pub(crate) const DEFAULT_CONFIRM_KILL: bool = true;
pub(crate) const DEFAULT_SHUTDOWN_GRACE_MS: u64 = 2000;
pub(crate) const DEFAULT_WINDOW_ICON: &str =
    "/usr/share/icons/Adwaita/32x32/apps/utilities-terminal-symbolic.symbolic.png";

pub(crate) fn default_confirm_kill() -> bool {
    DEFAULT_CONFIRM_KILL
}

pub(crate) fn default_shutdown_grace_ms() -> u64 {
    DEFAULT_SHUTDOWN_GRACE_MS
}

pub(crate) fn default_window_icon() -> std::path::PathBuf {
    std::path::PathBuf::from(DEFAULT_WINDOW_ICON)
}
