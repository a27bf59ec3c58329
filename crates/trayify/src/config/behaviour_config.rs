use crate::config::{default_confirm_kill, default_shutdown_grace_ms};

use serde::{Deserialize, Serialize};

/// Application behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviourConfig {
    /// Ask before terminating a window from its tray entry.
    #[serde(default = "default_confirm_kill")]
    pub confirm_kill: bool,

    /// Milliseconds shutdown waits for pending restore/kill actions.
    #[serde(default = "default_shutdown_grace_ms")]
    pub shutdown_grace_ms: u64,
}

impl Default for BehaviourConfig {
    fn default() -> Self {
        Self {
            confirm_kill: default_confirm_kill(),
            shutdown_grace_ms: default_shutdown_grace_ms(),
        }
    }
}
