/// Commands sent to the main application loop.
#[derive(Debug, Clone)]
pub enum AppCommand {
    /// Restore every window and exit.
    Shutdown {
        /// What asked for the shutdown (signal name).
        reason: &'static str,
    },
}
