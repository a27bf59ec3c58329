use crate::WindowId;

use error_location::ErrorLocation;
use thiserror::Error;

/// Registry and collaborator errors with source location tracking.
///
/// `AlreadyTracked`, `NotTracked`, `OperationInProgress` and `ShuttingDown`
/// are registry-local and returned to the caller. `ControlFailed` and
/// `SelectionFailed` come from the window controller, `DisplayFailed` from
/// the tray host.
#[derive(Error, Debug)]
pub enum TrayifyError {
    /// The window already has a tray entry.
    #[error("Window {window_id} is already tracked {location}")]
    AlreadyTracked {
        /// Window that was already present in the registry.
        window_id: WindowId,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The window has no tray entry.
    #[error("Window {window_id} is not tracked {location}")]
    NotTracked {
        /// Window that was looked up.
        window_id: WindowId,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Another restore or kill currently owns the entry.
    #[error("Window {window_id} has an operation in progress {location}")]
    OperationInProgress {
        /// Window whose entry is claimed.
        window_id: WindowId,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The registry has been shut down and accepts no new entries.
    #[error("Registry is shutting down {location}")]
    ShuttingDown {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A show, hide or terminate call on a window failed.
    #[error("Window control failed: {reason} {location}")]
    ControlFailed {
        /// Description of the failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Interactive window selection failed or was cancelled.
    #[error("Window selection failed: {reason} {location}")]
    SelectionFailed {
        /// Description of the failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The tray host could not display or update an entry.
    #[error("Tray display failed: {reason} {location}")]
    DisplayFailed {
        /// Description of the failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

/// Result type alias using [`TrayifyError`].
pub type Result<T> = std::result::Result<T, TrayifyError>;
