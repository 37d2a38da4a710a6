//! Error types for the reminder subsystem.

use siyam_times::TimesError;

/// Top-level error type for scheduling and store operations.
#[derive(Debug, thiserror::Error)]
pub enum ReminderError {
    /// The host refuses to accept new reminders.
    #[error("reminder permission not granted")]
    PermissionDenied,

    /// The host notification store rejected a write.
    #[error("store write failed: {0}")]
    StoreWrite(String),

    /// The host notification store could not be read or cleared.
    #[error("store error: {0}")]
    Store(String),

    /// A one-off reminder was requested for an instant that has passed.
    #[error("trigger is not in the future: {0}")]
    TriggerInPast(String),

    /// No pending reminder has this handle.
    #[error("unknown notification handle: {0}")]
    UnknownHandle(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Time service client error (construction only; lookups never fail).
    #[error("time service error: {0}")]
    Times(#[from] TimesError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, ReminderError>;
