use thiserror::Error;

/// Application error type
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("Unspecified tracking mode (strict={strict}, flaunt={flaunt}): exactly one must be enabled")]
    Misconfigured { strict: bool, flaunt: bool },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Dispatcher is no longer running")]
    ChannelClosed,
}

/// Check if a rusqlite error means the settings row is missing
pub fn is_missing_row(e: &rusqlite::Error) -> bool {
    matches!(e, rusqlite::Error::QueryReturnedNoRows)
}
