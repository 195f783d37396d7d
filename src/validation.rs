use crate::constants::MAX_REFRESH_INTERVAL_SECS;
use crate::error::AppError;
use std::time::Duration;

/// Validate the presence refresh interval in seconds.
pub fn validate_refresh_interval_secs(secs: u64) -> Result<Duration, AppError> {
    if secs == 0 {
        return Err(AppError::InvalidInput {
            field: "interval",
            reason: "must be positive".into(),
        });
    }
    if secs > MAX_REFRESH_INTERVAL_SECS {
        return Err(AppError::InvalidInput {
            field: "interval",
            reason: format!("cannot exceed {MAX_REFRESH_INTERVAL_SECS} seconds"),
        });
    }
    Ok(Duration::from_secs(secs))
}

/// Validate a Discord application id (a snowflake, all digits).
pub fn validate_client_id(client_id: &str) -> Result<&str, AppError> {
    let client_id = client_id.trim();
    if client_id.is_empty() {
        return Err(AppError::InvalidInput {
            field: "client_id",
            reason: "cannot be empty".into(),
        });
    }
    if !client_id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::InvalidInput {
            field: "client_id",
            reason: "must contain only digits".into(),
        });
    }
    Ok(client_id)
}

/// Validate the identifier lifecycle signals are matched against.
pub fn validate_bundle_id(bundle_id: &str) -> Result<&str, AppError> {
    let bundle_id = bundle_id.trim();
    if bundle_id.is_empty() {
        return Err(AppError::InvalidInput {
            field: "bundle_id",
            reason: "cannot be empty".into(),
        });
    }
    if bundle_id.chars().any(char::is_whitespace) {
        return Err(AppError::InvalidInput {
            field: "bundle_id",
            reason: "cannot contain whitespace".into(),
        });
    }
    Ok(bundle_id)
}
