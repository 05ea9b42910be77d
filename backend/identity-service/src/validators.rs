use validator::Validate;

use crate::error::{AppError, AppResult};

/// Emails are compared case-insensitively; store and look up the lowered
/// form so `Bob@Example.com` and `bob@example.com` are the same account.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Run derive-based validation and fold the first failure into a 400.
pub fn validate_payload<T: Validate>(payload: &T) -> AppResult<()> {
    payload.validate().map_err(|errs| {
        let message = errs
            .field_errors()
            .iter()
            .flat_map(|(_, errors)| errors.iter())
            .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .next()
            .unwrap_or_else(|| "invalid request".to_string());
        AppError::Validation(message)
    })
}
