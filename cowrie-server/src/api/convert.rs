//! Handler-level conversions

use surrealdb::RecordId;

use crate::auth::CurrentUser;
use crate::utils::AppError;

/// Resolve the authenticated principal's record id ("user:xxx")
pub fn principal_id(user: &CurrentUser) -> Result<RecordId, AppError> {
    user.id
        .parse::<RecordId>()
        .map_err(|_| AppError::invalid_token(format!("Malformed subject: {}", user.id)))
}
