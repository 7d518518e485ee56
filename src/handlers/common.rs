use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::AuthenticatedPharmacy;
use crate::errors::ServiceError;
use crate::ApiResponse;

/// 200 with the standard response envelope.
pub fn success<T: Serialize>(data: T) -> impl IntoResponse {
    Json(ApiResponse::success(data))
}

/// 201 with the standard response envelope.
pub fn created<T: Serialize>(data: T) -> impl IntoResponse {
    (StatusCode::CREATED, Json(ApiResponse::success(data)))
}

/// 204, used after deletes.
pub fn no_content() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}

/// The token subject must match the pharmacy id in the path. A valid token
/// for a different pharmacy is Forbidden, not Unauthorized.
pub fn ensure_owner(
    operator: &AuthenticatedPharmacy,
    pharmacy_id: Uuid,
) -> Result<(), ServiceError> {
    if operator.pharmacy_id != pharmacy_id {
        return Err(ServiceError::Forbidden(
            "You can only manage your own pharmacy".to_string(),
        ));
    }
    Ok(())
}
