use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use super::common::{created, ensure_owner, success};
use crate::auth::AuthenticatedPharmacy;
use crate::errors::ServiceError;
use crate::services::pharmacies::{SigninInput, SignupInput, UpdatePharmacyInput};
use crate::{AppState, ListQuery};

pub fn pharmacy_routes() -> Router<AppState> {
    Router::new()
        .route("/pharmacies", get(list_pharmacies))
        .route("/pharmacies/signup", post(signup))
        .route("/pharmacies/signin", post(signin))
        .route("/pharmacies/:id", get(get_pharmacy).patch(update_pharmacy))
        .route("/pharmacies/:id/medicines", get(medicines_stocked_by_pharmacy))
}

#[utoipa::path(
    get,
    path = "/api/v1/pharmacies",
    params(ListQuery),
    responses(
        (status = 200, description = "Registered pharmacies, newest first")
    ),
    tag = "pharmacies"
)]
pub(crate) async fn list_pharmacies(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let pharmacies = state.services.pharmacies.list_pharmacies(query.search).await?;
    Ok(success(pharmacies))
}

/// Registers a pharmacy account and returns it with a fresh token.
#[utoipa::path(
    post,
    path = "/api/v1/pharmacies/signup",
    request_body = SignupInput,
    responses(
        (status = 201, description = "Account created"),
        (status = 409, description = "Email already registered", body = crate::errors::ErrorResponse)
    ),
    tag = "pharmacies"
)]
pub(crate) async fn signup(
    State(state): State<AppState>,
    Json(input): Json<SignupInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let session = state.services.pharmacies.signup(input).await?;
    Ok(created(session))
}

#[utoipa::path(
    post,
    path = "/api/v1/pharmacies/signin",
    request_body = SigninInput,
    responses(
        (status = 200, description = "Authenticated session"),
        (status = 401, description = "Incorrect email or password", body = crate::errors::ErrorResponse)
    ),
    tag = "pharmacies"
)]
pub(crate) async fn signin(
    State(state): State<AppState>,
    Json(input): Json<SigninInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let session = state.services.pharmacies.signin(input).await?;
    Ok(success(session))
}

pub(crate) async fn get_pharmacy(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let pharmacy = state.services.pharmacies.get_pharmacy(id).await?;
    Ok(success(pharmacy))
}

pub(crate) async fn update_pharmacy(
    State(state): State<AppState>,
    operator: AuthenticatedPharmacy,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdatePharmacyInput>,
) -> Result<impl IntoResponse, ServiceError> {
    ensure_owner(&operator, id)?;
    let pharmacy = state.services.pharmacies.update_parameters(id, input).await?;
    Ok(success(pharmacy))
}

/// Public view of what a pharmacy stocks.
#[utoipa::path(
    get,
    path = "/api/v1/pharmacies/{id}/medicines",
    params(("id" = Uuid, Path, description = "Pharmacy id")),
    responses(
        (status = 200, description = "Medicines stocked by the pharmacy; empty list when none")
    ),
    tag = "pharmacies"
)]
pub(crate) async fn medicines_stocked_by_pharmacy(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let views = state.services.inventory.medicines_stocked_by(id).await?;
    Ok(success(views))
}
