use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use axum::Json;
use uuid::Uuid;

use super::common::{created, no_content, success};
use crate::errors::ServiceError;
use crate::services::catalog::{CreateMedicineInput, UpdateMedicineInput};
use crate::{AppState, ListQuery};

pub fn medicine_routes() -> Router<AppState> {
    Router::new()
        .route("/medicines", get(list_medicines).post(create_medicine))
        .route(
            "/medicines/:id",
            get(get_medicine).patch(update_medicine).delete(delete_medicine),
        )
        .route("/medicines/:id/pharmacies", get(pharmacies_carrying_medicine))
}

/// List the medicine catalog, optionally filtered by name.
#[utoipa::path(
    get,
    path = "/api/v1/medicines",
    params(ListQuery),
    responses(
        (status = 200, description = "Catalog listing, newest first")
    ),
    tag = "medicines"
)]
pub(crate) async fn list_medicines(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let medicines = state.services.medicines.list_medicines(query.search).await?;
    Ok(success(medicines))
}

#[utoipa::path(
    post,
    path = "/api/v1/medicines",
    request_body = CreateMedicineInput,
    responses(
        (status = 201, description = "Medicine created"),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse)
    ),
    tag = "medicines"
)]
pub(crate) async fn create_medicine(
    State(state): State<AppState>,
    Json(input): Json<CreateMedicineInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let medicine = state.services.medicines.create_medicine(input).await?;
    Ok(created(medicine))
}

#[utoipa::path(
    get,
    path = "/api/v1/medicines/{id}",
    params(("id" = Uuid, Path, description = "Medicine id")),
    responses(
        (status = 200, description = "Medicine detail"),
        (status = 404, description = "Unknown medicine", body = crate::errors::ErrorResponse)
    ),
    tag = "medicines"
)]
pub(crate) async fn get_medicine(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let medicine = state.services.medicines.get_medicine(id).await?;
    Ok(success(medicine))
}

pub(crate) async fn update_medicine(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateMedicineInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let medicine = state.services.medicines.update_medicine(id, input).await?;
    Ok(success(medicine))
}

pub(crate) async fn delete_medicine(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.medicines.delete_medicine(id).await?;
    Ok(no_content())
}

/// All pharmacies carrying this medicine, each with its own price and stock.
#[utoipa::path(
    get,
    path = "/api/v1/medicines/{id}/pharmacies",
    params(("id" = Uuid, Path, description = "Medicine id")),
    responses(
        (status = 200, description = "Pharmacies carrying the medicine; empty list when none")
    ),
    tag = "medicines"
)]
pub(crate) async fn pharmacies_carrying_medicine(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let views = state.services.inventory.pharmacies_carrying(id).await?;
    Ok(success(views))
}
