use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, patch, post},
    Json, Router,
};
use uuid::Uuid;

use super::common::{created, ensure_owner, no_content, success};
use crate::auth::AuthenticatedPharmacy;
use crate::errors::ServiceError;
use crate::services::inventory::{
    AddStockInput, CreateMedicineAndStockInput, UpdateStockInput,
};
use crate::AppState;

pub fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/pharmacies/:id/inventory",
            get(list_inventory).post(add_to_inventory),
        )
        .route(
            "/pharmacies/:id/inventory/create-new",
            post(create_medicine_in_inventory),
        )
        .route(
            "/pharmacies/:id/inventory/:inventory_id",
            patch(update_inventory_line).delete(remove_inventory_line),
        )
}

/// Operator view of the pharmacy's stock; same data as the public
/// `/pharmacies/:id/medicines` listing.
pub(crate) async fn list_inventory(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let views = state.services.inventory.medicines_stocked_by(id).await?;
    Ok(success(views))
}

/// Adds an existing catalog medicine to the authenticated pharmacy's stock.
#[utoipa::path(
    post,
    path = "/api/v1/pharmacies/{id}/inventory",
    params(("id" = Uuid, Path, description = "Pharmacy id")),
    request_body = AddStockInput,
    responses(
        (status = 201, description = "Stock line created"),
        (status = 404, description = "Unknown medicine", body = crate::errors::ErrorResponse),
        (status = 409, description = "Medicine already stocked", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "inventory"
)]
pub(crate) async fn add_to_inventory(
    State(state): State<AppState>,
    operator: AuthenticatedPharmacy,
    Path(id): Path<Uuid>,
    Json(input): Json<AddStockInput>,
) -> Result<impl IntoResponse, ServiceError> {
    ensure_owner(&operator, id)?;
    let view = state
        .services
        .inventory
        .add_existing_medicine_to_stock(id, input)
        .await?;
    Ok(created(view))
}

/// Creates a new catalog medicine and stocks it in one call.
#[utoipa::path(
    post,
    path = "/api/v1/pharmacies/{id}/inventory/create-new",
    params(("id" = Uuid, Path, description = "Pharmacy id")),
    request_body = CreateMedicineAndStockInput,
    responses(
        (status = 201, description = "Medicine created and stocked"),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse),
        (status = 500, description = "Medicine created but not linked", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "inventory"
)]
pub(crate) async fn create_medicine_in_inventory(
    State(state): State<AppState>,
    operator: AuthenticatedPharmacy,
    Path(id): Path<Uuid>,
    Json(input): Json<CreateMedicineAndStockInput>,
) -> Result<impl IntoResponse, ServiceError> {
    ensure_owner(&operator, id)?;
    let view = state
        .services
        .inventory
        .create_medicine_and_stock(id, input)
        .await?;
    Ok(created(view))
}

#[utoipa::path(
    patch,
    path = "/api/v1/pharmacies/{id}/inventory/{inventory_id}",
    params(
        ("id" = Uuid, Path, description = "Pharmacy id"),
        ("inventory_id" = Uuid, Path, description = "Stock line id")
    ),
    request_body = UpdateStockInput,
    responses(
        (status = 200, description = "Stock line updated"),
        (status = 404, description = "No such line for this pharmacy", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "inventory"
)]
pub(crate) async fn update_inventory_line(
    State(state): State<AppState>,
    operator: AuthenticatedPharmacy,
    Path((id, inventory_id)): Path<(Uuid, Uuid)>,
    Json(input): Json<UpdateStockInput>,
) -> Result<impl IntoResponse, ServiceError> {
    ensure_owner(&operator, id)?;
    let entry = state
        .services
        .inventory
        .update_stock_line(id, inventory_id, input)
        .await?;
    Ok(success(entry))
}

#[utoipa::path(
    delete,
    path = "/api/v1/pharmacies/{id}/inventory/{inventory_id}",
    params(
        ("id" = Uuid, Path, description = "Pharmacy id"),
        ("inventory_id" = Uuid, Path, description = "Stock line id")
    ),
    responses(
        (status = 204, description = "Stock line removed"),
        (status = 404, description = "No such line for this pharmacy", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "inventory"
)]
pub(crate) async fn remove_inventory_line(
    State(state): State<AppState>,
    operator: AuthenticatedPharmacy,
    Path((id, inventory_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ServiceError> {
    ensure_owner(&operator, id)?;
    state
        .services
        .inventory
        .remove_stock_line(id, inventory_id)
        .await?;
    Ok(no_content())
}
