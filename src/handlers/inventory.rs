use crate::dto::{UpdateItemRequest, UpsertItemRequest};
use crate::entities::inventory_item::Model as InventoryItem;
use crate::errors::ServiceError;
use crate::services::reconciliation::ReconciliationService;
use crate::ApiResponse;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Json, Path, State,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Router,
};
use tracing::info;

// Trait for inventory handler state that provides access to the reconciliation service
pub trait InventoryHandlerState: Clone + Send + Sync + 'static {
    fn reconciliation(&self) -> &ReconciliationService;
}

/// Create the inventory router, mounted under `/api/inventory`
pub fn inventory_router<S>() -> Router<S>
where
    S: InventoryHandlerState,
{
    Router::new()
        .route("/", get(list_inventory::<S>))
        .route("/add/:name", put(add_or_merge_item::<S>))
        .route("/update/:id", put(update_item::<S>))
        .route("/:id", get(get_item::<S>))
}

/// List every inventory item
#[utoipa::path(
    get,
    path = "/api/inventory",
    responses(
        (status = 200, description = "All inventory items", body = [InventoryItem],
            headers(("X-Request-Id" = String, description = "Unique request id for tracing"))
        ),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn list_inventory<S>(State(state): State<S>) -> Result<impl IntoResponse, ServiceError>
where
    S: InventoryHandlerState,
{
    let items = state.reconciliation().list_items().await?;
    Ok(Json(items))
}

/// Add units of an item by name, creating it when absent
#[utoipa::path(
    put,
    path = "/api/inventory/add/{name}",
    params(
        ("name" = String, Path, description = "Item name, matched exactly")
    ),
    request_body = UpsertItemRequest,
    responses(
        (status = 201, description = "New item added", body = ApiResponse<InventoryItem>),
        (status = 200, description = "Existing item quantity merged", body = ApiResponse<InventoryItem>),
        (status = 400, description = "Missing or malformed fields", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn add_or_merge_item<S>(
    State(state): State<S>,
    name: Result<Path<String>, PathRejection>,
    payload: Result<Json<UpsertItemRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ServiceError>
where
    S: InventoryHandlerState,
{
    let Path(name) = name?;
    let Json(payload) = payload?;
    let command = payload.into_command(&name)?;

    let outcome = state.reconciliation().upsert_by_name(command).await?;
    let (status, message) = if outcome.created {
        (StatusCode::CREATED, "New item added successfully")
    } else {
        (StatusCode::OK, "Item quantity updated successfully")
    };
    info!(id = outcome.item.id, %name, created = outcome.created, "add request applied");

    Ok((status, Json(ApiResponse::with_message(outcome.item, message))))
}

/// Replace cost, expiry and status of an item by id
#[utoipa::path(
    put,
    path = "/api/inventory/update/{id}",
    params(
        ("id" = i32, Path, description = "Inventory item id")
    ),
    request_body = UpdateItemRequest,
    responses(
        (status = 200, description = "Item updated", body = ApiResponse<InventoryItem>),
        (status = 400, description = "Missing or malformed fields", body = crate::errors::ErrorResponse),
        (status = 404, description = "No item has that id", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn update_item<S>(
    State(state): State<S>,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<UpdateItemRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ServiceError>
where
    S: InventoryHandlerState,
{
    let Path(id) = id?;
    let Json(payload) = payload?;
    let update = payload.into_command()?;

    let item = state.reconciliation().update_by_id(id, update).await?;
    Ok(Json(ApiResponse::with_message(item, "Item updated successfully")))
}

/// Fetch a single item
#[utoipa::path(
    get,
    path = "/api/inventory/{id}",
    params(
        ("id" = i32, Path, description = "Inventory item id")
    ),
    responses(
        (status = 200, description = "Inventory item", body = InventoryItem),
        (status = 400, description = "Id is not an integer", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn get_item<S>(
    State(state): State<S>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<impl IntoResponse, ServiceError>
where
    S: InventoryHandlerState,
{
    let Path(id) = id?;
    let item = state.reconciliation().get_item(id).await?;
    Ok(Json(item))
}
