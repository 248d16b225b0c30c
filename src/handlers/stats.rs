use crate::errors::ServiceError;
use crate::services::stats::InventoryStats;
use crate::AppState;
use axum::extract::{Json, State};

/// Dashboard figures computed from the current inventory
#[utoipa::path(
    get,
    path = "/api/stats",
    responses(
        (status = 200, description = "Inventory statistics", body = InventoryStats),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "stats"
)]
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<InventoryStats>, ServiceError> {
    let stats = state.stats_service.current().await?;
    Ok(Json(stats))
}
