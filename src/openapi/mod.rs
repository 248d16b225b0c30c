use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Kitchen Inventory API",
        version = "1.0.0",
        description = r#"
# Kitchen Inventory API

Inventory backend for a kitchen dashboard.

- **Add or merge by name**: `PUT /api/inventory/add/{name}` adds units to an
  existing item or creates it; cost, expiry and status are replaced.
- **Edit by id**: `PUT /api/inventory/update/{id}` replaces cost, expiry and
  status; quantity is never touched.
- **Detections**: `POST /api/detections` counts one detector frame per label
  (allow-listed produce only) and applies each count as an add-or-merge.

Status accepts `Good`/`Warning`/`Danger` or `In Stock`/`Low`/`Critical`
case-insensitively; the add path also accepts `auto`.

## Error Handling

```json
{
  "error": "Bad Request",
  "message": "Validation error: Missing required fields: cost",
  "request_id": "6f1c...",
  "timestamp": "2025-01-01T00:00:00Z"
}
```
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:5000", description = "Local development")
    ),
    tags(
        (name = "inventory", description = "Inventory items"),
        (name = "detections", description = "Detector frame ingestion"),
        (name = "stats", description = "Dashboard statistics")
    ),
    paths(
        crate::handlers::inventory::list_inventory,
        crate::handlers::inventory::add_or_merge_item,
        crate::handlers::inventory::update_item,
        crate::handlers::inventory::get_item,
        crate::handlers::detections::process_frame,
        crate::handlers::stats::get_stats,
    ),
    components(
        schemas(
            crate::entities::inventory_item::Model,
            crate::entities::inventory_item::StockStatus,
            crate::dto::UpsertItemRequest,
            crate::dto::UpdateItemRequest,
            crate::services::detection::Detection,
            crate::services::detection::DetectionFrame,
            crate::services::detection::FrameReport,
            crate::services::detection::AppliedLabel,
            crate::services::detection::FailedLabel,
            crate::services::stats::InventoryStats,
            crate::services::stats::StatusCounts,
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_every_inventory_route() {
        let openapi = ApiDocV1::openapi();
        let json = serde_json::to_string_pretty(&openapi).unwrap();
        assert!(json.contains("Kitchen Inventory API"));
        assert!(json.contains("/api/inventory/add/{name}"));
        assert!(json.contains("/api/inventory/update/{id}"));
        assert!(json.contains("/api/detections"));
        assert!(json.contains("InventoryItem"));
    }
}
