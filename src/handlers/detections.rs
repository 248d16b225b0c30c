use crate::errors::ServiceError;
use crate::events::Event;
use crate::services::detection::{DetectionFrame, FrameReport};
use crate::AppState;
use axum::extract::{rejection::JsonRejection, Json, State};
use chrono::Utc;

/// Upper bound on detections accepted in one frame
pub const MAX_DETECTIONS_PER_FRAME: usize = 1_000;

/// Apply one detector frame to the inventory
#[utoipa::path(
    post,
    path = "/api/detections",
    request_body = DetectionFrame,
    responses(
        (status = 200, description = "Frame processed; per-label outcome", body = FrameReport),
        (status = 400, description = "Malformed frame", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "detections"
)]
pub async fn process_frame(
    State(state): State<AppState>,
    payload: Result<Json<DetectionFrame>, JsonRejection>,
) -> Result<Json<FrameReport>, ServiceError> {
    let Json(frame) = payload?;
    if frame.detections.len() > MAX_DETECTIONS_PER_FRAME {
        return Err(ServiceError::ValidationError(format!(
            "a frame may carry at most {} detections",
            MAX_DETECTIONS_PER_FRAME
        )));
    }

    let report = state.detection_adapter.process_frame(&frame).await;
    state
        .event_sender
        .send_or_log(Event::DetectionFrameProcessed {
            applied: report.applied.len(),
            dropped: report.dropped,
            failed: report.failed.len(),
            at: Utc::now(),
        })
        .await;

    Ok(Json(report))
}
