//! Turns per-frame object detections into inventory upserts.
//!
//! Each frame is reduced to one count per allowed label; every counted label
//! becomes a single add-or-merge. Failed upserts are logged and reported but
//! never retried.

use async_trait::async_trait;
use chrono::{Days, NaiveDate, Utc};
use metrics::counter;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, instrument, warn};
use utoipa::ToSchema;

use crate::config::DetectionConfig;
use crate::dto::UpsertItem;
use crate::entities::inventory_item::StockStatus;
use crate::errors::ServiceError;
use crate::repositories::inventory_repository::StatusRule;
use crate::services::reconciliation::UpsertOutcome;

/// Quantity a detection upsert derives its status from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StatusBasis {
    /// Stored total after the merge
    #[default]
    Merged,
    /// Count seen in the current frame only
    Frame,
}

/// One observation reported by the external detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Detection {
    #[serde(alias = "class")]
    pub label: String,
    #[serde(default = "full_confidence", alias = "score")]
    pub confidence: f32,
    /// `[x, y, width, height]` in pixels
    #[serde(default, alias = "boundingBox")]
    #[schema(value_type = Option<Vec<f32>>)]
    pub bbox: Option<[f32; 4]>,
}

fn full_confidence() -> f32 {
    1.0
}

impl Detection {
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence,
            bbox: None,
        }
    }
}

/// All observations of a single video frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DetectionFrame {
    #[serde(default)]
    pub detections: Vec<Detection>,
}

impl From<Vec<Detection>> for DetectionFrame {
    fn from(detections: Vec<Detection>) -> Self {
        Self { detections }
    }
}

/// Per-label counts of one frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameCounts {
    pub counts: BTreeMap<String, i32>,
    pub dropped: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AppliedLabel {
    pub label: String,
    /// Units seen in this frame
    pub count: i32,
    /// Stored quantity after the merge
    pub quantity: i32,
    pub status: StockStatus,
    /// Detector-facing label for `status` (`In Stock`, `Low`, `Critical`)
    pub stock_label: String,
    pub created: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FailedLabel {
    pub label: String,
    pub count: i32,
    pub error: String,
}

/// What happened to one frame.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FrameReport {
    pub applied: Vec<AppliedLabel>,
    /// Detections discarded by the allow-list or the confidence floor
    pub dropped: usize,
    pub failed: Vec<FailedLabel>,
}

/// Sink for detection-driven add-or-merge writes.
#[async_trait]
pub trait InventoryUpsert: Send + Sync {
    async fn upsert(&self, item: UpsertItem) -> Result<UpsertOutcome, ServiceError>;
}

/// Settings resolved from [`DetectionConfig`].
#[derive(Debug, Clone)]
pub struct DetectionSettings {
    pub allow_list: BTreeSet<String>,
    pub placeholder_cost: String,
    pub expiry_days: u64,
    pub min_confidence: f32,
    pub status_basis: StatusBasis,
}

impl From<&DetectionConfig> for DetectionSettings {
    fn from(cfg: &DetectionConfig) -> Self {
        Self {
            allow_list: cfg.allow_list(),
            placeholder_cost: cfg.placeholder_cost.trim().to_string(),
            expiry_days: cfg.expiry_days.max(0) as u64,
            min_confidence: cfg.min_confidence,
            status_basis: cfg.status_basis,
        }
    }
}

#[derive(Clone)]
pub struct DetectionAdapter {
    upserter: Arc<dyn InventoryUpsert>,
    settings: DetectionSettings,
}

impl DetectionAdapter {
    pub fn new(upserter: Arc<dyn InventoryUpsert>, settings: DetectionSettings) -> Self {
        Self { upserter, settings }
    }

    pub fn settings(&self) -> &DetectionSettings {
        &self.settings
    }

    /// Counts allowed detections per canonical (lowercase) label.
    pub fn count_frame(&self, frame: &DetectionFrame) -> FrameCounts {
        let mut result = FrameCounts::default();
        for detection in &frame.detections {
            let label = detection.label.trim().to_lowercase();
            if !self.settings.allow_list.contains(&label)
                || detection.confidence < self.settings.min_confidence
            {
                result.dropped += 1;
                continue;
            }
            let count = result.counts.entry(label).or_insert(0);
            *count = count.saturating_add(1);
        }
        result
    }

    /// Processes a frame observed today.
    pub async fn process_frame(&self, frame: &DetectionFrame) -> FrameReport {
        self.process_frame_on(frame, Utc::now().date_naive()).await
    }

    /// Processes a frame as if observed on `today`; labels are applied in order.
    #[instrument(skip(self, frame), fields(detections = frame.detections.len()))]
    pub async fn process_frame_on(&self, frame: &DetectionFrame, today: NaiveDate) -> FrameReport {
        let FrameCounts { counts, dropped } = self.count_frame(frame);
        let mut report = FrameReport {
            dropped,
            ..Default::default()
        };
        counter!("kitchen_detection.dropped", dropped as u64);

        let Some(expiry) = today.checked_add_days(Days::new(self.settings.expiry_days)) else {
            for (label, count) in counts {
                report.failed.push(FailedLabel {
                    label,
                    count,
                    error: "expiry date out of range".to_string(),
                });
            }
            return report;
        };

        for (label, count) in counts {
            let status = match self.settings.status_basis {
                StatusBasis::Frame => StatusRule::Fixed(StockStatus::from_quantity(count)),
                StatusBasis::Merged => StatusRule::FromMergedQuantity,
            };
            let item = UpsertItem {
                name: label.clone(),
                quantity: count,
                cost: self.settings.placeholder_cost.clone(),
                expiry,
                status,
            };

            match self.upserter.upsert(item).await {
                Ok(outcome) => {
                    debug!(%label, count, quantity = outcome.item.quantity, "detection applied");
                    counter!("kitchen_detection.applied", 1);
                    report.applied.push(AppliedLabel {
                        label,
                        count,
                        quantity: outcome.item.quantity,
                        status: outcome.item.status,
                        stock_label: outcome.item.status.stock_label().to_string(),
                        created: outcome.created,
                    });
                }
                Err(e) => {
                    warn!(%label, count, error = %e, "detection upsert failed; skipping");
                    counter!("kitchen_detection.failed", 1);
                    report.failed.push(FailedLabel {
                        label,
                        count,
                        error: e.to_string(),
                    });
                }
            }
        }

        report
    }
}
