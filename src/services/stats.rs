use chrono::{Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{instrument, warn};
use utoipa::ToSchema;

use crate::entities::inventory_item::{Model as InventoryModel, StockStatus};
use crate::errors::ServiceError;
use crate::repositories::inventory_repository::InventoryRepository;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StatusCounts {
    pub good: usize,
    pub warning: usize,
    pub danger: usize,
}

/// Dashboard headline figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryStats {
    pub total_inventory_items: usize,
    pub total_quantity: i64,
    pub by_status: StatusCounts,
    /// Items whose expiry falls within the window, today included
    pub expiring_soon: usize,
    pub expired: usize,
    pub expiry_window_days: u32,
    /// Sum of cost times quantity
    #[schema(value_type = String, example = "1240.50")]
    pub inventory_value: Decimal,
    #[schema(value_type = String, format = Date)]
    pub as_of: NaiveDate,
}

/// Computes the figures for a snapshot of the store.
pub fn compute_stats(items: &[InventoryModel], today: NaiveDate, window_days: u32) -> InventoryStats {
    let horizon = today
        .checked_add_days(Days::new(u64::from(window_days)))
        .unwrap_or(NaiveDate::MAX);

    let mut by_status = StatusCounts::default();
    let mut total_quantity = 0i64;
    let mut expiring_soon = 0;
    let mut expired = 0;
    let mut inventory_value = Decimal::ZERO;

    for item in items {
        match item.status {
            StockStatus::Good => by_status.good += 1,
            StockStatus::Warning => by_status.warning += 1,
            StockStatus::Danger => by_status.danger += 1,
        }
        total_quantity += i64::from(item.quantity);

        if item.expiry < today {
            expired += 1;
        } else if item.expiry <= horizon {
            expiring_soon += 1;
        }

        match Decimal::from_str(&item.cost) {
            Ok(cost) => {
                inventory_value = inventory_value
                    .saturating_add(cost.saturating_mul(Decimal::from(item.quantity)))
            }
            Err(_) => warn!(id = item.id, cost = %item.cost, "stored cost is not a decimal"),
        }
    }

    InventoryStats {
        total_inventory_items: items.len(),
        total_quantity,
        by_status,
        expiring_soon,
        expired,
        expiry_window_days: window_days,
        inventory_value,
        as_of: today,
    }
}

#[derive(Clone)]
pub struct StatsService {
    repository: InventoryRepository,
    window_days: u32,
}

impl StatsService {
    pub fn new(repository: InventoryRepository, window_days: u32) -> Self {
        Self {
            repository,
            window_days,
        }
    }

    #[instrument(skip(self))]
    pub async fn current(&self) -> Result<InventoryStats, ServiceError> {
        let items = self.repository.list_all().await?;
        Ok(compute_stats(&items, Utc::now().date_naive(), self.window_days))
    }
}
