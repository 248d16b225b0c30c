use crate::{
    db::DbPool,
    dto::UpsertItem,
    entities::inventory_item::{Model as InventoryModel, StockStatus},
    errors::ServiceError,
    events::{Event, EventSender},
    repositories::inventory_repository::{InventoryRepository, ItemUpdate, NewItem, StatusRule},
    services::detection::InventoryUpsert,
};
use async_trait::async_trait;
use metrics::{counter, histogram};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument};

/// Result of an add-or-merge: the stored row and whether it is new.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpsertOutcome {
    pub item: InventoryModel,
    pub created: bool,
}

/// Service applying the inventory write rules
#[derive(Clone)]
pub struct ReconciliationService {
    repository: InventoryRepository,
    event_sender: EventSender,
}

impl ReconciliationService {
    /// Creates a new reconciliation service instance
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            repository: InventoryRepository::new(db_pool),
            event_sender,
        }
    }

    /// Adds `quantity` units of `name`, creating the item if it is absent.
    ///
    /// On merge the stored quantity grows by the delta while cost, expiry and
    /// status are replaced by the incoming values.
    #[instrument(skip(self, command), fields(name = %command.name, delta = command.quantity))]
    pub async fn upsert_by_name(&self, command: UpsertItem) -> Result<UpsertOutcome, ServiceError> {
        let start = Instant::now();
        let delta = command.quantity;
        let rule = command.status;
        let initial_status = match rule {
            StatusRule::Fixed(status) => status,
            StatusRule::FromMergedQuantity => StockStatus::from_quantity(delta),
        };

        let merged = self
            .repository
            .upsert_merge(
                NewItem {
                    name: command.name,
                    quantity: delta,
                    cost: command.cost,
                    expiry: command.expiry,
                    status: initial_status,
                },
                rule,
            )
            .await?;

        histogram!(
            "kitchen_inventory.upsert_duration_ms",
            start.elapsed().as_millis() as f64
        );

        let item = merged.item;
        let event = if merged.created {
            info!(id = item.id, quantity = item.quantity, "inventory item created");
            counter!("kitchen_inventory.items_created", 1);
            Event::InventoryItemCreated {
                item_id: item.id,
                name: item.name.clone(),
                quantity: item.quantity,
            }
        } else {
            info!(id = item.id, quantity = item.quantity, "inventory quantity merged");
            counter!("kitchen_inventory.items_merged", 1);
            Event::InventoryItemMerged {
                item_id: item.id,
                name: item.name.clone(),
                added: delta,
                quantity: item.quantity,
            }
        };
        self.event_sender.send_or_log(event).await;

        Ok(UpsertOutcome {
            item,
            created: merged.created,
        })
    }

    /// Replaces cost, expiry and status of an existing item; quantity is kept.
    #[instrument(skip(self, update))]
    pub async fn update_by_id(
        &self,
        id: i32,
        update: ItemUpdate,
    ) -> Result<InventoryModel, ServiceError> {
        let affected = self.repository.update(id, update).await?;
        if affected == 0 {
            return Err(ServiceError::NotFound(format!("inventory item {}", id)));
        }

        let item = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("inventory item {}", id)))?;

        counter!("kitchen_inventory.items_updated", 1);
        self.event_sender
            .send_or_log(Event::InventoryItemUpdated {
                item_id: item.id,
                status: item.status.to_string(),
            })
            .await;

        Ok(item)
    }

    #[instrument(skip(self))]
    pub async fn get_item(&self, id: i32) -> Result<InventoryModel, ServiceError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("inventory item {}", id)))
    }

    pub async fn list_items(&self) -> Result<Vec<InventoryModel>, ServiceError> {
        self.repository.list_all().await
    }
}

#[async_trait]
impl InventoryUpsert for ReconciliationService {
    async fn upsert(&self, item: UpsertItem) -> Result<UpsertOutcome, ServiceError> {
        self.upsert_by_name(item).await
    }
}
