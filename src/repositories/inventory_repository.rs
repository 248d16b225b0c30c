use chrono::{NaiveDate, Utc};
use metrics::counter;
use sea_orm::{
    sea_query::Expr,
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use std::sync::Arc;
use tracing::debug;

use crate::entities::inventory_item::{
    ActiveModel as InventoryActiveModel, Column, Entity as Inventory, Model as InventoryModel,
    StockStatus,
};
use crate::errors::ServiceError;

use super::{BaseRepository, Repository};

/// Fields written when an item is first stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub name: String,
    pub quantity: i32,
    pub cost: String,
    pub expiry: NaiveDate,
    pub status: StockStatus,
}

/// Metadata replaced by a manual edit; quantity is deliberately absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemUpdate {
    pub cost: String,
    pub expiry: NaiveDate,
    pub status: StockStatus,
}

/// How the status of a merged row is decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusRule {
    /// Write the supplied status as-is.
    Fixed(StockStatus),
    /// Derive the status from the stored quantity after the merge.
    FromMergedQuantity,
}

/// Result of an insert-or-merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeResult {
    pub item: InventoryModel,
    pub created: bool,
}

/// Repository for the inventory table
#[derive(Debug, Clone)]
pub struct InventoryRepository {
    base: BaseRepository,
}

impl InventoryRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Exact, case-sensitive lookup by name
    pub async fn find_by_name(&self, name: &str) -> Result<Option<InventoryModel>, ServiceError> {
        find_by_name_on(self.base.get_db(), name).await
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<InventoryModel>, ServiceError> {
        Inventory::find_by_id(id)
            .one(self.base.get_db())
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// Every stored item, ordered by id for stable display
    pub async fn list_all(&self) -> Result<Vec<InventoryModel>, ServiceError> {
        Inventory::find()
            .order_by_asc(Column::Id)
            .all(self.base.get_db())
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// Inserts a new row and returns its id
    pub async fn insert(&self, item: NewItem) -> Result<i32, ServiceError> {
        let now = Utc::now();
        let active = InventoryActiveModel {
            name: Set(item.name),
            quantity: Set(item.quantity),
            status: Set(item.status),
            expiry: Set(item.expiry),
            cost: Set(item.cost),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = Inventory::insert(active)
            .exec(self.base.get_db())
            .await
            .map_err(ServiceError::DatabaseError)?;
        counter!("kitchen_inventory.rows_inserted", 1);
        Ok(result.last_insert_id)
    }

    /// Replaces cost, expiry and status of one row.
    ///
    /// Returns the number of affected rows; 0 means no row has that id.
    pub async fn update(&self, id: i32, fields: ItemUpdate) -> Result<u64, ServiceError> {
        let result = Inventory::update_many()
            .col_expr(Column::Cost, Expr::value(fields.cost))
            .col_expr(Column::Expiry, Expr::value(fields.expiry))
            .col_expr(Column::Status, Expr::value(fields.status.as_str()))
            .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(Column::Id.eq(id))
            .exec(self.base.get_db())
            .await
            .map_err(ServiceError::DatabaseError)?;

        debug!(id, rows_affected = result.rows_affected, "inventory row updated");
        Ok(result.rows_affected)
    }

    /// Inserts the item, or adds its quantity to the existing row of the same
    /// name and replaces cost, expiry and status.
    ///
    /// With [`StatusRule::FromMergedQuantity`] the written status is then
    /// recomputed from the stored total before commit.
    ///
    /// The first statement of the transaction is a write, so SQLite takes the
    /// write lock up front and concurrent callers queue on the busy timeout
    /// instead of failing a read-to-write lock upgrade. The unique name index
    /// backs the insert branch.
    pub async fn upsert_merge(
        &self,
        item: NewItem,
        rule: StatusRule,
    ) -> Result<MergeResult, ServiceError> {
        let txn = self
            .base
            .get_db()
            .begin()
            .await
            .map_err(ServiceError::DatabaseError)?;

        let now = Utc::now();
        let merged = Inventory::update_many()
            .col_expr(
                Column::Quantity,
                Expr::col(Column::Quantity).add(Expr::value(item.quantity)),
            )
            .col_expr(Column::Cost, Expr::value(item.cost.clone()))
            .col_expr(Column::Expiry, Expr::value(item.expiry))
            .col_expr(Column::Status, Expr::value(item.status.as_str()))
            .col_expr(Column::UpdatedAt, Expr::value(now))
            .filter(Column::Name.eq(item.name.as_str()))
            .filter(Column::Quantity.lte(i32::MAX.saturating_sub(item.quantity)))
            .exec(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let created = merged.rows_affected == 0;
        if created {
            // Either the name is new or the merge would overflow
            if find_by_name_on(&txn, &item.name).await?.is_some() {
                return Err(ServiceError::ValidationError(format!(
                    "quantity for '{}' would exceed {}",
                    item.name,
                    i32::MAX
                )));
            }

            let active = InventoryActiveModel {
                name: Set(item.name.clone()),
                quantity: Set(item.quantity),
                status: Set(item.status),
                expiry: Set(item.expiry),
                cost: Set(item.cost),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            };
            Inventory::insert(active)
                .exec(&txn)
                .await
                .map_err(ServiceError::DatabaseError)?;
        }

        let mut stored = find_by_name_on(&txn, &item.name).await?.ok_or_else(|| {
            ServiceError::database_error_message(format!(
                "inventory row '{}' missing after upsert",
                item.name
            ))
        })?;

        if rule == StatusRule::FromMergedQuantity {
            let derived = StockStatus::from_quantity(stored.quantity);
            if derived != stored.status {
                let mut active: InventoryActiveModel = stored.into();
                active.status = Set(derived);
                stored = active
                    .update(&txn)
                    .await
                    .map_err(ServiceError::DatabaseError)?;
            }
        }

        txn.commit().await.map_err(ServiceError::DatabaseError)?;

        if created {
            counter!("kitchen_inventory.rows_inserted", 1);
        } else {
            counter!("kitchen_inventory.rows_merged", 1);
        }

        Ok(MergeResult {
            item: stored,
            created,
        })
    }
}

async fn find_by_name_on<C>(db: &C, name: &str) -> Result<Option<InventoryModel>, ServiceError>
where
    C: ConnectionTrait,
{
    Inventory::find()
        .filter(Column::Name.eq(name))
        .one(db)
        .await
        .map_err(ServiceError::DatabaseError)
}
