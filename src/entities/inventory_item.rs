use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Quantity above which an item is considered fully stocked.
pub const IN_STOCK_ABOVE: i32 = 5;
/// Quantity above which an item is low rather than critical.
pub const LOW_STOCK_ABOVE: i32 = 2;

/// One row per item; `name` is the natural key used by detection upserts.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "inventory")]
#[schema(as = InventoryItem)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    pub quantity: i32,
    pub status: StockStatus,
    #[schema(value_type = String, format = Date, example = "2025-01-01")]
    pub expiry: NaiveDate,
    /// Decimal kept as text exactly as the writer supplied it
    #[schema(example = "12.50")]
    pub cost: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Stock status shared by manual edits and detection writes.
///
/// Parsing also accepts the detector's display vocabulary
/// (`In Stock`, `Low`, `Critical`), case-insensitively.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    DeriveActiveEnum,
    strum::EnumString,
    strum::Display,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[strum(ascii_case_insensitive)]
pub enum StockStatus {
    #[sea_orm(string_value = "Good")]
    #[serde(alias = "In Stock")]
    #[strum(to_string = "Good", serialize = "In Stock")]
    Good,
    #[sea_orm(string_value = "Warning")]
    #[serde(alias = "Low")]
    #[strum(to_string = "Warning", serialize = "Low")]
    Warning,
    #[sea_orm(string_value = "Danger")]
    #[serde(alias = "Critical")]
    #[strum(to_string = "Danger", serialize = "Critical")]
    Danger,
}

impl StockStatus {
    /// Derives the status a given stock level deserves.
    pub fn from_quantity(quantity: i32) -> Self {
        if quantity > IN_STOCK_ABOVE {
            StockStatus::Good
        } else if quantity > LOW_STOCK_ABOVE {
            StockStatus::Warning
        } else {
            StockStatus::Danger
        }
    }

    /// Label used by the visual inventory view.
    pub fn stock_label(&self) -> &'static str {
        match self {
            StockStatus::Good => "In Stock",
            StockStatus::Warning => "Low",
            StockStatus::Danger => "Critical",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::Good => "Good",
            StockStatus::Warning => "Warning",
            StockStatus::Danger => "Danger",
        }
    }
}
