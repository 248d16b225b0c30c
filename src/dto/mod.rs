//! Request bodies for the inventory endpoints and their conversion into
//! validated write commands.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;
use validator::Validate;

use crate::entities::inventory_item::StockStatus;
use crate::errors::ServiceError;
use crate::repositories::inventory_repository::{ItemUpdate, StatusRule};

/// Status keyword that asks the service to derive the status from stock.
pub const AUTO_STATUS: &str = "auto";
pub const EXPIRY_FORMAT: &str = "%Y-%m-%d";
const MAX_NAME_LEN: usize = 100;

/// Cost as sent by clients: either a decimal string or a JSON number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CostInput {
    Text(String),
    Number(serde_json::Number),
}

impl CostInput {
    fn raw(&self) -> String {
        match self {
            CostInput::Text(text) => text.trim().to_string(),
            CostInput::Number(number) => number.to_string(),
        }
    }
}

/// Body of `PUT /api/inventory/add/{name}`
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
#[schema(example = json!({
    "quantity": 3,
    "cost": "12.50",
    "expiry": "2025-01-01",
    "status": "Good"
}))]
pub struct UpsertItemRequest {
    /// Units to add to the stored quantity
    #[validate(range(min = 0, message = "quantity must not be negative"))]
    pub quantity: Option<i32>,
    #[schema(value_type = Option<String>)]
    pub cost: Option<CostInput>,
    /// `YYYY-MM-DD`
    pub expiry: Option<String>,
    /// `Good`/`Warning`/`Danger`, `In Stock`/`Low`/`Critical`, or `auto`
    pub status: Option<String>,
}

/// Body of `PUT /api/inventory/update/{id}`
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
#[schema(example = json!({
    "cost": "9.00",
    "expiry": "2025-03-01",
    "status": "Warning"
}))]
pub struct UpdateItemRequest {
    #[schema(value_type = Option<String>)]
    pub cost: Option<CostInput>,
    pub expiry: Option<String>,
    pub status: Option<String>,
}

/// A validated add-or-merge command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertItem {
    pub name: String,
    pub quantity: i32,
    pub cost: String,
    pub expiry: NaiveDate,
    pub status: StatusRule,
}

impl UpsertItemRequest {
    /// Checks presence first, then the shape of every value.
    pub fn into_command(self, name: &str) -> Result<UpsertItem, ServiceError> {
        let name = validate_name(name)?;
        self.validate()?;

        let mut missing = Vec::new();
        if self.quantity.is_none() {
            missing.push("quantity");
        }
        let cost = present(self.cost.as_ref().map(CostInput::raw), "cost", &mut missing);
        let expiry = present(self.expiry, "expiry", &mut missing);
        let status = present(self.status, "status", &mut missing);

        let (Some(quantity), Some(cost), Some(expiry), Some(status)) =
            (self.quantity, cost, expiry, status)
        else {
            return Err(missing_fields(&missing));
        };

        let status = if status.eq_ignore_ascii_case(AUTO_STATUS) {
            StatusRule::FromMergedQuantity
        } else {
            StatusRule::Fixed(parse_status(&status)?)
        };

        Ok(UpsertItem {
            name,
            quantity,
            cost: parse_cost(&cost)?,
            expiry: parse_expiry(&expiry)?,
            status,
        })
    }
}

impl UpdateItemRequest {
    pub fn into_command(self) -> Result<ItemUpdate, ServiceError> {
        self.validate()?;

        let mut missing = Vec::new();
        let cost = present(self.cost.as_ref().map(CostInput::raw), "cost", &mut missing);
        let expiry = present(self.expiry, "expiry", &mut missing);
        let status = present(self.status, "status", &mut missing);

        let (Some(cost), Some(expiry), Some(status)) = (cost, expiry, status) else {
            return Err(missing_fields(&missing));
        };

        Ok(ItemUpdate {
            cost: parse_cost(&cost)?,
            expiry: parse_expiry(&expiry)?,
            status: parse_status(&status)?,
        })
    }
}

fn present(value: Option<String>, field: &'static str, missing: &mut Vec<&'static str>) -> Option<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Some(v),
        _ => {
            missing.push(field);
            None
        }
    }
}

fn missing_fields(fields: &[&str]) -> ServiceError {
    ServiceError::ValidationError(format!("Missing required fields: {}", fields.join(", ")))
}

pub fn validate_name(name: &str) -> Result<String, ServiceError> {
    if name.trim().is_empty() {
        return Err(ServiceError::ValidationError(
            "item name must not be blank".to_string(),
        ));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(ServiceError::ValidationError(format!(
            "item name must be at most {} characters",
            MAX_NAME_LEN
        )));
    }
    Ok(name.to_string())
}

/// Accepts any non-negative decimal and returns it trimmed, as supplied.
pub fn parse_cost(raw: &str) -> Result<String, ServiceError> {
    let trimmed = raw.trim();
    match Decimal::from_str(trimmed) {
        Ok(value) if !value.is_sign_negative() => Ok(trimmed.to_string()),
        Ok(_) => Err(ServiceError::ValidationError(format!(
            "cost must not be negative: {}",
            trimmed
        ))),
        Err(_) => Err(ServiceError::ValidationError(format!(
            "cost is not a decimal number: {}",
            trimmed
        ))),
    }
}

pub fn parse_expiry(raw: &str) -> Result<NaiveDate, ServiceError> {
    NaiveDate::parse_from_str(raw.trim(), EXPIRY_FORMAT).map_err(|_| {
        ServiceError::ValidationError(format!("expiry must be a YYYY-MM-DD date: {}", raw.trim()))
    })
}

pub fn parse_status(raw: &str) -> Result<StockStatus, ServiceError> {
    StockStatus::from_str(raw.trim())
        .map_err(|_| ServiceError::ValidationError(format!("unknown status: {}", raw.trim())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn upsert(body: serde_json::Value) -> UpsertItemRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn complete_upsert_body_becomes_a_command() {
        let cmd = upsert(json!({
            "quantity": 3, "cost": "12.50 ", "expiry": "2025-01-01", "status": "low"
        }))
        .into_command("tomato")
        .unwrap();

        assert_eq!(cmd.name, "tomato");
        assert_eq!(cmd.quantity, 3);
        assert_eq!(cmd.cost, "12.50");
        assert_eq!(cmd.expiry, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!(cmd.status, StatusRule::Fixed(StockStatus::Warning));
    }

    #[test]
    fn numeric_cost_and_auto_status_are_accepted() {
        let cmd = upsert(json!({
            "quantity": 0, "cost": 7.25, "expiry": "2025-06-30", "status": "AUTO"
        }))
        .into_command("lemon")
        .unwrap();

        assert_eq!(cmd.cost, "7.25");
        assert_eq!(cmd.status, StatusRule::FromMergedQuantity);
    }

    #[test]
    fn missing_fields_are_listed() {
        let err = upsert(json!({ "expiry": "2025-01-01", "cost": "" }))
            .into_command("tomato")
            .unwrap_err();

        assert_matches!(
            err,
            ServiceError::ValidationError(msg) if msg == "Missing required fields: quantity, cost, status"
        );
    }

    #[test]
    fn malformed_values_are_rejected() {
        let base = json!({ "quantity": 1, "cost": "1", "expiry": "2025-01-01", "status": "Good" });

        for (field, value) in [
            ("quantity", json!(-1)),
            ("cost", json!("ten")),
            ("cost", json!("-2")),
            ("expiry", json!("01/01/2025")),
            ("status", json!("Fresh")),
        ] {
            let mut body = base.clone();
            body[field] = value;
            let result = upsert(body).into_command("tomato");
            assert_matches!(result, Err(ServiceError::ValidationError(_)), "{field}");
        }
    }

    #[test]
    fn blank_name_is_rejected() {
        let body = json!({ "quantity": 1, "cost": "1", "expiry": "2025-01-01", "status": "Good" });
        assert_matches!(
            upsert(body).into_command("  "),
            Err(ServiceError::ValidationError(_))
        );
    }

    #[test]
    fn update_body_requires_all_three_fields() {
        let req: UpdateItemRequest =
            serde_json::from_value(json!({ "cost": "3", "status": "Danger" })).unwrap();
        assert_matches!(
            req.into_command(),
            Err(ServiceError::ValidationError(msg)) if msg == "Missing required fields: expiry"
        );

        let req: UpdateItemRequest = serde_json::from_value(
            json!({ "cost": "3", "expiry": "2025-02-02", "status": "Critical" }),
        )
        .unwrap();
        let update = req.into_command().unwrap();
        assert_eq!(update.status, StockStatus::Danger);
    }

    #[test]
    fn update_rejects_auto_status() {
        let req: UpdateItemRequest = serde_json::from_value(
            json!({ "cost": "3", "expiry": "2025-02-02", "status": "auto" }),
        )
        .unwrap();
        assert_matches!(req.into_command(), Err(ServiceError::ValidationError(_)));
    }
}
