use crate::model::{OrderItem, OrderStatus, UnknownStatus};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::errors::ServiceError;
use sqlx::FromRow;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Decimal places the money columns keep.
pub const MONEY_SCALE: u32 = 2;

/// Largest quantity a single line may carry.
pub const MAX_ITEM_QUANTITY: i32 = 1_000_000;

/// Largest value a `NUMERIC(12, 2)` money column holds.
pub fn max_money() -> Decimal {
    Decimal::new(999_999_999_999, MONEY_SCALE)
}

/// Positive, at most two decimal places and within the money column range.
pub fn check_price(price: Decimal) -> Result<(), &'static str> {
    if price <= Decimal::ZERO {
        Err("price must be greater than 0")
    } else if price.normalize().scale() > MONEY_SCALE {
        Err("price must have at most 2 decimal places")
    } else if price > max_money() {
        Err("price exceeds 9999999999.99")
    } else {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("order validation failed: {}", .0.join("; "))]
pub struct ValidationError(pub Vec<String>);

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::Validation(err.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub user_id: String,
    pub status: OrderStatus,
    pub amount: Decimal,
    pub items: Vec<OrderItem>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Order {
    /// A not-yet-persisted order. The id stays nil until the repository
    /// assigns one, and the amount stays zero when the items cannot be
    /// totalled; `validate` reports that case.
    pub fn new(user_id: impl Into<String>, items: Vec<OrderItem>) -> Self {
        let mut order = Self {
            id: Uuid::nil(),
            user_id: user_id.into(),
            status: OrderStatus::Pending,
            amount: Decimal::ZERO,
            items,
            created_at: None,
            updated_at: None,
            is_deleted: false,
            deleted_at: None,
        };
        if let Some(total) = order.total() {
            order.amount = total;
        }
        order
    }

    /// Collects every rule violation instead of stopping at the first one.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = Vec::new();

        if self.user_id.trim().is_empty() {
            errors.push("user_id is required".to_string());
        }

        if self.items.is_empty() {
            errors.push("items must not be empty".to_string());
        }

        for (idx, item) in self.items.iter().enumerate() {
            if item.product_id.trim().is_empty() {
                errors.push(format!("items[{idx}].product_id is required"));
            }
            if item.quantity <= 0 {
                errors.push(format!("items[{idx}].quantity must be greater than 0"));
            } else if item.quantity > MAX_ITEM_QUANTITY {
                errors.push(format!(
                    "items[{idx}].quantity must not exceed {MAX_ITEM_QUANTITY}"
                ));
            }
            if let Err(msg) = check_price(item.price) {
                errors.push(format!("items[{idx}].{msg}"));
            }
        }

        if errors.is_empty() && self.checked_amount().is_none() {
            errors.push(format!("amount exceeds {}", max_money()));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError(errors))
        }
    }

    /// Sets `amount` to the sum of the line totals, refusing totals the
    /// money columns cannot hold.
    pub fn recompute_amount(&mut self) -> Result<(), ValidationError> {
        let total = self
            .checked_amount()
            .ok_or_else(|| ValidationError(vec![format!("amount exceeds {}", max_money())]))?;
        self.amount = total;
        Ok(())
    }

    fn total(&self) -> Option<Decimal> {
        self.items
            .iter()
            .try_fold(Decimal::ZERO, |acc, item| acc.checked_add(item.line_total()?))
    }

    fn checked_amount(&self) -> Option<Decimal> {
        self.total().filter(|total| *total <= max_money())
    }

    pub fn soft_delete(&mut self, at: DateTime<Utc>) {
        self.is_deleted = true;
        self.deleted_at = Some(at);
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Order{{id: {}, user_id: {}, status: {}}}",
            self.id, self.user_id, self.status
        )
    }
}

#[derive(Debug, FromRow)]
pub struct OrderRow {
    pub order_id: Uuid,
    pub user_id: String,
    pub status: String,
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl OrderRow {
    pub fn into_order(self, items: Vec<OrderItem>) -> Result<Order, UnknownStatus> {
        Ok(Order {
            id: self.order_id,
            user_id: self.user_id,
            status: self.status.parse()?,
            amount: self.amount,
            items,
            created_at: Some(self.created_at),
            updated_at: Some(self.updated_at),
            is_deleted: self.is_deleted,
            deleted_at: self.deleted_at,
        })
    }
}
