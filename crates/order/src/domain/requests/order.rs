use crate::model::check_price;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

#[derive(Debug, Serialize, Deserialize, Validate, Clone, ToSchema)]
pub struct CreateOrderItemRequest {
    #[validate(length(min = 1, message = "product_id is required"))]
    #[serde(rename = "product_id")]
    pub product_id: String,

    #[validate(range(min = 1, max = 1_000_000, message = "quantity must be between 1 and 1000000"))]
    pub quantity: i32,

    #[validate(custom(function = "validate_price"))]
    #[schema(value_type = String, example = "10.00")]
    pub price: Decimal,
}

/// The owner comes from the caller's token; a `status` in the body is only
/// checked for being a known value and is otherwise ignored.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, ToSchema)]
pub struct CreateOrderRequest {
    #[validate(length(min = 1, message = "items must not be empty"), nested)]
    pub items: Vec<CreateOrderItemRequest>,

    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, Clone, ToSchema)]
pub struct UpdateOrderStatusRequest {
    #[validate(length(min = 1, message = "status is required"))]
    pub status: String,
}

fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    check_price(*price).map_err(|msg| {
        let mut err = ValidationError::new("price");
        err.message = Some(msg.into());
        err
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(product_id: &str, quantity: i32, price: Decimal) -> CreateOrderItemRequest {
        CreateOrderItemRequest {
            product_id: product_id.into(),
            quantity,
            price,
        }
    }

    #[test]
    fn well_formed_request_passes() {
        let req = CreateOrderRequest {
            items: vec![item("p1", 2, Decimal::new(1000, 2))],
            status: None,
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn empty_items_are_rejected() {
        let req = CreateOrderRequest {
            items: vec![],
            status: None,
        };
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("items"));
    }

    #[test]
    fn nested_item_rules_apply() {
        let req = CreateOrderRequest {
            items: vec![item("", 0, Decimal::ZERO)],
            status: None,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn price_accepts_decimal_strings() {
        let req: CreateOrderRequest = serde_json::from_str(
            r#"{"items":[{"product_id":"p1","quantity":1,"price":"5.50"}]}"#,
        )
        .unwrap();
        assert_eq!(req.items[0].price, Decimal::new(550, 2));
        assert!(req.status.is_none());
    }

    #[test]
    fn price_must_fit_the_money_columns() {
        for price in [Decimal::new(1, 3), Decimal::MAX] {
            let req = CreateOrderRequest {
                items: vec![item("p1", 1, price)],
                status: None,
            };
            assert!(req.validate().is_err(), "{price}");
        }

        let trailing_zeros = CreateOrderRequest {
            items: vec![item("p1", 1, Decimal::new(1500, 3))],
            status: None,
        };
        assert!(trailing_zeros.validate().is_ok());
    }

    #[test]
    fn quantity_is_bounded() {
        let req = CreateOrderRequest {
            items: vec![item("p1", i32::MAX, Decimal::ONE)],
            status: None,
        };
        assert!(req.validate().is_err());
    }
}
