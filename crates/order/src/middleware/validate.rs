use axum::{
    Json,
    extract::{FromRequest, Request},
    http::StatusCode,
};
use serde::de::DeserializeOwned;
use shared::errors::ErrorResponse;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

/// JSON body that has already passed its `validator` rules.
pub struct SimpleValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for SimpleValidatedJson<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                (
                    rejection.status(),
                    Json(ErrorResponse {
                        status: "error".to_string(),
                        message: format!("Invalid JSON: {}", rejection.body_text()),
                    }),
                )
            })?;

        value.validate().map_err(|errors| {
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    status: "error".to_string(),
                    message: format!("Validation failed: {}", format_validation_errors(&errors)),
                }),
            )
        })?;

        Ok(Self(value))
    }
}

/// Flattens nested errors into `path: message` pairs, e.g.
/// `items[0].quantity: quantity must be between 1 and 1000000`.
pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut messages = Vec::new();
    collect_messages(errors, "", &mut messages);

    if messages.is_empty() {
        "Validation failed".to_string()
    } else {
        messages.join("; ")
    }
}

fn collect_messages(errors: &ValidationErrors, prefix: &str, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    let message = error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| match error.code.as_ref() {
                            "length" => "Invalid length".to_string(),
                            "range" => "Value out of range".to_string(),
                            _ => format!("Invalid {field}"),
                        });
                    out.push(format!("{path}: {message}"));
                }
            }
            ValidationErrorsKind::Struct(inner) => collect_messages(inner, &path, out),
            ValidationErrorsKind::List(items) => {
                for (idx, inner) in items {
                    collect_messages(inner, &format!("{path}[{idx}]"), out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::requests::order::{CreateOrderItemRequest, CreateOrderRequest};
    use rust_decimal::Decimal;

    #[test]
    fn nested_item_errors_carry_their_path() {
        let req = CreateOrderRequest {
            items: vec![CreateOrderItemRequest {
                product_id: "p1".into(),
                quantity: 0,
                price: Decimal::ONE,
            }],
            status: None,
        };

        let errors = req.validate().unwrap_err();
        let message = format_validation_errors(&errors);

        assert!(message.contains("items[0].quantity: quantity must be between 1 and 1000000"));
    }
}
