use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use pawmart_infra::StoreError;
use pawmart_orders::PlaceOrderError;

/// Translate a placement failure to its HTTP status.
///
/// Validation rejections are 400, losing a stock race is 409, and a failed
/// commit is 500 (the only retryable kind).
pub fn place_order_error_to_response(err: PlaceOrderError) -> axum::response::Response {
    match &err {
        PlaceOrderError::InvalidCart(_) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_cart", err.to_string())
        }
        PlaceOrderError::InvalidAddress => {
            json_error(StatusCode::BAD_REQUEST, "invalid_address", err.to_string())
        }
        PlaceOrderError::InvalidPaymentMethod(_) => json_error(
            StatusCode::BAD_REQUEST,
            "invalid_payment_method",
            err.to_string(),
        ),
        PlaceOrderError::ProductUnavailable(_) => json_error(
            StatusCode::BAD_REQUEST,
            "product_unavailable",
            err.to_string(),
        ),
        PlaceOrderError::InsufficientStock { .. } => {
            json_error(StatusCode::CONFLICT, "insufficient_stock", err.to_string())
        }
        PlaceOrderError::CommitFailed(_) => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "commit_failed",
            err.to_string(),
        ),
    }
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "store_error",
        err.to_string(),
    )
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
