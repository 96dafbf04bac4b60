use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use pawmart_core::{AddressId, OrderId, ProductId};
use pawmart_infra::{CheckoutService, PlaceOrderRequest};
use pawmart_orders::{CartLine, PaymentMethod};

use crate::app::{Principal, dto, errors};

const MAX_NOTES_CHARS: usize = 500;

pub fn router() -> Router {
    Router::new().nest("/orders", orders_router())
}

fn orders_router() -> Router {
    Router::new()
        .route("/", post(place_order).get(list_orders))
        .route("/:id", get(get_order))
}

pub async fn place_order(
    Extension(checkout): Extension<Arc<CheckoutService>>,
    Principal(owner): Principal,
    Json(body): Json<dto::PlaceOrderBody>,
) -> axum::response::Response {
    let shipping_address_id: AddressId = match body.shipping_address_id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_id",
                "invalid shipping address id",
            );
        }
    };

    let payment_method: PaymentMethod = match body.payment_method.parse() {
        Ok(v) => v,
        Err(e) => return errors::place_order_error_to_response(e),
    };

    if let Some(notes) = &body.notes {
        if notes.chars().count() > MAX_NOTES_CHARS {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                "notes cannot exceed 500 characters",
            );
        }
    }

    let mut lines = Vec::with_capacity(body.items.len());
    for item in &body.items {
        let product_id: ProductId = match item.product_id.parse() {
            Ok(v) => v,
            Err(_) => {
                return errors::json_error(
                    StatusCode::BAD_REQUEST,
                    "invalid_id",
                    format!("invalid product id: {}", item.product_id),
                );
            }
        };
        lines.push(CartLine {
            product_id,
            quantity: item.quantity,
        });
    }

    let request = PlaceOrderRequest {
        owner_id: owner,
        lines,
        shipping_address_id,
        payment_method,
        notes: body.notes,
    };

    match checkout.place_order(request).await {
        Ok(order) => (StatusCode::CREATED, Json(order)).into_response(),
        Err(e) => errors::place_order_error_to_response(e),
    }
}

pub async fn list_orders(
    Extension(checkout): Extension<Arc<CheckoutService>>,
    Principal(owner): Principal,
) -> axum::response::Response {
    match checkout.orders_for_owner(owner).await {
        Ok(orders) => (StatusCode::OK, Json(orders)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_order(
    Extension(checkout): Extension<Arc<CheckoutService>>,
    Principal(owner): Principal,
    Path(id): Path<String>,
) -> axum::response::Response {
    let order_id: OrderId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid order id");
        }
    };

    match checkout.find_order(owner, order_id).await {
        Ok(Some(order)) => (StatusCode::OK, Json(order)).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "order not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}
