//! Application router and request context.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::{Extension, Router, async_trait, extract::FromRequestParts};

use pawmart_core::UserId;
use pawmart_infra::CheckoutService;

pub mod dto;
pub mod errors;
pub mod routes;

/// Build the production router around a checkout service.
pub fn build_app(checkout: CheckoutService) -> Router {
    Router::new()
        .merge(routes::router())
        .layer(Extension(Arc::new(checkout)))
}

/// The authenticated account on whose behalf a request runs.
///
/// Carried in the `x-user-id` header by the upstream authentication layer;
/// authentication mechanics themselves live outside this service.
#[derive(Debug, Clone, Copy)]
pub struct Principal(pub UserId);

#[async_trait]
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = axum::response::Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                errors::json_error(
                    StatusCode::UNAUTHORIZED,
                    "unauthenticated",
                    "missing x-user-id header",
                )
            })?;

        let user: UserId = raw.parse().map_err(|_| {
            errors::json_error(
                StatusCode::UNAUTHORIZED,
                "unauthenticated",
                "malformed x-user-id header",
            )
        })?;

        Ok(Principal(user))
    }
}
