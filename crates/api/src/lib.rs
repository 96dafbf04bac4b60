//! HTTP layer: authentication boundary, request/response translation, and
//! wiring of the checkout service to routes.

pub mod app;
