use std::sync::Arc;

use pawmart_infra::{CheckoutService, InMemoryStore, PostgresStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pawmart_observability::init();

    let checkout = match std::env::var("DATABASE_URL") {
        Ok(url) => {
            let pool = sqlx::PgPool::connect(&url).await?;
            let store = Arc::new(PostgresStore::new(pool));
            store.init_schema().await?;
            CheckoutService::new(store.clone(), store.clone(), store)
        }
        Err(_) => {
            tracing::warn!("DATABASE_URL not set; using a volatile in-memory store");
            let store = Arc::new(InMemoryStore::new());
            CheckoutService::new(store.clone(), store.clone(), store)
        }
    };

    let app = pawmart_api::app::build_app(checkout);

    let bind = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
