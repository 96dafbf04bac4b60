//! Postgres-backed storage implementation.
//!
//! The commit path runs inside one transaction and performs the stock
//! decrement conditionally:
//!
//! ```sql
//! UPDATE products
//!    SET stock_quantity = stock_quantity - $1
//!  WHERE id = $2 AND stock_quantity >= $1
//! ```
//!
//! with the affected-row count checked. A plain read-then-write sequence
//! would leave a window between the check and the decrement in which a
//! concurrent checkout can take the same units; the conditional update
//! makes check and decrement one atomic statement, so two transactions
//! competing for the last units cannot both succeed.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tracing::instrument;
use uuid::Uuid;

use pawmart_accounts::AddressSnapshot;
use pawmart_catalog::Product;
use pawmart_core::{AddressId, Money, OrderId, ProductId, UserId};
use pawmart_orders::{Order, OrderLine, OrderStatus, PaymentMethod};

use super::{AddressStore, CatalogStore, LedgerError, OrderLedger, StoreError};
use async_trait::async_trait;

/// Postgres-backed catalog, address book and order ledger.
///
/// Uses the sqlx connection pool (thread-safe, `Send + Sync`); every
/// commit runs in its own transaction.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: Arc<PgPool>,
}

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS products (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT,
        price_minor BIGINT NOT NULL,
        stock_quantity INTEGER NOT NULL DEFAULT 0 CHECK (stock_quantity >= 0),
        is_active BOOLEAN NOT NULL DEFAULT TRUE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS addresses (
        id UUID PRIMARY KEY,
        owner_id UUID NOT NULL,
        title TEXT NOT NULL,
        full_name TEXT NOT NULL,
        phone TEXT NOT NULL,
        address TEXT NOT NULL,
        city TEXT NOT NULL,
        district TEXT NOT NULL,
        postal_code TEXT NOT NULL,
        is_default BOOLEAN NOT NULL DEFAULT FALSE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS orders (
        id UUID PRIMARY KEY,
        order_number TEXT UNIQUE NOT NULL,
        owner_id UUID NOT NULL,
        status TEXT NOT NULL,
        total_minor BIGINT NOT NULL,
        shipping_address JSONB NOT NULL,
        payment_method TEXT NOT NULL,
        notes TEXT,
        created_at TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS order_lines (
        id BIGSERIAL PRIMARY KEY,
        order_id UUID NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
        product_id UUID NOT NULL,
        product_name TEXT NOT NULL,
        unit_price_minor BIGINT NOT NULL,
        quantity INTEGER NOT NULL,
        line_total_minor BIGINT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_orders_owner ON orders(owner_id, created_at DESC)",
    "CREATE INDEX IF NOT EXISTS idx_order_lines_order ON order_lines(order_id)",
    "CREATE INDEX IF NOT EXISTS idx_addresses_owner ON addresses(owner_id)",
];

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Create the relations if they do not exist yet.
    ///
    /// `order_lines.product_id` carries no foreign key: it is a soft
    /// reference, so deleting a product never invalidates order history.
    #[instrument(skip(self), err)]
    pub async fn init_schema(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&*self.pool)
                .await
                .map_err(|e| unavailable("init_schema", &e))?;
        }
        Ok(())
    }

    async fn lines_for(&self, order_id: OrderId) -> Result<Vec<OrderLine>, StoreError> {
        let rows: Vec<OrderLineRow> = sqlx::query_as(
            r#"
            SELECT product_id, product_name, unit_price_minor, quantity, line_total_minor
            FROM order_lines
            WHERE order_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(order_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| unavailable("lines_for", &e))?;

        rows.into_iter().map(OrderLineRow::into_line).collect()
    }
}

fn unavailable(op: &str, e: &sqlx::Error) -> StoreError {
    StoreError::Unavailable(format!("{op}: {e}"))
}

fn ledger_unavailable(op: &str, e: &sqlx::Error) -> LedgerError {
    LedgerError::Unavailable(format!("{op}: {e}"))
}

#[derive(Debug, FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    price_minor: i64,
    stock_quantity: i32,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl ProductRow {
    fn into_product(self) -> Result<Product, StoreError> {
        let stock_quantity = u32::try_from(self.stock_quantity)
            .map_err(|_| StoreError::Corrupt(format!("negative stock for product {}", self.id)))?;
        let price_minor = u64::try_from(self.price_minor)
            .map_err(|_| StoreError::Corrupt(format!("negative price for product {}", self.id)))?;

        Ok(Product {
            id: ProductId::from_uuid(self.id),
            name: self.name,
            description: self.description,
            price: Money::from_minor(price_minor),
            stock_quantity,
            is_active: self.is_active,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct AddressRow {
    full_name: String,
    phone: String,
    address: String,
    city: String,
    district: String,
    postal_code: String,
}

#[derive(Debug, FromRow)]
struct OrderRow {
    id: Uuid,
    order_number: String,
    owner_id: Uuid,
    status: String,
    total_minor: i64,
    shipping_address: Json<AddressSnapshot>,
    payment_method: String,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, lines: Vec<OrderLine>) -> Result<Order, StoreError> {
        let status = OrderStatus::from_str(&self.status)
            .map_err(|e| StoreError::Corrupt(format!("order {}: {e}", self.id)))?;
        let payment_method = PaymentMethod::from_str(&self.payment_method)
            .map_err(|e| StoreError::Corrupt(format!("order {}: {e}", self.id)))?;
        let total_minor = u64::try_from(self.total_minor)
            .map_err(|_| StoreError::Corrupt(format!("negative total for order {}", self.id)))?;

        Ok(Order {
            id: OrderId::from_uuid(self.id),
            order_number: self.order_number,
            owner_id: UserId::from_uuid(self.owner_id),
            status,
            total: Money::from_minor(total_minor),
            shipping_address: self.shipping_address.0,
            payment_method,
            notes: self.notes,
            created_at: self.created_at,
            lines,
        })
    }
}

#[derive(Debug, FromRow)]
struct OrderLineRow {
    product_id: Uuid,
    product_name: String,
    unit_price_minor: i64,
    quantity: i32,
    line_total_minor: i64,
}

impl OrderLineRow {
    fn into_line(self) -> Result<OrderLine, StoreError> {
        let quantity = u32::try_from(self.quantity).map_err(|_| {
            StoreError::Corrupt(format!("negative quantity for product {}", self.product_id))
        })?;
        let unit_price = u64::try_from(self.unit_price_minor).map_err(|_| {
            StoreError::Corrupt(format!("negative price for product {}", self.product_id))
        })?;
        let line_total = u64::try_from(self.line_total_minor).map_err(|_| {
            StoreError::Corrupt(format!("negative total for product {}", self.product_id))
        })?;

        Ok(OrderLine {
            product_id: ProductId::from_uuid(self.product_id),
            product_name: self.product_name,
            unit_price: Money::from_minor(unit_price),
            quantity,
            line_total: Money::from_minor(line_total),
        })
    }
}

#[async_trait]
impl CatalogStore for PostgresStore {
    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let row: Option<ProductRow> = sqlx::query_as(
            r#"
            SELECT id, name, description, price_minor, stock_quantity, is_active, created_at
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| unavailable("product", &e))?;

        row.map(ProductRow::into_product).transpose()
    }
}

#[async_trait]
impl AddressStore for PostgresStore {
    #[instrument(skip(self), fields(address_id = %id, owner_id = %owner), err)]
    async fn address_for(
        &self,
        id: AddressId,
        owner: UserId,
    ) -> Result<Option<AddressSnapshot>, StoreError> {
        let row: Option<AddressRow> = sqlx::query_as(
            r#"
            SELECT full_name, phone, address, city, district, postal_code
            FROM addresses
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(id.as_uuid())
        .bind(owner.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| unavailable("address_for", &e))?;

        Ok(row.map(|r| AddressSnapshot {
            full_name: r.full_name,
            phone: r.phone,
            address: r.address,
            city: r.city,
            district: r.district,
            postal_code: r.postal_code,
        }))
    }
}

#[async_trait]
impl OrderLedger for PostgresStore {
    #[instrument(
        skip(self, order),
        fields(order_id = %order.id, order_number = %order.order_number),
        err
    )]
    async fn commit(&self, order: &Order) -> Result<(), LedgerError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| ledger_unavailable("begin", &e))?;

        for line in &order.lines {
            let result = sqlx::query(
                r#"
                UPDATE products
                SET stock_quantity = stock_quantity - $1
                WHERE id = $2 AND stock_quantity >= $1
                "#,
            )
            .bind(line.quantity as i32)
            .bind(line.product_id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| ledger_unavailable("decrement_stock", &e))?;

            if result.rows_affected() == 0 {
                // Guard failed: a concurrent commit took the units (or the
                // product row is gone). Report the live quantity and abort.
                let available: Option<i32> =
                    sqlx::query_scalar("SELECT stock_quantity FROM products WHERE id = $1")
                        .bind(line.product_id.as_uuid())
                        .fetch_optional(&mut *tx)
                        .await
                        .map_err(|e| ledger_unavailable("read_stock", &e))?;

                let _ = tx.rollback().await;
                return Err(LedgerError::StockConflict {
                    product_id: line.product_id,
                    requested: line.quantity,
                    available: available.unwrap_or(0).max(0) as u32,
                });
            }
        }

        sqlx::query(
            r#"
            INSERT INTO orders
                (id, order_number, owner_id, status, total_minor,
                 shipping_address, payment_method, notes, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(&order.order_number)
        .bind(order.owner_id.as_uuid())
        .bind(order.status.as_str())
        .bind(order.total.minor() as i64)
        .bind(Json(&order.shipping_address))
        .bind(order.payment_method.as_str())
        .bind(order.notes.as_deref())
        .bind(order.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| ledger_unavailable("insert_order", &e))?;

        for line in &order.lines {
            sqlx::query(
                r#"
                INSERT INTO order_lines
                    (order_id, product_id, product_name, unit_price_minor, quantity, line_total_minor)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(order.id.as_uuid())
            .bind(line.product_id.as_uuid())
            .bind(&line.product_name)
            .bind(line.unit_price.minor() as i64)
            .bind(line.quantity as i32)
            .bind(line.line_total.minor() as i64)
            .execute(&mut *tx)
            .await
            .map_err(|e| ledger_unavailable("insert_order_line", &e))?;
        }

        tx.commit()
            .await
            .map_err(|e| ledger_unavailable("commit", &e))?;

        Ok(())
    }

    #[instrument(skip(self), fields(owner_id = %owner), err)]
    async fn orders_for_owner(&self, owner: UserId) -> Result<Vec<Order>, StoreError> {
        let rows: Vec<OrderRow> = sqlx::query_as(
            r#"
            SELECT id, order_number, owner_id, status, total_minor,
                   shipping_address, payment_method, notes, created_at
            FROM orders
            WHERE owner_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| unavailable("orders_for_owner", &e))?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            let lines = self.lines_for(OrderId::from_uuid(row.id)).await?;
            orders.push(row.into_order(lines)?);
        }
        Ok(orders)
    }

    #[instrument(skip(self), fields(owner_id = %owner, order_id = %id), err)]
    async fn find_order(
        &self,
        owner: UserId,
        id: OrderId,
    ) -> Result<Option<Order>, StoreError> {
        let row: Option<OrderRow> = sqlx::query_as(
            r#"
            SELECT id, order_number, owner_id, status, total_minor,
                   shipping_address, payment_method, notes, created_at
            FROM orders
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(id.as_uuid())
        .bind(owner.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| unavailable("find_order", &e))?;

        match row {
            Some(row) => {
                let lines = self.lines_for(id).await?;
                Ok(Some(row.into_order(lines)?))
            }
            None => Ok(None),
        }
    }
}
