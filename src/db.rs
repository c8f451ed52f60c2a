//! # Database Module
//!
//! PostgreSQL-backed order ledger, used instead of the CSV file when
//! `DATABASE_URL` is configured.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPool;
use sqlx::Row;
use tracing::info;

use crate::ledger::{LedgerRecord, OrderLedger, OrderStatus};

/// Initialize the database schema
pub async fn init_database_schema(pool: &PgPool) -> Result<()> {
    info!("Initializing database schema...");

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS orders (
            id BIGSERIAL PRIMARY KEY,
            recorded_at TIMESTAMPTZ NOT NULL,
            telegram_id BIGINT NOT NULL,
            items TEXT NOT NULL,
            address TEXT NOT NULL,
            phone TEXT NOT NULL,
            status TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create orders table")?;

    sqlx::query("CREATE INDEX IF NOT EXISTS orders_telegram_id_idx ON orders (telegram_id)")
        .execute(pool)
        .await
        .context("Failed to create orders index")?;

    info!("Database schema initialized successfully");
    Ok(())
}

/// Insert one finalized order and return its row id
pub async fn insert_order(pool: &PgPool, record: &LedgerRecord) -> Result<i64> {
    let row = sqlx::query(
        "INSERT INTO orders (recorded_at, telegram_id, items, address, phone, status)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING id",
    )
    .bind(record.timestamp)
    .bind(record.user_id)
    .bind(&record.items)
    .bind(&record.address)
    .bind(&record.phone)
    .bind(record.status.as_str())
    .fetch_one(pool)
    .await
    .context("Failed to insert order")?;

    let order_id: i64 = row.get("id");
    info!(order_id, user_id = record.user_id, status = %record.status, "Order inserted");
    Ok(order_id)
}

/// All ledger rows of one customer, oldest first
pub async fn orders_for_user(pool: &PgPool, telegram_id: i64) -> Result<Vec<LedgerRecord>> {
    let rows = sqlx::query(
        "SELECT recorded_at, telegram_id, items, address, phone, status
         FROM orders WHERE telegram_id = $1 ORDER BY id",
    )
    .bind(telegram_id)
    .fetch_all(pool)
    .await
    .context("Failed to read orders")?;

    rows.iter()
        .map(|row| {
            let status: String = row.get("status");
            let status = match status.as_str() {
                "Validée" => OrderStatus::Validated,
                "Refusée" => OrderStatus::Refused,
                other => anyhow::bail!("Unknown order status in database: {other}"),
            };
            let timestamp: DateTime<Utc> = row.get("recorded_at");
            Ok(LedgerRecord {
                timestamp,
                user_id: row.get("telegram_id"),
                items: row.get("items"),
                address: row.get("address"),
                phone: row.get("phone"),
                status,
            })
        })
        .collect()
}

pub struct PgLedger {
    pool: PgPool,
}

impl PgLedger {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        init_database_schema(&pool).await?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl OrderLedger for PgLedger {
    async fn append(&self, record: &LedgerRecord) -> Result<()> {
        insert_order(&self.pool, record).await.map(|_| ())
    }
}
