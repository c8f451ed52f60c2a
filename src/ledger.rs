//! # Order Ledger
//!
//! Append-only record of finalized orders, one row per order. The CSV file
//! ledger keeps the historical `orders.csv` layout:
//! `timestamp,user_id,items,address,phone,status`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::info;

use crate::session::PendingOrder;
use crate::UserId;

/// Marker written when the customer did not give a phone number
pub const PHONE_NOT_PROVIDED: &str = "Non fourni";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Validated,
    Refused,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Validated => "Validée",
            OrderStatus::Refused => "Refusée",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerRecord {
    pub timestamp: DateTime<Utc>,
    pub user_id: i64,
    pub items: String,
    pub address: String,
    pub phone: String,
    pub status: OrderStatus,
}

impl LedgerRecord {
    pub fn new(
        timestamp: DateTime<Utc>,
        user: UserId,
        items: String,
        address: String,
        phone: Option<String>,
        status: OrderStatus,
    ) -> Self {
        Self {
            timestamp,
            user_id: user.0,
            items,
            address,
            phone: phone.unwrap_or_else(|| PHONE_NOT_PROVIDED.to_string()),
            status,
        }
    }

    pub fn from_order(order: &PendingOrder, timestamp: DateTime<Utc>, status: OrderStatus) -> Self {
        Self::new(
            timestamp,
            order.user,
            order.cart.render(),
            order.address.clone(),
            order.phone.clone(),
            status,
        )
    }

    pub fn to_csv_line(&self) -> String {
        let timestamp = self.timestamp.format(TIMESTAMP_FORMAT).to_string();
        let user_id = self.user_id.to_string();
        [
            timestamp.as_str(),
            user_id.as_str(),
            self.items.as_str(),
            self.address.as_str(),
            self.phone.as_str(),
            self.status.as_str(),
        ]
        .iter()
        .map(|field| csv_field(field))
        .collect::<Vec<_>>()
        .join(",")
    }
}

/// Quote a CSV field when it holds a separator, quote or line break
fn csv_field(value: &str) -> String {
    if value.contains(&[',', '"', '\n', '\r'][..]) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[async_trait]
pub trait OrderLedger: Send + Sync {
    async fn append(&self, record: &LedgerRecord) -> Result<()>;
}

/// Appends rows to a CSV file
pub struct CsvLedger {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl CsvLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl OrderLedger for CsvLedger {
    async fn append(&self, record: &LedgerRecord) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("Failed to open ledger file {}", self.path.display()))?;

        let mut line = record.to_csv_line();
        line.push('\n');
        file.write_all(line.as_bytes())
            .await
            .context("Failed to append ledger row")?;
        file.flush().await.context("Failed to flush ledger file")?;

        info!(user_id = record.user_id, status = %record.status, "Order recorded in ledger");
        Ok(())
    }
}
