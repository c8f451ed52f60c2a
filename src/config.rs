//! # Configuration Module
//!
//! Process configuration read once at start-up from the environment (and an
//! optional `.env` file loaded by the binary).

use anyhow::{bail, Context, Result};
use std::path::PathBuf;

use crate::UserId;

pub const DEFAULT_PRODUCTS_FILE: &str = "products.json";
pub const DEFAULT_ORDERS_FILE: &str = "orders.csv";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Telegram bot token
    pub bot_token: String,
    /// Administrators allowed to decide orders and edit the catalog
    pub admin_ids: Vec<UserId>,
    /// JSON file holding the catalog
    pub products_file: PathBuf,
    /// CSV ledger, used when no database is configured
    pub orders_file: PathBuf,
    /// PostgreSQL ledger connection string
    pub database_url: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bot_token = lookup("TELEGRAM_BOT_TOKEN")
            .filter(|token| !token.trim().is_empty())
            .context("TELEGRAM_BOT_TOKEN must be set")?;

        let admin_ids = parse_admin_ids(
            &lookup("ADMIN_IDS").context("ADMIN_IDS must be set")?,
        )?;

        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Ok(Self {
            bot_token,
            admin_ids,
            products_file: non_empty("PRODUCTS_FILE")
                .unwrap_or_else(|| DEFAULT_PRODUCTS_FILE.to_string())
                .into(),
            orders_file: non_empty("ORDERS_FILE")
                .unwrap_or_else(|| DEFAULT_ORDERS_FILE.to_string())
                .into(),
            database_url: non_empty("DATABASE_URL"),
        })
    }
}

/// Parse a comma-separated list of Telegram ids
pub fn parse_admin_ids(raw: &str) -> Result<Vec<UserId>> {
    let mut ids = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|part| !part.is_empty()) {
        let id: i64 = part
            .parse()
            .with_context(|| format!("Invalid admin id in ADMIN_IDS: {part}"))?;
        if !ids.contains(&UserId(id)) {
            ids.push(UserId(id));
        }
    }
    if ids.is_empty() {
        bail!("ADMIN_IDS must list at least one administrator");
    }
    Ok(ids)
}
