//! # Error Types Module
//!
//! Refusals raised by the order state machine and the catalog. None of these
//! are fatal: the shop turns each one into a plain-text notice or ignores it.

use std::time::Duration;
use thiserror::Error;

/// Guard failures of the per-user order flow
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    #[error("Unknown product: {0}")]
    UnknownProduct(String),

    #[error("Price {price} is not offered for {product}")]
    UnknownPrice { product: String, price: u32 },

    #[error("Event not expected in step {0}")]
    OutOfStep(&'static str),

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Checkout cooldown active, {} s remaining", remaining.as_secs())]
    CooldownActive { remaining: Duration },

    #[error("An order is already awaiting a decision")]
    AlreadyPending,

    #[error("Address is empty")]
    EmptyAddress,
}

/// Catalog mutation failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("Product name is empty")]
    EmptyName,

    #[error("Product already exists: {0}")]
    DuplicateName(String),

    #[error("Product needs at least one price")]
    NoPrices,

    #[error("No product at index {0}")]
    BadIndex(usize),

    #[error("Product not found: {0}")]
    UnknownProduct(String),

    #[error("Product name too long for button payloads: {0}")]
    NameTooLong(String),
}

/// Malformed inline button payloads
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallbackError {
    #[error("Unrecognised callback payload: {0}")]
    Unrecognised(String),

    #[error("Invalid number in callback payload: {0}")]
    InvalidNumber(String),
}
