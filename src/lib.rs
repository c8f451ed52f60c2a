//! # Order Bot
//!
//! A Telegram ordering bot: customers browse a small catalog, fill a cart,
//! give a delivery address and an optional phone number, and administrators
//! approve or reject each order with a two-button reply.

pub mod bot;
pub mod callback;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod cooldown;
pub mod db;
pub mod errors;
pub mod gateway;
pub mod ledger;
pub mod localization;
pub mod session;
pub mod shop;
pub mod store;
pub mod zone;

/// Telegram user identifier; in private chats it is also the chat id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(pub i64);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
