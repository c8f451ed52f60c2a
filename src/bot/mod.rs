//! Bot module for handling Telegram interactions
//!
//! This module is split into several submodules:
//! - `message_handler`: Handles commands, text and shared contacts
//! - `callback_handler`: Handles inline keyboard callback queries
//! - `ui_builder`: Creates Telegram keyboards
//! - `telegram_gateway`: Sends the shop's outbound messages through the Bot API

pub mod callback_handler;
pub mod message_handler;
pub mod telegram_gateway;
pub mod ui_builder;

use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

pub use callback_handler::callback_handler;
pub use message_handler::{command_handler, message_handler};
pub use telegram_gateway::TelegramGateway;

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Commandes disponibles :")]
pub enum Command {
    #[command(description = "commencer une commande")]
    Start,
    #[command(description = "voir le panier")]
    Cart,
    #[command(description = "annuler la commande en cours")]
    Cancel,
    #[command(description = "ajouter un produit (admin)")]
    AddProduct,
    #[command(description = "lister les produits (admin)")]
    ListProducts,
    #[command(description = "supprimer un produit (admin)")]
    RemoveProduct,
    #[command(description = "modifier le produit n (admin)")]
    EditProduct(String),
    #[command(description = "activer/désactiver la maintenance (admin)")]
    Maintenance,
}

/// Dispatcher tree: commands first, then plain messages, then button presses
pub fn schema() -> UpdateHandler<anyhow::Error> {
    let message_branch = Update::filter_message()
        .branch(dptree::entry().filter_command::<Command>().endpoint(command_handler))
        .branch(dptree::endpoint(message_handler));

    let callback_branch = Update::filter_callback_query().endpoint(callback_handler);

    dptree::entry().branch(message_branch).branch(callback_branch)
}
