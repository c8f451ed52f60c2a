//! Message Handler module for processing incoming Telegram messages

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::debug;

use super::Command;
use crate::localization::t;
use crate::shop::{AdminCommand, InboundEvent, Shop};
use crate::UserId;

/// Map a bot command to a shop event; `None` for a malformed `/editproduct`
pub fn command_event(command: Command) -> Option<InboundEvent> {
    let event = match command {
        Command::Start => InboundEvent::Start,
        Command::Cart => InboundEvent::ShowCart,
        Command::Cancel => InboundEvent::Cancel,
        Command::AddProduct => InboundEvent::Admin(AdminCommand::AddProduct),
        Command::ListProducts => InboundEvent::Admin(AdminCommand::ListProducts),
        Command::RemoveProduct => InboundEvent::Admin(AdminCommand::RemoveProduct),
        Command::Maintenance => InboundEvent::Admin(AdminCommand::ToggleMaintenance),
        Command::EditProduct(arg) => {
            // Shown one-based in /listproducts
            let position: usize = arg.trim().parse().ok()?;
            let index = position.checked_sub(1)?;
            InboundEvent::Admin(AdminCommand::EditProduct(index))
        }
    };
    Some(event)
}

/// Handle bot commands in private chats
pub async fn command_handler(bot: Bot, msg: Message, cmd: Command, shop: Arc<Shop>) -> Result<()> {
    if !msg.chat.is_private() {
        return Ok(());
    }
    let user = UserId(msg.chat.id.0);
    debug!(user_id = %user, command = ?cmd, "Received command");

    match command_event(cmd) {
        Some(event) => shop.handle(user, event).await,
        None => {
            bot.send_message(msg.chat.id, t("admin-edit-usage")).await?;
            Ok(())
        }
    }
}

/// Handle plain text and shared contacts in private chats
pub async fn message_handler(msg: Message, shop: Arc<Shop>) -> Result<()> {
    if !msg.chat.is_private() {
        return Ok(());
    }
    let user = UserId(msg.chat.id.0);

    if let Some(contact) = msg.contact() {
        debug!(user_id = %user, "Received shared contact");
        return shop
            .handle(user, InboundEvent::ContactShared(contact.phone_number.clone()))
            .await;
    }

    if let Some(text) = msg.text() {
        debug!(user_id = %user, "Received text message");
        return shop.handle(user, InboundEvent::TextInput(text.to_string())).await;
    }

    debug!(user_id = %user, "Ignoring unsupported message kind");
    Ok(())
}
