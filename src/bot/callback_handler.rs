//! Callback Handler module for processing inline keyboard callback queries

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::{debug, warn};

use crate::callback::Callback;
use crate::shop::{AdminCommand, InboundEvent, Shop};
use crate::UserId;

pub fn callback_event(callback: Callback) -> InboundEvent {
    match callback {
        Callback::Product(name) => InboundEvent::ProductSelected(name),
        Callback::Price { product, price } => InboundEvent::PriceSelected { product, price },
        Callback::Checkout => InboundEvent::CheckoutRequested,
        Callback::ClearCart => InboundEvent::CartCleared,
        Callback::Admin(action) => InboundEvent::AdminDecision(action),
        Callback::RemoveProduct(name) => InboundEvent::Admin(AdminCommand::ConfirmRemoval(name)),
    }
}

/// Handle callback queries from inline keyboards
pub async fn callback_handler(bot: Bot, q: CallbackQuery, shop: Arc<Shop>) -> Result<()> {
    // Answer the callback query to remove the loading state
    bot.answer_callback_query(q.id.clone()).await?;

    let user = match i64::try_from(q.from.id.0) {
        Ok(id) => UserId(id),
        Err(_) => {
            warn!(telegram_id = q.from.id.0, "User id out of range");
            return Ok(());
        }
    };

    let Some(data) = q.data.as_deref() else {
        debug!(user_id = %user, "Callback query without data");
        return Ok(());
    };

    match data.parse::<Callback>() {
        Ok(callback) => {
            debug!(user_id = %user, callback = %callback, "Received callback query");
            shop.handle(user, callback_event(callback)).await
        }
        Err(e) => {
            warn!(user_id = %user, error = %e, "Ignoring malformed callback payload");
            Ok(())
        }
    }
}
