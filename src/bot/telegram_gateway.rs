//! Telegram implementation of the shop's outbound gateway

use anyhow::{Context, Result};
use async_trait::async_trait;
use teloxide::prelude::*;

use super::ui_builder::{contact_keyboard, inline_keyboard};
use crate::gateway::{ChoiceButton, Gateway};
use crate::UserId;

#[derive(Clone)]
pub struct TelegramGateway {
    bot: Bot,
}

impl TelegramGateway {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Gateway for TelegramGateway {
    async fn send_text(&self, recipient: UserId, text: &str) -> Result<()> {
        self.bot
            .send_message(ChatId(recipient.0), text)
            .await
            .with_context(|| format!("Failed to send message to {recipient}"))?;
        Ok(())
    }

    async fn send_options(&self, recipient: UserId, text: &str, options: &[ChoiceButton]) -> Result<()> {
        self.bot
            .send_message(ChatId(recipient.0), text)
            .reply_markup(inline_keyboard(options))
            .await
            .with_context(|| format!("Failed to send options to {recipient}"))?;
        Ok(())
    }

    async fn request_contact(&self, recipient: UserId, text: &str) -> Result<()> {
        self.bot
            .send_message(ChatId(recipient.0), text)
            .reply_markup(contact_keyboard())
            .await
            .with_context(|| format!("Failed to request contact from {recipient}"))?;
        Ok(())
    }
}
