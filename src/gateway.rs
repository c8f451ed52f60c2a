//! Outbound side of the chat transport.

use anyhow::Result;
use async_trait::async_trait;

use crate::callback::Callback;
use crate::UserId;

/// One inline choice: the label shown and the payload sent back when pressed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceButton {
    pub label: String,
    pub callback: Callback,
}

impl ChoiceButton {
    pub fn new(label: impl Into<String>, callback: Callback) -> Self {
        Self {
            label: label.into(),
            callback,
        }
    }
}

#[async_trait]
pub trait Gateway: Send + Sync {
    async fn send_text(&self, recipient: UserId, text: &str) -> Result<()>;

    /// Text followed by one button per row
    async fn send_options(&self, recipient: UserId, text: &str, options: &[ChoiceButton]) -> Result<()>;

    /// Text with a one-time "share my number" keyboard
    async fn request_contact(&self, recipient: UserId, text: &str) -> Result<()>;
}
