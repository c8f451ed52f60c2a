//! UI Builder module for creating Telegram keyboards

use teloxide::types::{
    ButtonRequest, InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup,
};

use crate::gateway::ChoiceButton;
use crate::localization::t;

/// One inline button per row
pub fn inline_keyboard(options: &[ChoiceButton]) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(options.iter().map(|option| {
        vec![InlineKeyboardButton::callback(
            option.label.clone(),
            option.callback.encode(),
        )]
    }))
}

/// One-time reply keyboard asking Telegram to share the user's number
pub fn contact_keyboard() -> KeyboardMarkup {
    let button = KeyboardButton::new(t("button-share-contact")).request(ButtonRequest::Contact);
    KeyboardMarkup::new(vec![vec![button]])
        .one_time_keyboard()
        .resize_keyboard()
}
