use teloxide::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup, ReplyMarkup,
};

use crate::{
    menu::MENU_LABELS,
    reply::{Choice, Markup},
};

pub(crate) fn main_menu_keyboard() -> KeyboardMarkup {
    let keyboard: Vec<Vec<KeyboardButton>> = MENU_LABELS
        .iter()
        .map(|row| row.iter().map(|(label, _)| KeyboardButton::new(*label)).collect())
        .collect();

    KeyboardMarkup::new(keyboard)
}

pub(crate) fn choices_keyboard(choices: &[Choice]) -> InlineKeyboardMarkup {
    let keyboard: Vec<Vec<InlineKeyboardButton>> = choices
        .iter()
        .map(|choice| {
            vec![InlineKeyboardButton::callback(
                choice.label.clone(),
                choice.token.to_string(),
            )]
        })
        .collect();

    InlineKeyboardMarkup::new(keyboard)
}

pub(crate) fn render(markup: &Markup) -> ReplyMarkup {
    match markup {
        Markup::MainMenu => main_menu_keyboard().into(),
        Markup::Remove => ReplyMarkup::kb_remove(),
        Markup::Choices(choices) => choices_keyboard(choices).into(),
    }
}
