use std::sync::Arc;

use teloxide::{types::Message, Bot};
use tracing::instrument;

use crate::{
    config::Languages,
    database::connection::ManageWords,
    error::Result,
    reply::{Outcome, Reply},
    schema::respond,
    state::BotState,
    HandlerResult, UserDialogue,
};

fn entered(text: Option<&str>) -> Option<&str> {
    text.map(str::trim).filter(|text| !text.is_empty())
}

pub(crate) fn start_adding(languages: &Languages) -> Outcome {
    Outcome::new(
        Reply::without_keyboard(format!("Enter the word in {}:", languages.source)),
        BotState::ReceiveSource,
    )
}

pub(crate) fn accept_source(languages: &Languages, text: Option<&str>) -> Outcome {
    match entered(text) {
        Some(source) => Outcome::new(
            Reply::text(format!("Enter the translation in {}:", languages.target)),
            BotState::ReceiveTarget {
                source: source.to_owned(),
            },
        ),
        None => Outcome::new(
            Reply::text(format!("Please send the word in {} as text.", languages.source)),
            BotState::ReceiveSource,
        ),
    }
}

pub(crate) async fn accept_target<Words: ManageWords>(
    words: &Words,
    languages: &Languages,
    source: String,
    text: Option<&str>,
) -> Result<Outcome> {
    let Some(target) = entered(text) else {
        return Ok(Outcome::new(
            Reply::text(format!(
                "Please send the translation in {} as text.",
                languages.target
            )),
            BotState::ReceiveTarget { source },
        ));
    };

    words.add_word(&source, target).await?;
    tracing::info!(%source, translation = target, "word added");

    Ok(Outcome::idle(Reply::with_menu(format!(
        "✅ Word added: {source} → {target}"
    ))))
}

#[instrument(level = "info", skip(bot, dialogue, languages))]
pub(crate) async fn receive_source(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    languages: Arc<Languages>,
) -> HandlerResult {
    let outcome = accept_source(&languages, msg.text());
    respond(&bot, &dialogue, msg.chat.id, Ok(outcome)).await
}

#[instrument(level = "info", skip(bot, dialogue, languages, connection))]
pub(crate) async fn receive_target<DbConnection: ManageWords>(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    source: String,
    languages: Arc<Languages>,
    connection: Arc<DbConnection>,
) -> HandlerResult {
    let outcome = accept_target(connection.as_ref(), &languages, source, msg.text()).await;
    respond(&bot, &dialogue, msg.chat.id, outcome).await
}
