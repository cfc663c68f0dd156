use std::sync::Arc;

use teloxide::{
    prelude::Requester, types::Message, utils::command::BotCommands, Bot,
};
use tracing::instrument;

use crate::{
    database::connection::ManagePreferences,
    error::Result,
    reply::{Outcome, Reply},
    schema::respond,
    HandlerResult, UserDialogue,
};

#[derive(Debug, Clone, PartialEq, BotCommands)]
#[command(rename_rule = "lowercase")]
pub enum Command {
    #[command(description = "display help.")]
    Help,
    #[command(description = "open the main menu.")]
    Start,
    #[command(description = "abandon the current step and return to the menu.")]
    Cancel,
}

pub(crate) async fn greet<Prefs: ManagePreferences>(prefs: &Prefs, user_id: i64) -> Result<Outcome> {
    prefs.ensure_user(user_id).await?;
    Ok(Outcome::idle(Reply::with_menu("👋 Welcome! Choose an action:")))
}

pub(crate) fn abandon() -> Outcome {
    Outcome::idle(Reply::with_menu("Cancelled. Choose an action:"))
}

pub(crate) async fn help(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, Command::descriptions().to_string())
        .await?;
    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, connection))]
pub(crate) async fn start<DbConnection: ManagePreferences>(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    connection: Arc<DbConnection>,
) -> HandlerResult {
    let outcome = greet(connection.as_ref(), msg.chat.id.0).await;
    respond(&bot, &dialogue, msg.chat.id, outcome).await
}

#[instrument(level = "info", skip(bot, dialogue))]
pub(crate) async fn cancel(bot: Bot, dialogue: UserDialogue, msg: Message) -> HandlerResult {
    respond(&bot, &dialogue, msg.chat.id, Ok(abandon())).await
}
