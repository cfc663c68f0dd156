use std::sync::Arc;

use teloxide::{
    dispatching::{
        dialogue::{self, GetChatId, InMemStorage},
        UpdateFilterExt, UpdateHandler,
    },
    dptree,
    payloads::{EditMessageTextSetters, SendMessageSetters},
    prelude::Requester,
    types::{CallbackQuery, ChatId, Me, Message, Update},
    utils::command::BotCommands,
    Bot,
};
use tracing::instrument;

use crate::{
    adder,
    callback::Token,
    commands::{self, Command},
    config::Languages,
    database::connection::{Connection, ManagePreferences, ManageWords, TrackStats},
    error::Result,
    keyboard,
    menu::{self, MenuAction},
    reply::{split_text, Markup, Outcome, Reply, MESSAGE_LIMIT},
    runner, settings,
    state::BotState,
    vocabulary, HandlerError, HandlerResult, UserDialogue,
};

const FAILURE: &str = "Something went wrong. Please try again.";

/// Which branch of the tree handles an incoming message.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Route {
    Command(Command),
    FlowStep,
    Menu,
}

/// Commands win over an active flow step; menu lookup only runs outside a flow.
pub(crate) fn route(command: Option<Command>, state: &BotState) -> Route {
    match command {
        Some(command) => Route::Command(command),
        None if state.accepts_menu() => Route::Menu,
        None => Route::FlowStep,
    }
}

/// Full update tree: commands first, then the active flow step, then the menu.
pub fn schema() -> UpdateHandler<HandlerError> {
    use dptree::case;

    let command_handler = case![Route::Command(command)]
        .branch(case![Command::Help].endpoint(commands::help))
        .branch(case![Command::Start].endpoint(commands::start::<Connection>))
        .branch(case![Command::Cancel].endpoint(commands::cancel));

    let handler = Update::filter_message()
        .map(|msg: Message, me: Me, state: BotState| {
            let command = msg
                .text()
                .and_then(|text| Command::parse(text, me.username()).ok());
            route(command, &state)
        })
        .branch(command_handler)
        .branch(
            case![Route::FlowStep]
                .branch(adder_scheme())
                .branch(runner_scheme()),
        )
        .branch(case![Route::Menu].endpoint(choose_what_to_do::<Connection>));

    dialogue::enter::<Update, InMemStorage<BotState>, BotState, _>()
        .branch(handler)
        .branch(callback_query_scheme())
}

fn adder_scheme() -> UpdateHandler<HandlerError> {
    use dptree::case;

    dptree::entry()
        .branch(case![BotState::ReceiveSource].endpoint(adder::receive_source))
        .branch(
            case![BotState::ReceiveTarget { source }]
                .endpoint(adder::receive_target::<Connection>),
        )
}

fn runner_scheme() -> UpdateHandler<HandlerError> {
    use dptree::case;

    dptree::entry()
        .branch(case![BotState::ReceiveLevel { words, direction }].endpoint(runner::receive_level))
        .branch(
            case![BotState::ReceiveAnswer { question }]
                .endpoint(runner::receive_answer::<Connection>),
        )
}

fn callback_query_scheme() -> UpdateHandler<HandlerError> {
    Update::filter_callback_query().endpoint(take_choice::<Connection>)
}

/// Routes a text that arrived outside of any flow step.
pub(crate) async fn dispatch_text<Db>(
    db: &Db,
    languages: &Languages,
    user_id: i64,
    state: BotState,
    text: Option<&str>,
) -> Result<Outcome>
where
    Db: ManageWords + TrackStats + ManagePreferences,
{
    let Some(action) = text.and_then(menu::lookup) else {
        return Ok(Outcome::idle(Reply::with_menu("Choose an action:")));
    };
    tracing::info!(user_id, ?action, "menu action");

    let outcome = match action {
        MenuAction::AddWord => adder::start_adding(languages),
        MenuAction::Quiz => runner::start_quiz(db, user_id).await?,
        MenuAction::DeleteWord => Outcome::new(vocabulary::start_deleting(db, 0).await?, state),
        MenuAction::ShowWords => Outcome::new(vocabulary::show_words(db).await?, state),
        MenuAction::Stats => Outcome::new(settings::show_stats(db).await?, state),
        MenuAction::Settings => Outcome::new(settings::settings_menu(), state),
    };

    Ok(outcome)
}

/// Routes a tapped inline button. Single-step actions leave the session as it was.
pub(crate) async fn dispatch_callback<Db>(
    db: &Db,
    languages: &Languages,
    user_id: i64,
    state: BotState,
    data: Option<&str>,
) -> Result<Outcome>
where
    Db: ManageWords + TrackStats + ManagePreferences,
{
    let token = match data.map(str::parse::<Token>) {
        Some(Ok(token)) => token,
        Some(Err(e)) => {
            tracing::warn!(user_id, error = %e, "stale or foreign button");
            return Ok(Outcome::new(Reply::text("This button is no longer active."), state));
        }
        None => {
            return Ok(Outcome::new(Reply::text("This button is no longer active."), state));
        }
    };

    let outcome = match token {
        Token::Answer { question, option } => {
            runner::grade_choice(db, state, question, option).await?
        }
        Token::Delete(id) => Outcome::new(vocabulary::delete(db, id).await?, state),
        Token::DeletePage(page) => {
            Outcome::new(vocabulary::start_deleting(db, page).await?, state)
        }
        Token::ClearWords => Outcome::new(settings::clear_words(db).await?, state),
        Token::ClearStats => Outcome::new(settings::clear_stats(db).await?, state),
        Token::ToggleDirection => Outcome::new(
            settings::toggle_direction(db, languages, user_id).await?,
            state,
        ),
    };

    Ok(outcome)
}

fn recover(outcome: Result<Outcome>) -> Outcome {
    outcome.unwrap_or_else(|e| {
        tracing::error!(error = %e, "handler failed");
        Outcome::idle(Reply::with_menu(FAILURE))
    })
}

/// Sends the reply, split over several messages when too long. The keyboard goes with the last one.
async fn send(bot: &Bot, chat_id: ChatId, reply: Reply) -> HandlerResult {
    let mut chunks = split_text(&reply.text, MESSAGE_LIMIT);
    let last = chunks.pop().unwrap_or_default();

    for chunk in chunks {
        bot.send_message(chat_id, chunk).await?;
    }

    let mut request = bot.send_message(chat_id, last);
    if let Some(markup) = &reply.markup {
        request = request.reply_markup(keyboard::render(markup));
    }
    request.await?;
    Ok(())
}

/// Sends the reply; if Telegram refuses it, resets to the menu and says so.
async fn deliver(
    bot: &Bot,
    dialogue: &UserDialogue,
    chat_id: ChatId,
    reply: Reply,
) -> HandlerResult {
    if let Err(e) = send(bot, chat_id, reply).await {
        tracing::error!(error = %e, "reply was not delivered");
        dialogue.update(BotState::Idle).await?;
        send(bot, chat_id, Reply::with_menu(FAILURE)).await?;
    }
    Ok(())
}

/// Stores the next state and sends the reply.
pub(crate) async fn respond(
    bot: &Bot,
    dialogue: &UserDialogue,
    chat_id: ChatId,
    outcome: Result<Outcome>,
) -> HandlerResult {
    let outcome = recover(outcome);
    dialogue.update(outcome.state).await?;
    deliver(bot, dialogue, chat_id, outcome.reply).await
}

#[instrument(level = "info", skip(bot, dialogue, languages, connection))]
async fn choose_what_to_do<DbConnection>(
    bot: Bot,
    msg: Message,
    dialogue: UserDialogue,
    state: BotState,
    languages: Arc<Languages>,
    connection: Arc<DbConnection>,
) -> HandlerResult
where
    DbConnection: ManageWords + TrackStats + ManagePreferences,
{
    let outcome = dispatch_text(
        connection.as_ref(),
        &languages,
        msg.chat.id.0,
        state,
        msg.text(),
    )
    .await;
    respond(&bot, &dialogue, msg.chat.id, outcome).await
}

/// Answers the tap and rewrites the tapped message with the result.
#[instrument(level = "info", skip(bot, dialogue, languages, connection))]
async fn take_choice<DbConnection>(
    bot: Bot,
    q: CallbackQuery,
    dialogue: UserDialogue,
    state: BotState,
    languages: Arc<Languages>,
    connection: Arc<DbConnection>,
) -> HandlerResult
where
    DbConnection: ManageWords + TrackStats + ManagePreferences,
{
    bot.answer_callback_query(q.id.clone()).await?;

    let Some(chat_id) = q.chat_id() else {
        tracing::warn!("callback without a chat, ignoring");
        return Ok(());
    };

    let outcome = recover(
        dispatch_callback(
            connection.as_ref(),
            &languages,
            chat_id.0,
            state,
            q.data.as_deref(),
        )
        .await,
    );
    dialogue.update(outcome.state).await?;

    let fits = split_text(&outcome.reply.text, MESSAGE_LIMIT).len() == 1;
    let inline = match &outcome.reply.markup {
        None => Some(None),
        Some(Markup::Choices(choices)) => Some(Some(keyboard::choices_keyboard(choices))),
        Some(_) => None,
    };

    match (&q.message, inline) {
        (Some(message), Some(inline)) if fits => {
            let mut request = bot.edit_message_text(chat_id, message.id(), outcome.reply.text);
            if let Some(inline) = inline {
                request = request.reply_markup(inline);
            }
            if let Err(e) = request.await {
                tracing::error!(error = %e, "tapped message was not edited");
                dialogue.update(BotState::Idle).await?;
                send(&bot, chat_id, Reply::with_menu(FAILURE)).await?;
            }
            Ok(())
        }
        _ => deliver(&bot, &dialogue, chat_id, outcome.reply).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        database::{
            connection::tests::connection,
            word::{Direction, WordPair},
        },
        reply::Markup,
    };

    #[tokio::test]
    async fn unknown_text_falls_back_to_the_menu() {
        let db = connection().await;
        let outcome = dispatch_text(&db, &Languages::default(), 1, BotState::Idle, Some("hello"))
            .await
            .unwrap();
        assert_eq!(outcome.state, BotState::Idle);
        assert_eq!(outcome.reply.markup, Some(Markup::MainMenu));

        let outcome = dispatch_text(&db, &Languages::default(), 1, BotState::Idle, None)
            .await
            .unwrap();
        assert_eq!(outcome.state, BotState::Idle);
    }

    #[tokio::test]
    async fn menu_labels_start_their_flows() {
        let db = connection().await;
        let languages = Languages::default();

        let outcome = dispatch_text(&db, &languages, 1, BotState::Idle, Some("➕ Add word"))
            .await
            .unwrap();
        assert_eq!(outcome.state, BotState::ReceiveSource);

        // a quiz with an empty dictionary is refused, no flow is entered
        let outcome = dispatch_text(&db, &languages, 1, BotState::Idle, Some("📝 Quiz"))
            .await
            .unwrap();
        assert_eq!(outcome.state, BotState::Idle);

        let outcome = dispatch_text(&db, &languages, 1, BotState::Idle, Some("📚 All words"))
            .await
            .unwrap();
        assert_eq!(outcome.reply.text, "Your word list is empty.");
    }

    #[tokio::test]
    async fn whole_add_word_conversation() {
        let db = connection().await;
        let languages = Languages::default();

        let outcome = dispatch_text(&db, &languages, 1, BotState::Idle, Some("➕ Add word"))
            .await
            .unwrap();
        assert_eq!(outcome.state, BotState::ReceiveSource);
        let outcome = adder::accept_source(&languages, Some("cat"));
        let BotState::ReceiveTarget { source } = outcome.state else {
            panic!("should wait for the translation");
        };
        let outcome = adder::accept_target(&db, &languages, source, Some("кіт"))
            .await
            .unwrap();
        assert_eq!(outcome.state, BotState::Idle);

        let listed = dispatch_text(&db, &languages, 1, BotState::Idle, Some("📚 All words"))
            .await
            .unwrap();
        assert!(listed.reply.text.ends_with("cat → кіт"));

        let stats = dispatch_text(&db, &languages, 1, BotState::Idle, Some("📊 Statistics"))
            .await
            .unwrap();
        assert!(stats.reply.text.contains("Words added: 1"));
    }

    #[tokio::test]
    async fn delete_tap_removes_the_word() {
        let db = connection().await;
        let languages = Languages::default();
        let id = db.add_word("cat", "кіт").await.unwrap();

        let data = Token::Delete(id).to_string();
        let outcome = dispatch_callback(&db, &languages, 1, BotState::Idle, Some(&data))
            .await
            .unwrap();
        assert_eq!(outcome.reply.text, "✅ Word deleted.");
        assert!(db.list_words().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn settings_taps_keep_an_active_flow() {
        let db = connection().await;
        let languages = Languages::default();
        let state = BotState::ReceiveTarget {
            source: "cat".into(),
        };

        let data = Token::ToggleDirection.to_string();
        let outcome = dispatch_callback(&db, &languages, 4, state.clone(), Some(&data))
            .await
            .unwrap();
        assert_eq!(outcome.state, state);
        assert_eq!(db.get_direction(4).await.unwrap(), Direction::TargetToSource);
    }

    #[tokio::test]
    async fn foreign_callback_data_is_stale() {
        let db = connection().await;
        let outcome = dispatch_callback(
            &db,
            &Languages::default(),
            1,
            BotState::Idle,
            Some("del_3"),
        )
        .await
        .unwrap();
        assert_eq!(outcome.reply.text, "This button is no longer active.");
    }

    #[tokio::test]
    async fn pending_choice_survives_single_step_actions() {
        let db = connection().await;
        let languages = Languages::default();
        db.add_word("cat", "кіт").await.unwrap();
        db.add_word("dog", "пес").await.unwrap();

        let words = db.list_words().await.unwrap();
        let quiz = runner::choose_level(
            words,
            Direction::SourceToTarget,
            Some("1"),
            &mut rand::rng(),
        );
        assert!(matches!(quiz.state, BotState::AwaitingChoice { .. }));

        let listed = dispatch_text(&db, &languages, 1, quiz.state.clone(), Some("📚 All words"))
            .await
            .unwrap();
        assert_eq!(listed.state, quiz.state);

        let BotState::AwaitingChoice { question } = &quiz.state else {
            unreachable!()
        };
        let data = Token::Answer {
            question: question.id(),
            option: 0,
        }
        .to_string();
        let graded = dispatch_callback(&db, &languages, 1, listed.state, Some(&data))
            .await
            .unwrap();
        assert_eq!(graded.state, BotState::Idle);
        assert_eq!(db.get_counters().await.unwrap().total_answers, 1);
    }

    #[tokio::test]
    async fn page_taps_move_through_the_delete_picker() {
        let db = connection().await;
        let languages = Languages::default();
        for i in 0..25 {
            db.add_word(&format!("word{i}"), &format!("слово{i}")).await.unwrap();
        }

        let data = Token::DeletePage(1).to_string();
        let outcome = dispatch_callback(&db, &languages, 1, BotState::Idle, Some(&data))
            .await
            .unwrap();
        assert_eq!(outcome.state, BotState::Idle);
        assert_eq!(outcome.reply.text, "Choose a word to delete (page 2 of 2):");
        let Some(Markup::Choices(choices)) = outcome.reply.markup else {
            panic!("expected word buttons");
        };
        assert_eq!(choices.len(), 5 + 1);
        assert_eq!(choices[0].label, "word20 → слово20");
    }

    #[test]
    fn commands_win_over_an_active_flow_step() {
        let question_state = |level: &str| {
            let words = vec![
                WordPair::retreive(1, "cat".into(), "кіт".into()),
                WordPair::retreive(2, "dog".into(), "пес".into()),
            ];
            runner::choose_level(words, Direction::SourceToTarget, Some(level), &mut rand::rng())
                .state
        };
        let states = [
            BotState::Idle,
            BotState::ReceiveSource,
            BotState::ReceiveTarget {
                source: "cat".into(),
            },
            BotState::ReceiveLevel {
                words: Vec::new(),
                direction: Direction::SourceToTarget,
            },
            question_state("3"),
            question_state("1"),
        ];

        for state in &states {
            assert_eq!(
                route(Some(Command::Cancel), state),
                Route::Command(Command::Cancel)
            );
            assert_eq!(
                route(Some(Command::Start), state),
                Route::Command(Command::Start)
            );
        }
    }

    #[test]
    fn plain_text_goes_to_the_step_or_the_menu() {
        assert_eq!(route(None, &BotState::Idle), Route::Menu);
        assert_eq!(route(None, &BotState::ReceiveSource), Route::FlowStep);
        assert_eq!(
            route(
                None,
                &BotState::ReceiveLevel {
                    words: Vec::new(),
                    direction: Direction::SourceToTarget,
                }
            ),
            Route::FlowStep
        );
    }

    #[test]
    fn cancel_text_parses_as_a_command() {
        assert!(matches!(Command::parse("/cancel", "vocabot"), Ok(Command::Cancel)));
        assert!(matches!(
            Command::parse("/cancel@vocabot", "vocabot"),
            Ok(Command::Cancel)
        ));
        assert!(Command::parse("cancel", "vocabot").is_err());
    }

    #[test]
    fn failures_reset_to_the_menu() {
        let outcome = recover(Err(sqlx::Error::PoolClosed.into()));
        assert_eq!(outcome.state, BotState::Idle);
        assert_eq!(outcome.reply, Reply::with_menu(FAILURE));
    }
}
