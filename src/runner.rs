use std::sync::Arc;

use rand::Rng;
use teloxide::{types::Message, Bot};
use tracing::instrument;

use crate::{
    callback::Token,
    database::{
        connection::{ManagePreferences, ManageWords, TrackStats},
        word::{Direction, WordPair},
    },
    error::{QuizError, Result},
    quiz::{generate_question, Level, Question, MIN_WORDS},
    reply::{Choice, Outcome, Reply},
    schema::respond,
    state::BotState,
    HandlerResult, UserDialogue,
};

const LEVEL_PROMPT: &str = "Choose the difficulty:\n\
    1️⃣ Easy (2 options)\n\
    2️⃣ Medium (4 options)\n\
    3️⃣ Hard (type the answer)";

fn graded(question: &Question, correct: bool) -> String {
    if correct {
        format!("✅ Correct! {}", question.answer())
    } else {
        format!("❌ Wrong. The correct answer is: {}", question.answer())
    }
}

/// Loads the word list and the user's direction, then asks for a level.
pub(crate) async fn start_quiz<Db>(db: &Db, user_id: i64) -> Result<Outcome>
where
    Db: ManageWords + ManagePreferences,
{
    let words = db.list_words().await?;
    if words.len() < MIN_WORDS {
        tracing::info!(user_id, available = words.len(), "quiz refused: not enough words");
        return Ok(Outcome::idle(Reply::with_menu(format!(
            "Not enough words for a quiz (at least {MIN_WORDS} needed)."
        ))));
    }

    db.ensure_user(user_id).await?;
    let direction = db.get_direction(user_id).await?;
    tracing::info!(user_id, words = words.len(), ?direction, "quiz started");

    Ok(Outcome::new(
        Reply::text(LEVEL_PROMPT),
        BotState::ReceiveLevel { words, direction },
    ))
}

pub(crate) fn choose_level<R: Rng + ?Sized>(
    words: Vec<WordPair>,
    direction: Direction,
    text: Option<&str>,
    rng: &mut R,
) -> Outcome {
    let Some(level) = text.and_then(Level::parse) else {
        return Outcome::new(
            Reply::text("Please choose 1, 2 or 3."),
            BotState::ReceiveLevel { words, direction },
        );
    };

    let question = match generate_question(&words, level, direction, rng) {
        Ok(question) => question,
        Err(QuizError::InsufficientData { .. }) => {
            return Outcome::idle(Reply::with_menu(format!(
                "Not enough words for a quiz (at least {MIN_WORDS} needed)."
            )));
        }
        Err(e @ QuizError::GenerationStall { .. }) => {
            tracing::warn!(error = %e, ?level, "quiz aborted");
            return Outcome::idle(Reply::with_menu(
                "Your words don't have enough different translations for this level. \
                 Add more words or choose the hard level.",
            ));
        }
    };

    let text = format!("🔎 Translate: {}", question.prompt());
    match question.options() {
        Some(options) => {
            let choices = options
                .iter()
                .enumerate()
                .map(|(index, option)| Choice {
                    label: option.clone(),
                    token: Token::Answer {
                        question: question.id(),
                        option: index,
                    },
                })
                .collect();
            Outcome::new(
                Reply::with_choices(text, choices),
                BotState::AwaitingChoice { question },
            )
        }
        None => Outcome::new(Reply::text(text), BotState::ReceiveAnswer { question }),
    }
}

pub(crate) async fn grade_text<Tracker: TrackStats>(
    stats: &Tracker,
    question: Question,
    text: Option<&str>,
) -> Result<Outcome> {
    let Some(input) = text else {
        return Ok(Outcome::new(
            Reply::text("Please type the translation."),
            BotState::ReceiveAnswer { question },
        ));
    };

    let correct = question.check_text(input);
    stats.record_answer(correct).await?;
    tracing::info!(prompt = question.prompt(), input, correct, "typed answer graded");

    Ok(Outcome::idle(Reply::with_menu(graded(&question, correct))))
}

/// Grades a tapped option. Taps that don't belong to the pending question change nothing.
pub(crate) async fn grade_choice<Tracker: TrackStats>(
    stats: &Tracker,
    state: BotState,
    question_id: u32,
    index: usize,
) -> Result<Outcome> {
    let pending = match &state {
        BotState::AwaitingChoice { question } if question.id() == question_id => question
            .options()
            .and_then(|options| options.get(index))
            .map(|option| (question.clone(), option.clone())),
        _ => None,
    };

    let Some((question, option)) = pending else {
        tracing::warn!(question_id, index, "answer tapped without a matching pending question");
        return Ok(Outcome::new(
            Reply::text("This question is no longer active."),
            state,
        ));
    };

    let correct = question.check_choice(&option);
    stats.record_answer(correct).await?;
    tracing::info!(prompt = question.prompt(), option = option.as_str(), correct, "tapped answer graded");

    Ok(Outcome::idle(Reply::text(format!(
        "🔎 Translate: {}\nYour answer: {option}\n{}",
        question.prompt(),
        graded(&question, correct)
    ))))
}

#[instrument(level = "info", skip(bot, dialogue, words))]
pub(crate) async fn receive_level(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    (words, direction): (Vec<WordPair>, Direction),
) -> HandlerResult {
    let outcome = choose_level(words, direction, msg.text(), &mut rand::rng());
    respond(&bot, &dialogue, msg.chat.id, Ok(outcome)).await
}

#[instrument(level = "info", skip(bot, dialogue, connection))]
pub(crate) async fn receive_answer<DbConnection: TrackStats>(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    question: Question,
    connection: Arc<DbConnection>,
) -> HandlerResult {
    let outcome = grade_text(connection.as_ref(), question, msg.text()).await;
    respond(&bot, &dialogue, msg.chat.id, outcome).await
}
