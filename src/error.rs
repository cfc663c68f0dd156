use thiserror::Error;

use crate::database::word::UnknownDirection;

/// Failures of the quiz generator. Both are answered with a message, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    #[error("a quiz needs at least two words, only {available} stored")]
    InsufficientData { available: usize },

    #[error("only {found} distinct options available, {wanted} requested")]
    GenerationStall { wanted: usize, found: usize },
}

#[derive(Debug, Error)]
pub enum BotError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("stored value is invalid: {0}")]
    Corrupted(#[from] UnknownDirection),

    #[error("telegram request failed: {0}")]
    Request(#[from] teloxide::RequestError),
}

pub type Result<T, E = BotError> = std::result::Result<T, E>;
