use crate::{
    database::word::{Direction, WordPair},
    quiz::Question,
};

/// Per-chat conversation state, kept in the dispatcher's dialogue storage.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum BotState {
    #[default]
    Idle,

    // PART FOR --- ADDING A WORD ---
    ReceiveSource,
    ReceiveTarget {
        source: String,
    },

    // PART FOR --- RUNNING A QUIZ ---
    ReceiveLevel {
        words: Vec<WordPair>,
        direction: Direction,
    },
    ReceiveAnswer {
        question: Question,
    },
    /// Options were sent as buttons; text is handled as in `Idle`.
    AwaitingChoice {
        question: Question,
    },
}

impl BotState {
    pub fn accepts_menu(&self) -> bool {
        matches!(self, BotState::Idle | BotState::AwaitingChoice { .. })
    }
}
