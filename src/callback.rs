use std::{fmt, str::FromStr};

use thiserror::Error;

/// Data carried by an inline button and sent back when it is tapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Delete(i64),
    /// Page of the delete picker.
    DeletePage(usize),
    /// Option `option` of the question tagged `question`.
    Answer { question: u32, option: usize },
    ClearWords,
    ClearStats,
    ToggleDirection,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized callback data '{0}'")]
pub struct UnknownToken(pub String);

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Delete(id) => write!(f, "delete:{id}"),
            Token::DeletePage(page) => write!(f, "delete_page:{page}"),
            Token::Answer { question, option } => write!(f, "answer:{question}:{option}"),
            Token::ClearWords => f.write_str("settings:clear_words"),
            Token::ClearStats => f.write_str("settings:clear_stats"),
            Token::ToggleDirection => f.write_str("settings:direction"),
        }
    }
}

impl FromStr for Token {
    type Err = UnknownToken;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || UnknownToken(s.to_owned());

        match s.split_once(':').ok_or_else(unknown)? {
            ("delete", id) => id.parse().map(Token::Delete).map_err(|_| unknown()),
            ("delete_page", page) => page.parse().map(Token::DeletePage).map_err(|_| unknown()),
            ("answer", rest) => {
                let (question, option) = rest.split_once(':').ok_or_else(unknown)?;
                Ok(Token::Answer {
                    question: question.parse().map_err(|_| unknown())?,
                    option: option.parse().map_err(|_| unknown())?,
                })
            }
            ("settings", "clear_words") => Ok(Token::ClearWords),
            ("settings", "clear_stats") => Ok(Token::ClearStats),
            ("settings", "direction") => Ok(Token::ToggleDirection),
            _ => Err(unknown()),
        }
    }
}
