use crate::{callback::Token, state::BotState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub label: String,
    pub token: Token,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Markup {
    MainMenu,
    Remove,
    Choices(Vec<Choice>),
}

/// Transport independent description of a message to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub markup: Option<Markup>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            markup: None,
        }
    }

    pub fn with_menu(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            markup: Some(Markup::MainMenu),
        }
    }

    pub fn without_keyboard(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            markup: Some(Markup::Remove),
        }
    }

    pub fn with_choices(text: impl Into<String>, choices: Vec<Choice>) -> Self {
        Self {
            text: text.into(),
            markup: Some(Markup::Choices(choices)),
        }
    }
}

/// Telegram's limit on message text, in UTF-16 code units.
pub(crate) const MESSAGE_LIMIT: usize = 4096;

/// Splits text into pieces of at most `limit` UTF-16 units, preferring line breaks.
pub(crate) fn split_text(text: &str, limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split_inclusive('\n') {
        let line_len: usize = line.chars().map(char::len_utf16).sum();
        if current_len + line_len > limit && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if line_len <= limit {
            current.push_str(line);
            current_len += line_len;
            continue;
        }
        for c in line.chars() {
            if current_len + c.len_utf16() > limit {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            current.push(c);
            current_len += c.len_utf16();
        }
    }
    chunks.push(current);

    let chunks: Vec<String> = chunks
        .into_iter()
        .map(|chunk| chunk.trim_end_matches('\n').to_owned())
        .filter(|chunk| !chunk.trim().is_empty())
        .collect();
    if chunks.is_empty() {
        return vec![text.to_owned()];
    }
    chunks
}

/// What a handler step produced: the reply and the state to continue in.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub reply: Reply,
    pub state: BotState,
}

impl Outcome {
    pub fn new(reply: Reply, state: BotState) -> Self {
        Self { reply, state }
    }

    pub fn idle(reply: Reply) -> Self {
        Self::new(reply, BotState::Idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn units(text: &str) -> usize {
        text.chars().map(char::len_utf16).sum()
    }

    #[test]
    fn short_text_is_one_message() {
        assert_eq!(split_text("cat → кіт", MESSAGE_LIMIT), vec!["cat → кіт"]);
    }

    #[test]
    fn long_lists_break_between_lines() {
        let lines: Vec<String> = (0..600).map(|i| format!("word{i} → слово{i}")).collect();
        let text = lines.join("\n");

        let chunks = split_text(&text, MESSAGE_LIMIT);
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|chunk| units(chunk) <= MESSAGE_LIMIT));
        assert_eq!(chunks.join("\n"), text);
    }

    #[test]
    fn oversized_line_is_cut() {
        let text = "я".repeat(10);
        let chunks = split_text(&text, 4);
        assert_eq!(chunks, vec!["яяяя", "яяяя", "яя"]);
    }

    #[test]
    fn emoji_count_as_two_units() {
        let chunks = split_text("📚📚📚", 4);
        assert_eq!(chunks, vec!["📚📚", "📚"]);
    }
}
