use rand::{
    seq::{IndexedRandom, SliceRandom},
    Rng,
};

use crate::{
    database::word::{Direction, WordPair},
    error::QuizError,
};

pub const MIN_WORDS: usize = 2;

/// Random draws per requested option before the remaining pool is used directly.
const DRAWS_PER_OPTION: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Easy,
    Medium,
    Hard,
}

impl Level {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(Level::Easy),
            "2" => Some(Level::Medium),
            "3" => Some(Level::Hard),
            _ => None,
        }
    }

    /// How many buttons the level shows. `None` means the answer is typed.
    pub fn option_count(self) -> Option<usize> {
        match self {
            Level::Easy => Some(2),
            Level::Medium => Some(4),
            Level::Hard => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    /// Random tag carried by the option buttons, so taps on older questions can be told apart.
    id: u32,
    prompt: String,
    answer: String,
    options: Option<Vec<String>>,
}

impl Question {
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn options(&self) -> Option<&[String]> {
        self.options.as_deref()
    }

    /// Typed answers are compared trimmed and case-insensitively.
    pub fn check_text(&self, input: &str) -> bool {
        input.trim().to_lowercase() == self.answer.to_lowercase()
    }

    /// Tapped options are compared exactly.
    pub fn check_choice(&self, option: &str) -> bool {
        option == self.answer
    }
}

pub fn generate_question<R: Rng + ?Sized>(
    words: &[WordPair],
    level: Level,
    direction: Direction,
    rng: &mut R,
) -> Result<Question, QuizError> {
    if words.len() < MIN_WORDS {
        return Err(QuizError::InsufficientData {
            available: words.len(),
        });
    }

    let picked = words.choose(rng).ok_or(QuizError::InsufficientData {
        available: words.len(),
    })?;

    build_question(words, picked, level, direction, rng)
}

/// Builds the question for an already chosen word.
pub fn build_question<R: Rng + ?Sized>(
    words: &[WordPair],
    picked: &WordPair,
    level: Level,
    direction: Direction,
    rng: &mut R,
) -> Result<Question, QuizError> {
    if words.len() < MIN_WORDS {
        return Err(QuizError::InsufficientData {
            available: words.len(),
        });
    }

    let (prompt, answer) = picked.project(direction);
    let options = match level.option_count() {
        Some(wanted) => Some(pick_options(words, answer, direction, wanted, rng)?),
        None => None,
    };

    Ok(Question {
        id: rng.random(),
        prompt: prompt.to_owned(),
        answer: answer.to_owned(),
        options,
    })
}

fn pick_options<R: Rng + ?Sized>(
    words: &[WordPair],
    answer: &str,
    direction: Direction,
    wanted: usize,
    rng: &mut R,
) -> Result<Vec<String>, QuizError> {
    let candidate = |word: &WordPair| word.project(direction).1.to_owned();

    let mut options = vec![answer.to_owned()];
    let mut draws = 0;
    while options.len() < wanted && draws < wanted * DRAWS_PER_OPTION {
        draws += 1;
        if let Some(word) = words.choose(rng) {
            let option = candidate(word);
            if !options.contains(&option) {
                options.push(option);
            }
        }
    }

    if options.len() < wanted {
        let mut rest: Vec<String> = Vec::new();
        for option in words.iter().map(candidate) {
            if !options.contains(&option) && !rest.contains(&option) {
                rest.push(option);
            }
        }
        rest.shuffle(rng);
        let missing = wanted - options.len();
        options.extend(rest.into_iter().take(missing));
    }

    if options.len() < MIN_WORDS {
        return Err(QuizError::GenerationStall {
            wanted,
            found: options.len(),
        });
    }

    if options.len() < wanted {
        tracing::warn!(wanted, found = options.len(), "serving a question with fewer options");
    }

    options.shuffle(rng);
    Ok(options)
}
