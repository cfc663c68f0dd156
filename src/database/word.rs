use std::{fmt, str::FromStr};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordPair {
    id: i64,
    source: String,
    target: String,
}

impl fmt::Display for WordPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.source, self.target)
    }
}

impl WordPair {
    pub fn retreive(id: i64, source: String, target: String) -> Self {
        Self { id, source, target }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Splits the pair into `(question, answer)` for the given direction.
    pub fn project(&self, direction: Direction) -> (&str, &str) {
        match direction {
            Direction::SourceToTarget => (&self.source, &self.target),
            Direction::TargetToSource => (&self.target, &self.source),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    SourceToTarget,
    TargetToSource,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::SourceToTarget => "source_to_target",
            Direction::TargetToSource => "target_to_source",
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Direction::SourceToTarget => Direction::TargetToSource,
            Direction::TargetToSource => Direction::SourceToTarget,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown direction '{0}'")]
pub struct UnknownDirection(pub String);

impl FromStr for Direction {
    type Err = UnknownDirection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "source_to_target" => Ok(Direction::SourceToTarget),
            "target_to_source" => Ok(Direction::TargetToSource),
            other => Err(UnknownDirection(other.to_owned())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    WordsAdded,
    CorrectAnswers,
    TotalAnswers,
}

impl Counter {
    pub fn key(self) -> &'static str {
        match self {
            Counter::WordsAdded => "words_added",
            Counter::CorrectAnswers => "correct_answers",
            Counter::TotalAnswers => "total_answers",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub words_added: i64,
    pub correct_answers: i64,
    pub total_answers: i64,
}

impl Stats {
    /// Share of correct answers in percent, rounded to two decimals. Zero when nothing was answered.
    pub fn accuracy_percent(&self) -> f64 {
        if self.total_answers <= 0 {
            return 0.0;
        }
        let percent = self.correct_answers as f64 / self.total_answers as f64 * 100.0;
        (percent * 100.0).round() / 100.0
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "📊 Statistics:\nWords added: {}\nCorrect answers: {}\nTotal answers: {}\nAccuracy: {}%",
            self.words_added,
            self.correct_answers,
            self.total_answers,
            self.accuracy_percent()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accuracy_is_zero_without_answers() {
        let stats = Stats::default();
        assert_eq!(stats.accuracy_percent(), 0.0);
        assert!(stats.to_string().ends_with("Accuracy: 0%"));
    }

    #[test]
    fn accuracy_rounds_to_two_decimals() {
        let stats = Stats {
            words_added: 3,
            correct_answers: 2,
            total_answers: 3,
        };
        assert_eq!(stats.accuracy_percent(), 66.67);
    }

    #[test]
    fn direction_round_trips_through_storage_names() {
        for direction in [Direction::SourceToTarget, Direction::TargetToSource] {
            assert_eq!(direction.as_str().parse::<Direction>(), Ok(direction));
        }
        assert!("EN-UA".parse::<Direction>().is_err());
    }

    #[test]
    fn flipping_twice_restores_direction() {
        let direction = Direction::default();
        assert_eq!(direction.flipped().flipped(), direction);
        assert_ne!(direction.flipped(), direction);
    }

    #[test]
    fn projection_follows_direction() {
        let word = WordPair::retreive(1, "cat".into(), "кіт".into());
        assert_eq!(word.project(Direction::SourceToTarget), ("cat", "кіт"));
        assert_eq!(word.project(Direction::TargetToSource), ("кіт", "cat"));
        assert_eq!(word.to_string(), "cat → кіт");
    }
}
