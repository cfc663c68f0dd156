use std::str::FromStr;

use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions},
    Row,
};

use super::word::{Counter, Direction, Stats, WordPair};
use crate::error::Result;

pub struct Connection {
    pool: SqlitePool,
}

impl Connection {
    pub async fn connect(connection_string: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(connection_string)?.create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;
        Ok(Self { pool })
    }

    /// A private database that lives as long as the pool's only connection.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!().run(&self.pool).await?;
        Ok(())
    }
}

pub(crate) trait ManageWords {
    async fn add_word(&self, source: &str, target: &str) -> Result<i64>;

    /// Returns `false` when no word had this id.
    async fn delete_word(&self, id: i64) -> Result<bool>;

    async fn list_words(&self) -> Result<Vec<WordPair>>;

    async fn clear_words(&self) -> Result<u64>;
}

pub(crate) trait TrackStats {
    async fn get_counters(&self) -> Result<Stats>;

    async fn increment_counter(&self, counter: Counter) -> Result<()>;

    async fn record_answer(&self, correct: bool) -> Result<()>;

    /// Zeroes the answer counters. `words_added` is never reset.
    async fn reset_counters(&self) -> Result<()>;
}

pub(crate) trait ManagePreferences {
    async fn ensure_user(&self, user_id: i64) -> Result<()>;

    async fn get_direction(&self, user_id: i64) -> Result<Direction>;

    async fn set_direction(&self, user_id: i64, direction: Direction) -> Result<()>;

    async fn toggle_direction(&self, user_id: i64) -> Result<Direction>;
}

const INCREMENT: &str = "INSERT INTO stats (key, value) VALUES (?, 1) \
     ON CONFLICT(key) DO UPDATE SET value = value + 1";

impl ManageWords for Connection {
    async fn add_word(&self, source: &str, target: &str) -> Result<i64> {
        let mut tx = self.pool.begin().await?;

        let id: i64 = sqlx::query("INSERT INTO words (source, target) VALUES (?, ?) RETURNING id")
            .bind(source)
            .bind(target)
            .fetch_one(&mut *tx)
            .await?
            .try_get("id")?;

        sqlx::query(INCREMENT)
            .bind(Counter::WordsAdded.key())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::debug!(id, "word stored");

        Ok(id)
    }

    async fn delete_word(&self, id: i64) -> Result<bool> {
        let deleted = sqlx::query("DELETE FROM words WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }

    async fn list_words(&self) -> Result<Vec<WordPair>> {
        let records = sqlx::query("SELECT id, source, target FROM words ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        records
            .into_iter()
            .map(|record| -> Result<WordPair> {
                Ok(WordPair::retreive(
                    record.try_get("id")?,
                    record.try_get("source")?,
                    record.try_get("target")?,
                ))
            })
            .collect()
    }

    async fn clear_words(&self) -> Result<u64> {
        let deleted = sqlx::query("DELETE FROM words")
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }
}

impl TrackStats for Connection {
    async fn get_counters(&self) -> Result<Stats> {
        let records = sqlx::query("SELECT key, value FROM stats")
            .fetch_all(&self.pool)
            .await?;

        let mut stats = Stats::default();
        for record in records {
            let key: String = record.try_get("key")?;
            let value: i64 = record.try_get("value")?;
            match key.as_str() {
                "words_added" => stats.words_added = value,
                "correct_answers" => stats.correct_answers = value,
                "total_answers" => stats.total_answers = value,
                other => tracing::warn!(key = other, "unknown counter in stats table"),
            }
        }

        Ok(stats)
    }

    async fn increment_counter(&self, counter: Counter) -> Result<()> {
        sqlx::query(INCREMENT)
            .bind(counter.key())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn record_answer(&self, correct: bool) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(INCREMENT)
            .bind(Counter::TotalAnswers.key())
            .execute(&mut *tx)
            .await?;

        if correct {
            sqlx::query(INCREMENT)
                .bind(Counter::CorrectAnswers.key())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(())
    }

    async fn reset_counters(&self) -> Result<()> {
        sqlx::query("UPDATE stats SET value = 0 WHERE key IN (?, ?)")
            .bind(Counter::CorrectAnswers.key())
            .bind(Counter::TotalAnswers.key())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

impl ManagePreferences for Connection {
    async fn ensure_user(&self, user_id: i64) -> Result<()> {
        sqlx::query("INSERT OR IGNORE INTO users (user_id) VALUES (?)")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn get_direction(&self, user_id: i64) -> Result<Direction> {
        let record = sqlx::query("SELECT direction FROM users WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        match record {
            Some(record) => {
                let direction: String = record.try_get("direction")?;
                Ok(direction.parse()?)
            }
            None => Ok(Direction::default()),
        }
    }

    async fn set_direction(&self, user_id: i64, direction: Direction) -> Result<()> {
        sqlx::query(
            "INSERT INTO users (user_id, direction) VALUES (?, ?) \
             ON CONFLICT(user_id) DO UPDATE SET direction = excluded.direction",
        )
        .bind(user_id)
        .bind(direction.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn toggle_direction(&self, user_id: i64) -> Result<Direction> {
        let flipped = self.get_direction(user_id).await?.flipped();
        self.set_direction(user_id, flipped).await?;
        Ok(flipped)
    }
}
