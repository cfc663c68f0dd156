use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::database::word::Direction;

const DEFAULT_DATABASE_URL: &str = "sqlite://vocabot.db";
const DEFAULT_LOG_LEVEL: &str = "info";
const WEBHOOK_PATH: &str = "webhook";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} should be set")]
    Missing(&'static str),

    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Display names of the two languages a word pair is made of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Languages {
    pub source: String,
    pub target: String,
}

impl Default for Languages {
    fn default() -> Self {
        Self {
            source: "English".into(),
            target: "Ukrainian".into(),
        }
    }
}

impl Languages {
    pub fn direction_label(&self, direction: Direction) -> String {
        match direction {
            Direction::SourceToTarget => format!("{} → {}", self.source, self.target),
            Direction::TargetToSource => format!("{} → {}", self.target, self.source),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Webhook {
    pub url: Url,
    pub addr: SocketAddr,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub token: String,
    pub database_url: String,
    pub log_level: String,
    pub webhook: Option<Webhook>,
    pub languages: Languages,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |var: &str| lookup(var).filter(|value| !value.trim().is_empty());

        let token = non_empty("TELOXIDE_TOKEN").ok_or(ConfigError::Missing("TELOXIDE_TOKEN"))?;
        let database_url =
            non_empty("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_owned());
        let log_level = non_empty("LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_owned());

        let webhook = match (non_empty("WEBHOOK_URL"), non_empty("WEBHOOK_ADDR")) {
            (Some(url), Some(addr)) => Some(Webhook {
                url: webhook_url(&url)?,
                addr: addr.parse().map_err(|e: std::net::AddrParseError| {
                    ConfigError::Invalid {
                        var: "WEBHOOK_ADDR",
                        reason: e.to_string(),
                    }
                })?,
            }),
            _ => None,
        };

        let defaults = Languages::default();
        let languages = Languages {
            source: non_empty("SOURCE_LANGUAGE").unwrap_or(defaults.source),
            target: non_empty("TARGET_LANGUAGE").unwrap_or(defaults.target),
        };

        Ok(Self {
            token,
            database_url,
            log_level,
            webhook,
            languages,
        })
    }
}

fn webhook_url(raw: &str) -> Result<Url, ConfigError> {
    let mut url = raw.parse::<Url>().map_err(|e| ConfigError::Invalid {
        var: "WEBHOOK_URL",
        reason: e.to_string(),
    })?;

    if url.path() == "/" {
        url.set_path(WEBHOOK_PATH);
    }

    Ok(url)
}
