use state::BotState;
use teloxide::{dispatching::dialogue::InMemStorage, prelude::Dialogue};

pub mod adder;
pub mod callback;
pub mod commands;
pub mod config;
pub mod database;
pub mod error;
pub mod keyboard;
pub mod logging;
pub mod menu;
pub mod quiz;
pub mod reply;
pub mod runner;
pub mod schema;
pub mod settings;
pub mod state;
pub mod vocabulary;

pub type UserDialogue = Dialogue<BotState, InMemStorage<BotState>>;
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;
pub type HandlerResult = Result<(), HandlerError>;
