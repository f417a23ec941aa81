//! Assistant module - registration flow and AI question answering.

pub mod command;
pub mod database;
pub mod engine;
pub mod openrouter;
pub mod registration;
pub mod telegram;
pub mod texts;
pub mod validation;


pub use command::{Command, Input};
pub use database::{Database, StorageError, User};
pub use engine::{AssistantEngine, Failure};
pub use openrouter::{AiClient, AiError};
pub use registration::{ChatContext, RegistrationState};
pub use telegram::{Format, Outbox, Reply, TelegramClient};
