pub mod assistant;
pub mod config;
pub mod telegram_log;
