//! Mirrors bot logs into a Telegram chat.
//!
//! WARN/ERROR lines go out at once, INFO lines in batches.

use std::time::Duration;

use teloxide::prelude::*;
use teloxide::types::ChatId;
use tokio::sync::mpsc;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

const FLUSH_INTERVAL: Duration = Duration::from_secs(5);
const MAX_BATCH: usize = 50;
const MAX_LOG_CHARS: usize = 4000;

#[derive(Debug, PartialEq, Eq)]
enum LogLine {
    Urgent(String),
    Batched(String),
}

impl LogLine {
    fn from_event(level: Level, message: String) -> Option<Self> {
        match level {
            Level::ERROR => Some(LogLine::Urgent(format!("❌ {message}"))),
            Level::WARN => Some(LogLine::Urgent(format!("⚠️ {message}"))),
            Level::INFO => Some(LogLine::Batched(message)),
            _ => None,
        }
    }
}

pub struct TelegramLogLayer {
    tx: mpsc::UnboundedSender<LogLine>,
}

impl TelegramLogLayer {
    /// Must be called inside a tokio runtime: spawns the sender task.
    pub fn new(bot: Bot, chat_id: ChatId) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(forward(bot, chat_id, rx));
        Self { tx }
    }
}

async fn forward(bot: Bot, chat_id: ChatId, mut rx: mpsc::UnboundedReceiver<LogLine>) {
    let mut batch: Vec<String> = Vec::new();
    let mut ticker = tokio::time::interval(FLUSH_INTERVAL);

    loop {
        tokio::select! {
            line = rx.recv() => match line {
                Some(LogLine::Urgent(text)) => post(&bot, chat_id, &text).await,
                Some(LogLine::Batched(text)) => {
                    batch.push(text);
                    if batch.len() >= MAX_BATCH {
                        post(&bot, chat_id, &batch.join("\n")).await;
                        batch.clear();
                    }
                }
                None => break,
            },
            _ = ticker.tick() => {
                if !batch.is_empty() {
                    post(&bot, chat_id, &batch.join("\n")).await;
                    batch.clear();
                }
            }
        }
    }
}

fn clip(text: &str) -> String {
    if text.chars().count() > MAX_LOG_CHARS {
        let head: String = text.chars().take(MAX_LOG_CHARS).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}

async fn post(bot: &Bot, chat_id: ChatId, text: &str) {
    // Not a tracing call: logging here would feed back into this layer.
    if let Err(e) = bot.send_message(chat_id, clip(text)).await {
        eprintln!("Failed to send log to Telegram: {e}");
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
}

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else if self.message.is_empty() {
            self.message = format!("{} = {:?}", field.name(), value);
        } else {
            self.message.push_str(&format!(", {} = {:?}", field.name(), value));
        }
    }
}

impl<S: Subscriber> Layer<S> for TelegramLogLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        if let Some(line) = LogLine::from_event(*event.metadata().level(), visitor.message)
            && self.tx.send(line).is_err()
        {
            eprintln!("Log channel closed, message dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels() {
        assert_eq!(
            LogLine::from_event(Level::ERROR, "db down".into()),
            Some(LogLine::Urgent("❌ db down".into()))
        );
        assert_eq!(
            LogLine::from_event(Level::WARN, "slow".into()),
            Some(LogLine::Urgent("⚠️ slow".into()))
        );
        assert_eq!(
            LogLine::from_event(Level::INFO, "hi".into()),
            Some(LogLine::Batched("hi".into()))
        );
        assert_eq!(LogLine::from_event(Level::DEBUG, "noise".into()), None);
    }

    #[test]
    fn test_clip() {
        assert_eq!(clip("short"), "short");
        let long = "ç".repeat(MAX_LOG_CHARS + 10);
        let clipped = clip(&long);
        assert!(clipped.ends_with("..."));
        assert_eq!(clipped.chars().count(), MAX_LOG_CHARS + 3);
    }
}
