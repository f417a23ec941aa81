//! Outbound side of the messaging gateway.

use std::future::Future;

use teloxide::prelude::*;
use teloxide::types::{ChatAction, ParseMode};
use tracing::warn;

/// Telegram rejects messages longer than this many characters.
pub const MAX_MESSAGE_CHARS: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Plain,
    Html,
}

/// One outgoing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub format: Format,
}

impl Reply {
    pub fn plain(text: impl Into<String>) -> Self {
        Self { text: text.into(), format: Format::Plain }
    }

    pub fn html(text: impl Into<String>) -> Self {
        Self { text: text.into(), format: Format::Html }
    }
}

/// Where replies go. Implemented by [`TelegramClient`] and by test recorders.
pub trait Outbox: Send + Sync {
    fn send(&self, chat_id: i64, reply: Reply) -> impl Future<Output = Result<(), String>> + Send;

    /// Show a "typing..." indicator while a slow answer is prepared.
    fn typing(&self, _chat_id: i64) -> impl Future<Output = ()> + Send {
        async {}
    }
}

/// Split text into chunks Telegram will accept, preferring line breaks.
pub fn split_message(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut rest: Vec<char> = text.chars().collect();

    while rest.len() > max_chars {
        let window = &rest[..max_chars];
        // Break after the last newline in the second half of the window, if any
        let cut = window
            .iter()
            .rposition(|&c| c == '\n')
            .filter(|&pos| pos >= max_chars / 2)
            .map(|pos| pos + 1)
            .unwrap_or(max_chars);
        chunks.push(rest[..cut].iter().collect());
        rest.drain(..cut);
    }

    if !rest.is_empty() || chunks.is_empty() {
        chunks.push(rest.into_iter().collect());
    }
    chunks
}

/// Telegram API client.
pub struct TelegramClient {
    bot: Bot,
}

impl TelegramClient {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    async fn send_chunk(&self, chat_id: ChatId, text: &str, format: Format) -> Result<(), String> {
        let mut request = self.bot.send_message(chat_id, text);
        if format == Format::Html {
            request = request.parse_mode(ParseMode::Html);
        }

        request.await.map(|_| ()).map_err(|e| {
            let msg = format!("Failed to send: {e}");
            warn!("{}", msg);
            msg
        })
    }
}

impl Outbox for TelegramClient {
    async fn send(&self, chat_id: i64, reply: Reply) -> Result<(), String> {
        let chat_id = ChatId(chat_id);
        for chunk in split_message(&reply.text, MAX_MESSAGE_CHARS) {
            self.send_chunk(chat_id, &chunk, reply.format).await?;
        }
        Ok(())
    }

    async fn typing(&self, chat_id: i64) {
        if let Err(e) = self.bot.send_chat_action(ChatId(chat_id), ChatAction::Typing).await {
            warn!("Failed to send typing action: {e}");
        }
    }
}
