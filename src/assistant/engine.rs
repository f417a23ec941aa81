//! Assistant engine - routes each chat message through registration or to the AI.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::assistant::command::{Command, Input};
use crate::assistant::database::{Database, StorageError};
use crate::assistant::openrouter::{AiClient, AiError};
use crate::assistant::registration::{ChatContext, Submission};
use crate::assistant::telegram::{Outbox, Reply};
use crate::assistant::texts;
use crate::assistant::validation::{Field, InvalidFormat};

/// Why a message could not be handled normally. Each kind has a fixed reply.
#[derive(Debug)]
pub enum Failure {
    InvalidFormat(InvalidFormat),
    StorageUnavailable(StorageError),
    AiRequestFailed(AiError),
}

impl Failure {
    /// Text sent back to the chat.
    pub fn user_message(&self) -> &'static str {
        match self {
            Failure::InvalidFormat(e) => match e.field {
                Field::Name => texts::INVALID_NAME,
                Field::AcademicId => texts::INVALID_ID,
            },
            Failure::StorageUnavailable(_) => texts::STORAGE_FAILED,
            Failure::AiRequestFailed(_) => texts::AI_FAILED,
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::InvalidFormat(e) => write!(f, "{e}"),
            Failure::StorageUnavailable(e) => write!(f, "storage unavailable: {e}"),
            Failure::AiRequestFailed(e) => write!(f, "AI request failed: {e}"),
        }
    }
}

impl std::error::Error for Failure {}

impl From<InvalidFormat> for Failure {
    fn from(e: InvalidFormat) -> Self {
        Failure::InvalidFormat(e)
    }
}

impl From<StorageError> for Failure {
    fn from(e: StorageError) -> Self {
        Failure::StorageUnavailable(e)
    }
}

impl From<AiError> for Failure {
    fn from(e: AiError) -> Self {
        Failure::AiRequestFailed(e)
    }
}

/// Per-chat slot. Empty until the chat's first message loads it from the database.
type Session = Arc<Mutex<Option<ChatContext>>>;

/// The assistant engine.
pub struct AssistantEngine<O> {
    database: Database,
    ai: AiClient,
    outbox: O,
    username: Option<String>,
    sessions: Mutex<HashMap<i64, Session>>,
}

impl<O: Outbox> AssistantEngine<O> {
    pub fn new(database: Database, ai: AiClient, outbox: O) -> Self {
        Self {
            database,
            ai,
            outbox,
            username: None,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Only accept `/command@name` suffixes that match this bot's username.
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Handle one inbound text message. Never fails: problems become replies.
    pub async fn handle_message(&self, chat_id: i64, text: &str) {
        info!("📨 Chat {}: {} chars", chat_id, text.chars().count());
        debug!("Chat {} text: \"{}\"", chat_id, text.chars().take(50).collect::<String>());

        let input = match Input::parse(text, self.username.as_deref()) {
            Input::OtherBot => {
                debug!("Chat {}: command addressed to another bot", chat_id);
                return;
            }
            input => input,
        };

        let session = self.session(chat_id).await;
        {
            // Held for the whole message so one chat is handled at a time.
            let mut slot = session.lock().await;

            if let Err(failure) = self.process(&mut slot, chat_id, input).await {
                match &failure {
                    Failure::InvalidFormat(_) => info!("Chat {}: {}", chat_id, failure),
                    Failure::StorageUnavailable(_) => error!("Chat {}: {}", chat_id, failure),
                    Failure::AiRequestFailed(_) => warn!("Chat {}: {}", chat_id, failure),
                }
                self.reply(chat_id, Reply::plain(failure.user_message())).await;
            }
        }

        self.release(chat_id, session).await;
    }

    async fn session(&self, chat_id: i64) -> Session {
        let mut sessions = self.sessions.lock().await;
        sessions.entry(chat_id).or_default().clone()
    }

    /// Drop the chat's slot unless it holds a registration in progress.
    /// Other states are rebuilt from the database on the next message.
    async fn release(&self, chat_id: i64, session: Session) {
        let mut sessions = self.sessions.lock().await;
        // One reference in the map, one here: nobody else is waiting on it.
        if Arc::strong_count(&session) > 2 {
            return;
        }
        let idle = match session.try_lock() {
            Ok(slot) => !matches!(&*slot, Some(ctx) if ctx.is_registering()),
            Err(_) => false,
        };
        if idle {
            sessions.remove(&chat_id);
        }
    }

    #[cfg(test)]
    pub(crate) async fn open_sessions(&self) -> usize {
        self.sessions.lock().await.len()
    }

    async fn process(&self, slot: &mut Option<ChatContext>, chat_id: i64, input: Input<'_>) -> Result<(), Failure> {
        let ctx = match slot.take() {
            Some(ctx) => slot.insert(ctx),
            None => match self.database.get_user(chat_id) {
                Ok(user) => slot.insert(ChatContext::new(chat_id, user)),
                Err(e) => match input {
                    // These replies do not depend on who the user is.
                    Input::Command(cmd @ (Command::Sobre | Command::Tcc | Command::Status)) => {
                        warn!("Chat {}: no user record for /{:?}: {}", chat_id, cmd, e);
                        return self.on_command(&mut ChatContext::new(chat_id, None), cmd).await;
                    }
                    _ => return Err(e.into()),
                },
            },
        };

        match input {
            Input::Command(cmd) => self.on_command(ctx, cmd).await,
            Input::Text(text) => self.on_text(ctx, text).await,
            Input::OtherBot => Ok(()),
        }
    }

    async fn on_command(&self, ctx: &mut ChatContext, cmd: Command) -> Result<(), Failure> {
        let chat_id = ctx.chat_id;
        info!("⚙️ Chat {}: /{:?}", chat_id, cmd);

        match cmd {
            Command::Start => {
                self.reply(chat_id, Reply::html(texts::WELCOME)).await;
                if let Some(user) = ctx.user() {
                    let greeting = texts::greeting(&user.name);
                    self.reply(chat_id, Reply::plain(greeting)).await;
                } else {
                    ctx.begin();
                    self.reply(chat_id, Reply::plain(texts::ASK_NAME)).await;
                }
            }
            Command::Sobre => {
                self.reply(chat_id, Reply::html(texts::ABOUT)).await;
                self.repeat_prompt(ctx).await;
            }
            Command::Tcc => {
                self.reply(chat_id, Reply::html(texts::TCC_INFO)).await;
                self.repeat_prompt(ctx).await;
            }
            Command::Status => {
                let status = match self
                    .database
                    .ping()
                    .and_then(|_| self.database.count_interactions(chat_id))
                {
                    Ok(answered) => texts::status_ok(answered),
                    Err(e) => {
                        error!("Status check failed: {e}");
                        texts::STATUS_DB_DOWN.to_string()
                    }
                };
                self.reply(chat_id, Reply::plain(status)).await;
                self.repeat_prompt(ctx).await;
            }
            Command::Reset => {
                self.database.reset_user(chat_id)?;
                ctx.begin();
                self.reply(chat_id, Reply::plain(texts::RESET_DONE)).await;
                self.reply(chat_id, Reply::plain(texts::ASK_NAME)).await;
            }
            Command::Cancel => {
                let text = if ctx.cancel() { texts::CANCELLED } else { texts::NOTHING_TO_CANCEL };
                self.reply(chat_id, Reply::plain(text)).await;
            }
        }

        Ok(())
    }

    async fn on_text(&self, ctx: &mut ChatContext, text: &str) -> Result<(), Failure> {
        let chat_id = ctx.chat_id;

        match ctx.submit(text) {
            Some(Submission::NameAccepted(name)) => {
                self.reply(chat_id, Reply::plain(texts::ask_academic_id(&name))).await;
            }
            Some(Submission::ReadyToCommit { name, academic_id }) => {
                let user = self.database.upsert_user(chat_id, &name, &academic_id)?;
                let greeting = texts::greeting(&user.name);
                ctx.complete(user);
                self.reply(chat_id, Reply::plain(texts::REGISTERED)).await;
                self.reply(chat_id, Reply::plain(greeting)).await;
            }
            Some(Submission::Invalid(e)) => return Err(e.into()),
            None if ctx.user().is_some() => self.answer(chat_id, text.trim()).await?,
            None => {
                // Unregistered: start the flow, the text itself is not a name.
                ctx.begin();
                self.reply(chat_id, Reply::plain(texts::START_REGISTRATION)).await;
                self.reply(chat_id, Reply::plain(texts::ASK_NAME)).await;
            }
        }

        Ok(())
    }

    /// Forward a question to the AI and relay the answer verbatim.
    async fn answer(&self, chat_id: i64, question: &str) -> Result<(), Failure> {
        self.reply(chat_id, Reply::plain(texts::THINKING)).await;
        self.outbox.typing(chat_id).await;

        let answer = self.ai.ask(question).await?;

        if let Err(e) = self.database.append_interaction(chat_id, question, &answer) {
            warn!("Failed to log interaction for chat {}: {}", chat_id, e);
        }

        self.reply(chat_id, Reply::plain(answer)).await;
        self.reply(chat_id, Reply::plain(texts::FOLLOW_UP)).await;
        Ok(())
    }

    async fn repeat_prompt(&self, ctx: &ChatContext) {
        if let Some(prompt) = ctx.pending_prompt() {
            self.reply(ctx.chat_id, Reply::plain(prompt)).await;
        }
    }

    async fn reply(&self, chat_id: i64, reply: Reply) {
        if let Err(e) = self.outbox.send(chat_id, reply).await {
            warn!("Reply to chat {} dropped: {}", chat_id, e);
        }
    }
}
