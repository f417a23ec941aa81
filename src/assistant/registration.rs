//! Per-chat registration state machine.
//!
//! `Unregistered -> AwaitingName -> AwaitingId -> Registered`. The draft name
//! lives inside `AwaitingId` until the academic ID is accepted and the engine
//! has committed the user to the database.

use crate::assistant::database::User;
use crate::assistant::texts;
use crate::assistant::validation::{InvalidFormat, validate_academic_id, validate_name};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationState {
    /// No stored user and no flow started yet.
    Unregistered,
    AwaitingName,
    AwaitingId { name: String },
    Registered(User),
}

/// Outcome of feeding free text to a chat that is mid-registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    NameAccepted(String),
    /// Both fields are valid; the caller must persist them and then call
    /// [`ChatContext::complete`].
    ReadyToCommit { name: String, academic_id: String },
    Invalid(InvalidFormat),
}

/// Everything the engine keeps about one chat between messages.
#[derive(Debug, Clone)]
pub struct ChatContext {
    pub chat_id: i64,
    pub state: RegistrationState,
}

impl ChatContext {
    pub fn new(chat_id: i64, user: Option<User>) -> Self {
        let state = match user {
            Some(user) => RegistrationState::Registered(user),
            None => RegistrationState::Unregistered,
        };
        Self { chat_id, state }
    }

    pub fn is_registering(&self) -> bool {
        matches!(self.state, RegistrationState::AwaitingName | RegistrationState::AwaitingId { .. })
    }

    pub fn user(&self) -> Option<&User> {
        match &self.state {
            RegistrationState::Registered(user) => Some(user),
            _ => None,
        }
    }

    /// (Re)start registration from the name prompt, dropping any draft.
    pub fn begin(&mut self) {
        self.state = RegistrationState::AwaitingName;
    }

    /// Abort an in-progress registration. Returns false if there was none.
    pub fn cancel(&mut self) -> bool {
        if self.is_registering() {
            self.state = RegistrationState::Unregistered;
            true
        } else {
            false
        }
    }

    /// Validate `text` against whatever field the chat is waiting for.
    ///
    /// Returns `None` when the chat is not registering.
    pub fn submit(&mut self, text: &str) -> Option<Submission> {
        match &self.state {
            RegistrationState::AwaitingName => Some(match validate_name(text) {
                Ok(name) => {
                    self.state = RegistrationState::AwaitingId { name: name.clone() };
                    Submission::NameAccepted(name)
                }
                Err(e) => Submission::Invalid(e),
            }),
            RegistrationState::AwaitingId { name } => Some(match validate_academic_id(text) {
                Ok(academic_id) => Submission::ReadyToCommit { name: name.clone(), academic_id },
                Err(e) => Submission::Invalid(e),
            }),
            RegistrationState::Unregistered | RegistrationState::Registered(_) => None,
        }
    }

    /// Mark the chat registered once the user row is stored.
    pub fn complete(&mut self, user: User) {
        self.state = RegistrationState::Registered(user);
    }

    /// The question the chat still has to answer, if any.
    pub fn pending_prompt(&self) -> Option<String> {
        match &self.state {
            RegistrationState::AwaitingName => Some(texts::ASK_NAME.to_string()),
            RegistrationState::AwaitingId { name } => Some(texts::ask_academic_id(name)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::validation::Field;

    fn user(name: &str, id: &str) -> User {
        User {
            chat_id: 1,
            name: name.to_string(),
            academic_id: id.to_string(),
            registered_at: "2025-06-01 10:00:00".to_string(),
        }
    }

    #[test]
    fn test_initial_state_follows_store() {
        assert_eq!(ChatContext::new(1, None).state, RegistrationState::Unregistered);
        let ctx = ChatContext::new(1, Some(user("Maria", "RA12345")));
        assert_eq!(ctx.user().map(|u| u.name.as_str()), Some("Maria"));
    }

    #[test]
    fn test_full_walk() {
        let mut ctx = ChatContext::new(1, None);
        ctx.begin();
        assert_eq!(ctx.submit("Maria"), Some(Submission::NameAccepted("Maria".to_string())));
        assert_eq!(ctx.state, RegistrationState::AwaitingId { name: "Maria".to_string() });

        let ready = ctx.submit("RA12345");
        assert_eq!(
            ready,
            Some(Submission::ReadyToCommit { name: "Maria".to_string(), academic_id: "RA12345".to_string() })
        );
        // Still waiting until the commit happens.
        assert!(ctx.is_registering());

        ctx.complete(user("Maria", "RA12345"));
        assert!(!ctx.is_registering());
        assert_eq!(ctx.submit("qualquer coisa"), None);
    }

    #[test]
    fn test_invalid_name_keeps_state() {
        let mut ctx = ChatContext::new(1, None);
        ctx.begin();
        match ctx.submit("") {
            Some(Submission::Invalid(e)) => assert_eq!(e.field, Field::Name),
            other => panic!("expected invalid name, got {other:?}"),
        }
        assert_eq!(ctx.state, RegistrationState::AwaitingName);
    }

    #[test]
    fn test_invalid_id_keeps_draft() {
        let mut ctx = ChatContext::new(1, None);
        ctx.begin();
        ctx.submit("Maria");
        assert!(matches!(ctx.submit("12"), Some(Submission::Invalid(_))));
        assert_eq!(ctx.state, RegistrationState::AwaitingId { name: "Maria".to_string() });
    }

    #[test]
    fn test_unregistered_does_not_consume_text() {
        let mut ctx = ChatContext::new(1, None);
        assert_eq!(ctx.submit("Maria"), None);
        assert_eq!(ctx.state, RegistrationState::Unregistered);
    }

    #[test]
    fn test_cancel_and_begin() {
        let mut ctx = ChatContext::new(1, None);
        assert!(!ctx.cancel());
        ctx.begin();
        ctx.submit("Maria");
        assert!(ctx.cancel());
        assert_eq!(ctx.state, RegistrationState::Unregistered);

        let mut registered = ChatContext::new(1, Some(user("Ana", "1234")));
        assert!(!registered.cancel());
        registered.begin();
        assert_eq!(registered.state, RegistrationState::AwaitingName);
    }

    #[test]
    fn test_pending_prompt() {
        let mut ctx = ChatContext::new(1, None);
        assert_eq!(ctx.pending_prompt(), None);
        ctx.begin();
        assert_eq!(ctx.pending_prompt().as_deref(), Some(texts::ASK_NAME));
        ctx.submit("Maria");
        assert!(ctx.pending_prompt().unwrap().contains("Maria"));
    }
}
