//! UI-agnostic conversation types
//!
//! These are shared by every front end (the terminal UI and the one-shot CLI)
//! and don't depend on any specific UI framework.

use serde::{Deserialize, Serialize};

/// One turn in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    sender: Sender,
    text: String,
}

/// Who produced a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Agent,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
        }
    }

    pub fn agent(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Agent,
            text: text.into(),
        }
    }

    pub fn sender(&self) -> Sender {
        self.sender
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Sender {
    pub fn display_name(&self) -> &'static str {
        match self {
            Sender::User => "You",
            Sender::Agent => "Bot",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_tag_sender() {
        assert_eq!(Message::user("hi").sender(), Sender::User);
        assert_eq!(Message::agent("hello").sender(), Sender::Agent);
    }

    #[test]
    fn test_user_text_is_kept_verbatim() {
        let msg = Message::user("  padded  ");
        assert_eq!(msg.text(), "  padded  ");
    }

    #[test]
    fn test_sender_serializes_lowercase() {
        let json = serde_json::to_string(&Message::agent("ok")).unwrap();
        assert_eq!(json, r#"{"sender":"agent","text":"ok"}"#);
    }
}
