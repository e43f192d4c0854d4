//! The remote conversational agent and the webhook client that reaches it.

pub mod rasa;

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::DeliveryError;

pub use rasa::{RasaClient, DEFAULT_ENDPOINT};

/// Sender id attached to every outbound message.
pub const USER_SENDER_ID: &str = "user";

/// Request body posted to the agent webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundMessage {
    pub sender: String,
    pub message: String,
}

impl OutboundMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            sender: USER_SENDER_ID.to_string(),
            message: message.into(),
        }
    }
}

/// One element of the agent's reply list. Other fields the agent sends
/// (`recipient_id`, `buttons`, ...) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub text: String,
}

impl Reply {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Something that can answer a user message with zero or more replies.
pub trait Agent {
    fn deliver(
        &self,
        message: &OutboundMessage,
    ) -> impl Future<Output = Result<Vec<Reply>, DeliveryError>> + Send;
}
