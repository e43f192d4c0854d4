//! The chat session: conversation, draft and request phase in one record.
//!
//! A submission is a two-step transition. [`ChatSession::begin`] records the
//! user's message and enters [`Phase::Awaiting`]; [`ChatSession::settle`]
//! applies the agent's outcome and returns to [`Phase::Idle`]. Front ends that
//! can hold the session across an await use [`ChatSession::submit`] instead.

use tracing::warn;

use crate::agent::{Agent, OutboundMessage, Reply};
use crate::error::DeliveryError;
use crate::message::Message;

/// Shown in place of the agent's answer whenever delivery fails.
pub const FAILURE_TEXT: &str = "Sorry, something went wrong.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Awaiting,
}

#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    conversation: Vec<Message>,
    draft: String,
    phase: Phase,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn conversation(&self) -> &[Message] {
        &self.conversation
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut String {
        &mut self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_busy(&self) -> bool {
        self.phase == Phase::Awaiting
    }

    /// Record the user's message and mark the session busy.
    ///
    /// Returns the body to post to the agent, or `None` (and changes nothing)
    /// when `input` is blank. Does not check the phase: callers keep the
    /// submit affordance disabled while busy.
    pub fn begin(&mut self, input: &str) -> Option<OutboundMessage> {
        if input.trim().is_empty() {
            return None;
        }

        self.conversation.push(Message::user(input));
        self.phase = Phase::Awaiting;
        Some(OutboundMessage::new(input))
    }

    /// Apply the outcome of the outstanding request.
    ///
    /// Replies are appended in order; a failure appends the single
    /// [`FAILURE_TEXT`] message. Either way the draft is cleared and the
    /// session goes back to idle.
    pub fn settle(&mut self, outcome: Result<Vec<Reply>, DeliveryError>) {
        match outcome {
            Ok(replies) => {
                self.conversation
                    .extend(replies.into_iter().map(|reply| Message::agent(reply.text)));
            }
            Err(err) => {
                warn!(error = %err, "message delivery failed");
                self.conversation.push(Message::agent(FAILURE_TEXT));
            }
        }

        self.draft.clear();
        self.phase = Phase::Idle;
    }

    /// Run one full exchange with `agent`: begin, deliver, settle.
    pub async fn submit<A: Agent>(&mut self, agent: &A, input: &str) {
        let Some(outbound) = self.begin(input) else {
            return;
        };
        let outcome = agent.deliver(&outbound).await;
        self.settle(outcome);
    }

    /// Submit whatever is currently in the draft.
    pub async fn submit_draft<A: Agent>(&mut self, agent: &A) {
        let input = self.draft.clone();
        self.submit(agent, &input).await;
    }
}
