use reqwest::StatusCode;
use thiserror::Error;

/// Why a message could not be delivered to the agent.
///
/// Every variant is shown to the user the same way, as a single generic agent
/// message. The detail only goes to the log.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("request to agent failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("agent responded with status {0}")]
    Status(StatusCode),

    #[error("agent response was not a list of replies: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("request task ended before the agent answered: {0}")]
    Aborted(String),
}
