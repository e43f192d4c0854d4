pub mod agent;
pub mod config;
pub mod error;
pub mod message;
pub mod session;

// Re-export main types for convenience
pub use agent::{Agent, OutboundMessage, RasaClient, Reply, DEFAULT_ENDPOINT};
pub use config::Config;
pub use error::DeliveryError;
pub use message::{Message, Sender};
pub use session::{ChatSession, Phase, FAILURE_TEXT};
