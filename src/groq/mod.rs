pub mod client;
pub mod error;
pub mod types;

pub use client::{ChatSender, GroqClient};
pub use error::GroqError;
pub use types::{ChatRequest, Message};
