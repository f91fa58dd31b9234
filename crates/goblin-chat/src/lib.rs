//! Conversational backend access: the [`ChatClient`] boundary, the ChatGPT
//! relay implementation, and the ask orchestration built on top of them.

pub mod ask;
pub mod chatgpt;
pub mod client;

pub use ask::{AskError, Asker};
pub use chatgpt::ChatGptClient;
pub use client::{ChatClient, ChatCursor, ChatError, ChatReply};
