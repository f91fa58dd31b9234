pub mod adapter;
pub mod commands;
pub mod embed;
pub mod error;
pub mod handler;
pub mod send;

pub use adapter::DiscordAdapter;
pub use error::DiscordError;
