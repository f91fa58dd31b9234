pub mod config;
pub mod error;

pub use config::GoblinConfig;
pub use error::GoblinError;
