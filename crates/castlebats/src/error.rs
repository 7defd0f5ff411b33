//! Session errors

use castle_engine::core::config::ConfigError;

/// Errors that stop a session from starting
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// Configuration could not be loaded or is invalid
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Level description is unusable
    #[error("level '{name}': {reason}")]
    Level {
        /// Level name
        name: String,
        /// What is wrong with it
        reason: String,
    },
}
