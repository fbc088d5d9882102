//! CLI error types.

/// CLI errors.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("group not found: {0}")]
    GroupNotFound(String),

    #[error("player not found in group: {0}")]
    PlayerNotFound(String),

    #[error("no game at round {round}, court {court}")]
    GameNotFound { round: u32, court: u32 },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Engine(#[from] pb_core::EngineError),
}

pub type Result<T> = std::result::Result<T, CliError>;
