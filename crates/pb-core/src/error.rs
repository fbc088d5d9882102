//! Error taxonomy shared across the engine.

use serde::{Deserialize, Serialize};

/// The kind of entity a lookup failed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Group,
    Player,
    GroupPlayer,
    Event,
    Game,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EntityKind::Group => "group",
            EntityKind::Player => "player",
            EntityKind::GroupPlayer => "group player",
            EntityKind::Event => "event",
            EntityKind::Game => "game",
        };
        f.write_str(name)
    }
}

/// Errors surfaced by the engine.
///
/// Validation and state errors surface to the caller unchanged.
/// `UnsatisfiableConstraints` carries enough context for the caller to
/// suggest enabling relaxation or changing participants. `ConflictingWrite`
/// is never retried inside the engine. `Internal` aborts the surrounding
/// write; no partial state persists.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EngineError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error(
        "unsatisfiable constraints: round {round_index} could not be completed at elo diff {elo_diff_used}"
    )]
    UnsatisfiableConstraints { round_index: u32, elo_diff_used: f64 },

    #[error("conflicting write, retry may succeed")]
    ConflictingWrite,

    #[error("internal error: {0}")]
    Internal(String),
}

impl EngineError {
    /// Convenience constructor for lookup failures.
    pub fn not_found(kind: EntityKind, id: impl ToString) -> Self {
        EngineError::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = EngineError::not_found(EntityKind::Event, "abc");
        assert_eq!(err.to_string(), "event not found: abc");

        let err = EngineError::UnsatisfiableConstraints {
            round_index: 2,
            elo_diff_used: 0.25,
        };
        assert!(err.to_string().contains("round 2"));
        assert!(err.to_string().contains("0.25"));
    }
}
