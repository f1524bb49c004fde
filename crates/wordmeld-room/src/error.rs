//! Error types for the room layer.
//!
//! Every variant is user-correctable or a no-op guard — failures here are
//! reported to the caller's connection only and never alter room state.

use wordmeld_protocol::{PlayerId, RoomCode};

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// No room with this code. Carries the raw code as requested, so the
    /// message echoes what the user typed.
    #[error("room {0} not found")]
    NotFound(String),

    /// The room has no player slots left.
    #[error("room {0} is full")]
    RoomFull(RoomCode),

    /// The room's game already started; no new players.
    #[error("game already in progress in room {0}")]
    GameInProgress(RoomCode),

    /// A host-only action attempted by a non-host.
    #[error("only the host can start the game")]
    NotHost(PlayerId),

    /// The room is in a state that doesn't allow this operation.
    #[error("invalid state for this operation: {0}")]
    InvalidState(String),

    /// The room's command channel is gone (room shutting down).
    #[error("room {0} is unavailable")]
    Unavailable(RoomCode),
}
