//! Wire protocol for Wordmeld.
//!
//! This crate defines the language clients and the server speak:
//!
//! - **Types** ([`ClientIntent`], [`ServerEvent`], [`RoomSnapshot`], ids) —
//!   the closed set of messages and the records they carry.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those messages are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong doing either.
//!
//! The protocol layer sits between transport (raw frames) and the room
//! layer (game semantics). It knows nothing about connections, timers, or
//! scoring — only shapes.

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    ClientIntent, FinalResult, GamePhase, MAX_ROOM_CODE_LEN, Player, PlayerId, PlayerScore,
    RoomCode, RoomSnapshot, RoundResult, ScoreEntry, ServerEvent, Submission, WordMatch,
};
