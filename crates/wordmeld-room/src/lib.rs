//! Room lifecycle, round orchestration, and scoring for Wordmeld.
//!
//! Each room runs as an isolated Tokio task (actor model) owning its own
//! players, scores, submissions, and round clock. All mutations of a room
//! flow through its command channel, so everything that can touch a round
//! boundary — submissions, departures, timer expiry, countdown ticks — is
//! serialized against everything else.
//!
//! # Key types
//!
//! - [`GameRoom`] — the synchronous room/round state machine
//! - [`score_round`] — the pure matching-and-scoring engine
//! - [`RoomHandle`] — send commands to a running room actor
//! - [`RoomManager`] — room registry + player registry
//! - [`GameConfig`] — round/countdown durations, player limits
//! - [`RoomError`] — everything that can be refused

mod code;
mod config;
mod error;
mod game;
mod manager;
mod room;
mod score;

pub use config::GameConfig;
pub use error::RoomError;
pub use game::{GameRoom, RemoveOutcome, RoundOutcome, SubmitStatus};
pub use manager::RoomManager;
pub use room::{JoinAck, LeaveOutcome, PlayerSender, RoomHandle};
pub use score::{RoundScore, normalize, score_round};
