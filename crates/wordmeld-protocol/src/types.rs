//! Core wire types for the Wordmeld protocol.
//!
//! Everything a client and server exchange is defined here: identifier
//! newtypes, the closed set of client intents, the closed set of server
//! events, and the snapshot/result records they carry. The tags and field
//! names are part of the wire contract — client SDKs match on the exact
//! JSON shapes, so every serde attribute in this file is load-bearing.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a player.
///
/// Derived from the connection identity — a player IS its connection for
/// the lifetime of a session. Serialized as a plain number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// Maximum length of a room code as entered by a user.
pub const MAX_ROOM_CODE_LEN: usize = 8;

/// A short, human-enterable room identifier.
///
/// Codes are case-insensitive alphanumeric tokens of at most
/// [`MAX_ROOM_CODE_LEN`] characters, stored and displayed uppercase.
/// [`RoomCode::parse`] normalizes whatever the user typed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    /// Parses and normalizes a user-entered code: trims surrounding
    /// whitespace, rejects anything empty, over-long, or non-alphanumeric,
    /// and uppercases the rest.
    pub fn parse(value: &str) -> Result<Self, ProtocolError> {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.len() > MAX_ROOM_CODE_LEN {
            return Err(ProtocolError::InvalidRoomCode(value.to_string()));
        }
        if !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ProtocolError::InvalidRoomCode(value.to_string()));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    /// Returns the normalized (uppercase) code.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for RoomCode {
    type Err = ProtocolError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

// ---------------------------------------------------------------------------
// Room state as seen by clients
// ---------------------------------------------------------------------------

/// A player as it appears in state snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub nickname: String,
    pub is_host: bool,
    pub connected: bool,
}

/// The lifecycle phase of a game room.
///
/// Strictly linear — there is no way back to `Waiting`:
///
/// ```text
/// Waiting → Playing → Finished
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GamePhase {
    /// Room exists and accepts joins; the game has not started.
    Waiting,
    /// Rounds are running. No new players.
    Playing,
    /// Someone won. Terminal.
    Finished,
}

impl GamePhase {
    /// Returns `true` if the room is accepting new players.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::Waiting)
    }

    /// Returns `true` if the game has ended.
    pub fn is_over(&self) -> bool {
        matches!(self, Self::Finished)
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => write!(f, "waiting"),
            Self::Playing => write!(f, "playing"),
            Self::Finished => write!(f, "finished"),
        }
    }
}

/// One player's score line, ordered like the seat list (join order).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerScore {
    pub player_id: PlayerId,
    pub score: u32,
}

/// A read-only projection of a room, broadcast as `game-state`.
///
/// This is a deep copy — it never aliases live room state and carries no
/// timer handles. `time_left` is the remaining round budget in seconds
/// (0 when no round is running). `scores` lists exactly the players in
/// `players`, in the same order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    pub id: RoomCode,
    pub host_id: PlayerId,
    pub players: Vec<Player>,
    #[serde(rename = "gameState")]
    pub state: GamePhase,
    pub current_round: u32,
    pub scores: Vec<PlayerScore>,
    pub time_left: u64,
}

impl RoomSnapshot {
    /// Convenience lookup into the score list.
    pub fn score_of(&self, player: PlayerId) -> Option<u32> {
        self.scores
            .iter()
            .find(|entry| entry.player_id == player)
            .map(|entry| entry.score)
    }
}

// ---------------------------------------------------------------------------
// Round and game results
// ---------------------------------------------------------------------------

/// A group of 2+ players who converged on the same word in one round.
///
/// `players` is ordered by submission time; `points` is what each member
/// of the group is credited (not a pool to divide).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordMatch {
    pub word: String,
    pub players: Vec<PlayerId>,
    pub points: u32,
}

/// One revealed submission, in first-submission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub player_id: PlayerId,
    pub word: String,
}

/// The immutable record of one completed round.
///
/// `scores` is the standing BEFORE this round's points were credited;
/// the `matches` entries carry the deltas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundResult {
    pub round: u32,
    pub submissions: Vec<Submission>,
    pub matches: Vec<WordMatch>,
    pub scores: Vec<PlayerScore>,
}

impl RoundResult {
    /// The word `player` had in when the round closed, if any.
    pub fn submission_of(&self, player: PlayerId) -> Option<&str> {
        self.submissions
            .iter()
            .find(|entry| entry.player_id == player)
            .map(|entry| entry.word.as_str())
    }

    /// Convenience lookup into the (pre-credit) score list.
    pub fn score_of(&self, player: PlayerId) -> Option<u32> {
        self.scores
            .iter()
            .find(|entry| entry.player_id == player)
            .map(|entry| entry.score)
    }
}

/// One row of the final scoreboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreEntry {
    pub player_id: PlayerId,
    pub nickname: String,
    pub score: u32,
}

/// Built once, when the game ends. Scores are sorted descending; ties
/// keep join order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalResult {
    pub final_scores: Vec<ScoreEntry>,
    pub round_results: Vec<RoundResult>,
}

// ---------------------------------------------------------------------------
// Client intents
// ---------------------------------------------------------------------------

/// Everything a client can ask the server to do.
///
/// Internally tagged with kebab-case tags, so `StartGame` travels as
/// `{"type": "start-game"}`. `room_id` in `JoinRoom` is the raw string the
/// user typed — the server normalizes it, not the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ClientIntent {
    /// Create a room and become its host.
    CreateRoom { nickname: String },
    /// Join an existing room by code.
    JoinRoom { room_id: String, nickname: String },
    /// Start the game. Host only.
    StartGame,
    /// Submit (or overwrite) this round's word.
    SubmitWord { word: String },
    /// Leave the current room.
    LeaveRoom,
}

// ---------------------------------------------------------------------------
// Server events
// ---------------------------------------------------------------------------

/// Everything the server can tell a client.
///
/// Same tagging scheme as [`ClientIntent`]. Snapshot-carrying variants are
/// newtypes so the record's fields inline next to the tag, e.g.
/// `{"type": "round-ended", "round": 2, ...}`.
///
/// `Error` is only ever delivered to the connection that caused it; all
/// other events may be broadcast room-wide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    /// Ack to the creator: the room exists and they are in it.
    RoomCreated { room_id: RoomCode },
    /// Ack to a joiner.
    RoomJoined { room_id: RoomCode },
    /// Full state snapshot, broadcast after any membership or state change.
    GameState(RoomSnapshot),
    /// The host started the game.
    GameStarted,
    /// A round is open for submissions. `time_left` is the round budget
    /// in seconds.
    RoundStarted { round: u32, time_left: u64 },
    /// Someone locked in a word (the word itself stays hidden).
    WordSubmitted { player_id: PlayerId, nickname: String },
    /// The round is over; here is what everyone wrote and who matched.
    RoundEnded(RoundResult),
    /// One tick of the inter-round countdown, down to 0.
    NextRoundCountdown { countdown: u8 },
    /// The game is over.
    GameEnded(FinalResult),
    /// Advisory failure, caller-only. Never broadcast.
    Error { message: String },
}

// =========================================================================
// Tests
// =========================================================================
