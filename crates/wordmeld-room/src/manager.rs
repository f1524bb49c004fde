//! Room and player registries: creates rooms, routes intents, tears
//! down empty rooms.
//!
//! This is the entry point for room operations from the connection layer,
//! and the only structure shared across rooms — everything behind it is
//! actor-owned. Callers serialize access at a higher level (the server
//! holds the manager behind a mutex).

use std::collections::HashMap;

use wordmeld_protocol::{PlayerId, RoomCode, RoomSnapshot};

use crate::code::random_code;
use crate::room::{JoinAck, LeaveOutcome, PlayerSender, RoomHandle, spawn_room};
use crate::{GameConfig, RoomError};

/// Default command channel size for room actors.
const DEFAULT_CHANNEL_SIZE: usize = 64;

/// Where a player currently is. One room per player at a time.
struct Registration {
    room: RoomCode,
    nickname: String,
}

/// Tracks every live room and which player is in which.
pub struct RoomManager {
    /// Active rooms, keyed by code.
    rooms: HashMap<RoomCode, RoomHandle>,

    /// The player registry: connection identity → room + nickname.
    players: HashMap<PlayerId, Registration>,

    config: GameConfig,
}

impl RoomManager {
    /// Creates an empty manager. Every room it spawns uses `config`.
    pub fn new(config: GameConfig) -> Self {
        Self {
            rooms: HashMap::new(),
            players: HashMap::new(),
            config,
        }
    }

    /// Creates a room with a fresh code and seats `host` in it.
    pub async fn create_room(
        &mut self,
        host: PlayerId,
        nickname: &str,
        sender: PlayerSender,
    ) -> Result<RoomCode, RoomError> {
        self.ensure_unregistered(host)?;

        let code = self.unused_code();
        let handle = spawn_room(code.clone(), host, self.config.clone(), DEFAULT_CHANNEL_SIZE);
        handle.join(host, nickname, sender, JoinAck::Created).await?;

        self.rooms.insert(code.clone(), handle);
        self.players.insert(
            host,
            Registration {
                room: code.clone(),
                nickname: nickname.to_string(),
            },
        );
        tracing::info!(room = %code, %host, "room created");
        Ok(code)
    }

    /// Seats `player` in the room the user asked for. `code` is whatever
    /// they typed — it is normalized here, and an unknown or unparsable
    /// code is simply "not found".
    pub async fn join_room(
        &mut self,
        player: PlayerId,
        code: &str,
        nickname: &str,
        sender: PlayerSender,
    ) -> Result<RoomCode, RoomError> {
        self.ensure_unregistered(player)?;

        let code = RoomCode::parse(code)
            .map_err(|_| RoomError::NotFound(code.trim().to_ascii_uppercase()))?;
        let handle = self
            .rooms
            .get(&code)
            .ok_or_else(|| RoomError::NotFound(code.to_string()))?
            .clone();

        handle.join(player, nickname, sender, JoinAck::Joined).await?;
        self.players.insert(
            player,
            Registration {
                room: code.clone(),
                nickname: nickname.to_string(),
            },
        );
        Ok(code)
    }

    /// Removes a player from their room (disconnect or explicit leave).
    /// Tears the room down if they were the last one out. A player that
    /// was never registered is a no-op.
    pub async fn leave(&mut self, player: PlayerId) -> Option<RoomCode> {
        let registration = self.players.remove(&player)?;

        if let Some(handle) = self.rooms.get(&registration.room).cloned() {
            match handle.leave(player).await {
                Ok(LeaveOutcome { room_empty: true, .. }) => {
                    self.remove_room(&registration.room).await;
                }
                Ok(_) => {}
                // Actor already gone; nothing left to clean up there.
                Err(_) => {
                    self.rooms.remove(&registration.room);
                }
            }
        }

        Some(registration.room)
    }

    /// Routes a start-game intent to the caller's room.
    pub async fn start_game(&self, player: PlayerId) -> Result<(), RoomError> {
        self.handle_for(player)?.start_game(player).await
    }

    /// Routes a word submission to the caller's room.
    pub async fn submit_word(&self, player: PlayerId, word: &str) -> Result<(), RoomError> {
        self.handle_for(player)?.submit_word(player, word).await
    }

    /// Snapshot of one room.
    pub async fn room_snapshot(&self, code: &RoomCode) -> Result<RoomSnapshot, RoomError> {
        let handle = self
            .rooms
            .get(code)
            .ok_or_else(|| RoomError::NotFound(code.to_string()))?;
        handle.snapshot().await
    }

    /// The room a player is currently registered in, if any.
    pub fn player_room(&self, player: PlayerId) -> Option<&RoomCode> {
        self.players.get(&player).map(|r| &r.room)
    }

    /// The nickname a player registered with, if any.
    pub fn player_nickname(&self, player: PlayerId) -> Option<&str> {
        self.players.get(&player).map(|r| r.nickname.as_str())
    }

    /// Number of live rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// The room handle for the player's current room, or an error if they
    /// are not in one (or the room's actor is already gone).
    fn handle_for(&self, player: PlayerId) -> Result<&RoomHandle, RoomError> {
        let code = self
            .players
            .get(&player)
            .map(|r| &r.room)
            .ok_or_else(|| RoomError::InvalidState(format!("player {player} is not in a room")))?;
        self.rooms
            .get(code)
            .ok_or_else(|| RoomError::Unavailable(code.clone()))
    }

    fn ensure_unregistered(&self, player: PlayerId) -> Result<(), RoomError> {
        match self.players.get(&player) {
            Some(existing) => Err(RoomError::InvalidState(format!(
                "player {player} is already in room {}",
                existing.room
            ))),
            None => Ok(()),
        }
    }

    /// Draws codes until one misses every live room. Collisions are rare
    /// (36^6 space) but the contract is uniqueness, not luck.
    fn unused_code(&self) -> RoomCode {
        let mut rng = rand::rng();
        loop {
            let code = random_code(&mut rng);
            if !self.rooms.contains_key(&code) {
                return code;
            }
        }
    }

    async fn remove_room(&mut self, code: &RoomCode) {
        if let Some(handle) = self.rooms.remove(code) {
            let _ = handle.shutdown().await;
            tracing::info!(room = %code, "room removed");
        }
    }
}
