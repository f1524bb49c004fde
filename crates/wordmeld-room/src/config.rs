//! Room configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings for a game room.
///
/// Defaults match the production game: rooms of 2–6 players, 30-second
/// rounds, and a 5..0 countdown at one tick per second between rounds.
/// The durations exist as configuration so tests (and private lobbies)
/// can run faster clocks; the game rules do not depend on their values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Minimum players required to start the game.
    pub min_players: usize,

    /// Maximum players allowed in the room.
    pub max_players: usize,

    /// How long a round accepts submissions before it times out.
    pub round_duration: Duration,

    /// First value of the inter-round countdown (ticks down to 0).
    pub countdown_start: u8,

    /// Delay between countdown ticks.
    pub countdown_interval: Duration,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            min_players: 2,
            max_players: 6,
            round_duration: Duration::from_secs(30),
            countdown_start: 5,
            countdown_interval: Duration::from_secs(1),
        }
    }
}
