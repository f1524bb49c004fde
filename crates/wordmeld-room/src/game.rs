//! The per-room game state machine.
//!
//! `GameRoom` is fully synchronous — no channels, no clocks — so the
//! whole state machine is unit-testable without a runtime. The room actor
//! drives it and owns the timing; this type owns the rules.
//!
//! Invariants kept here:
//! - a player's score exists exactly as long as the player does (scores
//!   live on the seat, so the score set IS the player set);
//! - submissions are a subset of the players, at most one per player;
//! - seats keep join order, which is what host succession and final-score
//!   tie-breaking are defined over;
//! - the phase only ever moves `Waiting → Playing → Finished`.

use std::time::Duration;

use wordmeld_protocol::{
    FinalResult, GamePhase, Player, PlayerId, PlayerScore, RoomCode, RoomSnapshot, RoundResult,
    ScoreEntry, Submission,
};

use crate::score::{self, RoundScore};
use crate::{GameConfig, RoomError};

/// A player plus the room-local state attached to them.
#[derive(Debug, Clone)]
struct Seat {
    player: Player,
    score: u32,
}

/// What `remove_player` had to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoveOutcome {
    /// `false` if the id wasn't in the room (the removal was a no-op).
    pub was_member: bool,
    /// Set when the departing player was host and the role moved on.
    pub new_host: Option<PlayerId>,
    /// The room is now empty and eligible for teardown.
    pub room_empty: bool,
}

/// Result of accepting a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitStatus {
    /// Every present player has now submitted — the round can end early.
    pub all_submitted: bool,
}

/// Result of ending a round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundOutcome {
    pub result: RoundResult,
    /// The win condition held: transition to `Finished`.
    pub won: bool,
}

/// One room's players, scores, submissions, and phase.
pub struct GameRoom {
    code: RoomCode,
    host_id: PlayerId,
    phase: GamePhase,
    current_round: u32,
    seats: Vec<Seat>,
    /// This round's submissions in first-submission order. Resubmitting
    /// overwrites in place, keeping the original slot.
    submissions: Vec<(PlayerId, String)>,
    round_results: Vec<RoundResult>,
    /// A round is actively accepting words. False between rounds (during
    /// the countdown) so nothing can straddle a round boundary.
    accepting: bool,
    config: GameConfig,
}

impl GameRoom {
    /// Creates an empty room in the `Waiting` phase. `host_id` names the
    /// creator; they become host when they take the first seat.
    pub fn new(code: RoomCode, host_id: PlayerId, config: GameConfig) -> Self {
        Self {
            code,
            host_id,
            phase: GamePhase::Waiting,
            current_round: 0,
            seats: Vec::new(),
            submissions: Vec::new(),
            round_results: Vec::new(),
            accepting: false,
            config,
        }
    }

    // -----------------------------------------------------------------
    // Membership
    // -----------------------------------------------------------------

    /// Seats a new player. Only valid while waiting and below capacity.
    pub fn add_player(&mut self, id: PlayerId, nickname: &str) -> Result<(), RoomError> {
        if !self.phase.is_joinable() {
            return Err(RoomError::GameInProgress(self.code.clone()));
        }
        if self.seats.len() >= self.config.max_players {
            return Err(RoomError::RoomFull(self.code.clone()));
        }
        if self.contains(id) {
            return Err(RoomError::InvalidState(format!(
                "player {id} is already in room {}",
                self.code
            )));
        }
        self.seats.push(Seat {
            player: Player {
                id,
                nickname: nickname.to_string(),
                is_host: id == self.host_id,
                connected: true,
            },
            score: 0,
        });
        Ok(())
    }

    /// Removes a player along with their score and pending submission.
    /// If the host leaves and seats remain, the earliest-joined remaining
    /// player inherits the role.
    pub fn remove_player(&mut self, id: PlayerId) -> RemoveOutcome {
        let before = self.seats.len();
        self.seats.retain(|seat| seat.player.id != id);
        let was_member = self.seats.len() != before;

        let mut new_host = None;
        if was_member {
            self.submissions.retain(|(player, _)| *player != id);
            if id == self.host_id {
                if let Some(first) = self.seats.first_mut() {
                    self.host_id = first.player.id;
                    first.player.is_host = true;
                    new_host = Some(self.host_id);
                }
            }
        }

        RemoveOutcome {
            was_member,
            new_host,
            room_empty: self.seats.is_empty(),
        }
    }

    // -----------------------------------------------------------------
    // Game flow
    // -----------------------------------------------------------------

    /// Starts the game: host-only, needs enough players, waiting phase
    /// only. Moves to `Playing` with `current_round = 1`; the caller is
    /// expected to open the round with [`begin_round`](Self::begin_round).
    pub fn start_game(&mut self, caller: PlayerId) -> Result<(), RoomError> {
        if caller != self.host_id {
            return Err(RoomError::NotHost(caller));
        }
        if self.phase != GamePhase::Waiting {
            return Err(RoomError::InvalidState("game already started".into()));
        }
        if self.seats.len() < self.config.min_players {
            return Err(RoomError::InvalidState(format!(
                "need at least {} players to start",
                self.config.min_players
            )));
        }
        self.phase = GamePhase::Playing;
        self.current_round = 1;
        self.submissions.clear();
        Ok(())
    }

    /// Opens the current round for submissions with a clean slate.
    pub fn begin_round(&mut self) {
        self.submissions.clear();
        self.accepting = true;
    }

    /// Moves on to the next round number. Does not open it.
    pub fn advance_round(&mut self) {
        self.current_round += 1;
    }

    /// Records a word for `id`. Rejected unless a round is open — in
    /// particular during the inter-round countdown, so a late word is
    /// never silently attributed across a round boundary.
    ///
    /// Resubmitting before round end overwrites the earlier word (last
    /// write wins).
    pub fn submit_word(&mut self, id: PlayerId, raw: &str) -> Result<SubmitStatus, RoomError> {
        if self.phase != GamePhase::Playing || !self.accepting {
            return Err(RoomError::InvalidState(
                "no round is accepting words".into(),
            ));
        }
        if !self.contains(id) {
            return Err(RoomError::InvalidState(format!(
                "player {id} is not in room {}",
                self.code
            )));
        }

        let word = score::normalize(raw);
        match self.submissions.iter_mut().find(|(player, _)| *player == id) {
            Some((_, slot)) => *slot = word,
            None => self.submissions.push((id, word)),
        }

        Ok(SubmitStatus {
            all_submitted: self.submissions.len() == self.seats.len(),
        })
    }

    /// Closes the round and scores it: builds the immutable record (with
    /// the pre-round scoreboard), then credits match points. The caller
    /// guarantees this runs once per round.
    pub fn end_round(&mut self) -> RoundOutcome {
        self.accepting = false;

        let RoundScore { matches, unanimous } =
            score::score_round(&self.submissions, self.seats.len());

        let result = RoundResult {
            round: self.current_round,
            submissions: self
                .submissions
                .iter()
                .map(|(player_id, word)| Submission {
                    player_id: *player_id,
                    word: word.clone(),
                })
                .collect(),
            matches: matches.clone(),
            scores: self.score_lines(),
        };
        self.round_results.push(result.clone());

        for word_match in &matches {
            for player in &word_match.players {
                if let Some(seat) = self.seat_mut(*player) {
                    seat.score += word_match.points;
                }
            }
        }

        RoundOutcome {
            result,
            won: unanimous,
        }
    }

    /// Ends the game: `Finished` phase, scoreboard sorted descending with
    /// ties kept in join order (the sort is stable).
    pub fn finish(&mut self) -> FinalResult {
        self.phase = GamePhase::Finished;

        let mut final_scores: Vec<ScoreEntry> = self
            .seats
            .iter()
            .map(|seat| ScoreEntry {
                player_id: seat.player.id,
                nickname: seat.player.nickname.clone(),
                score: seat.score,
            })
            .collect();
        final_scores.sort_by(|a, b| b.score.cmp(&a.score));

        FinalResult {
            final_scores,
            round_results: self.round_results.clone(),
        }
    }

    // -----------------------------------------------------------------
    // Projections
    // -----------------------------------------------------------------

    /// Deep, immutable snapshot for broadcast. `time_left` comes from the
    /// clock — the state machine itself has no notion of wall time.
    pub fn snapshot(&self, time_left: Duration) -> RoomSnapshot {
        RoomSnapshot {
            id: self.code.clone(),
            host_id: self.host_id,
            players: self.seats.iter().map(|seat| seat.player.clone()).collect(),
            state: self.phase,
            current_round: self.current_round,
            scores: self.score_lines(),
            time_left: time_left.as_secs(),
        }
    }

    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn host_id(&self) -> PlayerId {
        self.host_id
    }

    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    pub fn player_count(&self) -> usize {
        self.seats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.seats.iter().any(|seat| seat.player.id == id)
    }

    pub fn nickname(&self, id: PlayerId) -> Option<&str> {
        self.seats
            .iter()
            .find(|seat| seat.player.id == id)
            .map(|seat| seat.player.nickname.as_str())
    }

    /// A round is currently open for words.
    pub fn round_active(&self) -> bool {
        self.phase == GamePhase::Playing && self.accepting
    }

    /// Every present player has a pending submission.
    pub fn all_submitted(&self) -> bool {
        !self.seats.is_empty() && self.submissions.len() == self.seats.len()
    }

    pub fn submission_count(&self) -> usize {
        self.submissions.len()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    fn seat_mut(&mut self, id: PlayerId) -> Option<&mut Seat> {
        self.seats.iter_mut().find(|seat| seat.player.id == id)
    }

    /// Score lines in seat order — one per player, always.
    fn score_lines(&self) -> Vec<PlayerScore> {
        self.seats
            .iter()
            .map(|seat| PlayerScore {
                player_id: seat.player.id,
                score: seat.score,
            })
            .collect()
    }
}
