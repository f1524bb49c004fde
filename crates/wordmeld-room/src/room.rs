//! Room actor: an isolated Tokio task that owns one game room.
//!
//! Each room runs in its own task with its own clock, communicating with
//! the outside world through an mpsc channel. Every mutation — joins,
//! departures, start, submissions, timer expiry, countdown ticks — is one
//! message through that channel, so round boundaries cannot race.

use std::collections::HashMap;

use tokio::sync::{mpsc, oneshot};
use wordmeld_clock::{ClockEvent, RoundClock};
use wordmeld_protocol::{PlayerId, RoomCode, RoomSnapshot, ServerEvent};

use crate::{GameConfig, GameRoom, RoomError};

/// Channel sender for delivering events to one player's connection.
pub type PlayerSender = mpsc::UnboundedSender<ServerEvent>;

/// Which acknowledgement a successful join earns: the creator hears
/// `room-created`, everyone else hears `room-joined`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinAck {
    Created,
    Joined,
}

/// What `Leave` reports back to the registry.
#[derive(Debug, Clone, Copy, Default)]
pub struct LeaveOutcome {
    pub was_member: bool,
    /// The room emptied — the registry should tear it down.
    pub room_empty: bool,
}

/// Commands sent to a room actor through its channel.
pub(crate) enum RoomCommand {
    Join {
        player_id: PlayerId,
        nickname: String,
        sender: PlayerSender,
        ack: JoinAck,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },
    Leave {
        player_id: PlayerId,
        reply: oneshot::Sender<LeaveOutcome>,
    },
    StartGame {
        player_id: PlayerId,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },
    SubmitWord {
        player_id: PlayerId,
        word: String,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },
    Snapshot {
        reply: oneshot::Sender<RoomSnapshot>,
    },
    Shutdown,
}

/// Handle to a running room actor. Cheap to clone — just a sender.
#[derive(Clone)]
pub struct RoomHandle {
    code: RoomCode,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    /// The room's code.
    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    /// Seats a player; on success the actor acks the joiner and
    /// broadcasts the new state before this returns.
    pub async fn join(
        &self,
        player_id: PlayerId,
        nickname: &str,
        sender: PlayerSender,
        ack: JoinAck,
    ) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Join {
            player_id,
            nickname: nickname.to_string(),
            sender,
            ack,
            reply: reply_tx,
        })
        .await?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))?
    }

    /// Removes a player. Infallible from the caller's perspective — a
    /// vanished room simply reports an empty outcome.
    pub async fn leave(&self, player_id: PlayerId) -> Result<LeaveOutcome, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Leave {
            player_id,
            reply: reply_tx,
        })
        .await?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))
    }

    /// Asks the actor to start the game on behalf of `player_id`.
    pub async fn start_game(&self, player_id: PlayerId) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::StartGame {
            player_id,
            reply: reply_tx,
        })
        .await?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))?
    }

    /// Delivers a word submission.
    pub async fn submit_word(&self, player_id: PlayerId, word: &str) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::SubmitWord {
            player_id,
            word: word.to_string(),
            reply: reply_tx,
        })
        .await?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))?
    }

    /// Requests a state snapshot.
    pub async fn snapshot(&self) -> Result<RoomSnapshot, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Snapshot { reply: reply_tx }).await?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))
    }

    /// Tells the room to shut down.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.send(RoomCommand::Shutdown).await
    }

    async fn send(&self, cmd: RoomCommand) -> Result<(), RoomError> {
        self.sender
            .send(cmd)
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))
    }
}

/// The room actor. Runs inside a Tokio task until shut down.
struct RoomActor {
    game: GameRoom,
    clock: RoundClock,
    /// Per-player outbound channels.
    senders: HashMap<PlayerId, PlayerSender>,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    async fn run(mut self) {
        tracing::info!(room = %self.game.code(), "room actor started");

        loop {
            tokio::select! {
                cmd = self.receiver.recv() => {
                    match cmd {
                        Some(RoomCommand::Shutdown) | None => break,
                        Some(cmd) => self.handle_command(cmd),
                    }
                }
                event = self.clock.wait() => self.handle_clock(event),
            }
        }

        // The clock dies with the task — no timer can outlive the room.
        tracing::info!(room = %self.game.code(), "room actor stopped");
    }

    /// Processes one command. Synchronous: the reply is sent only after
    /// every side effect (including broadcasts) has been queued, so a
    /// caller that awaited the reply observes a fully settled room.
    fn handle_command(&mut self, cmd: RoomCommand) {
        match cmd {
            RoomCommand::Join {
                player_id,
                nickname,
                sender,
                ack,
                reply,
            } => {
                let result = self.game.add_player(player_id, &nickname);
                if result.is_ok() {
                    let room_id = self.game.code().clone();
                    let ack_event = match ack {
                        JoinAck::Created => ServerEvent::RoomCreated { room_id },
                        JoinAck::Joined => ServerEvent::RoomJoined { room_id },
                    };
                    let _ = sender.send(ack_event);
                    self.senders.insert(player_id, sender);
                    tracing::info!(
                        room = %self.game.code(),
                        %player_id,
                        players = self.game.player_count(),
                        "player joined"
                    );
                    self.broadcast_state();
                }
                let _ = reply.send(result);
            }

            RoomCommand::Leave { player_id, reply } => {
                let outcome = self.handle_leave(player_id);
                let _ = reply.send(outcome);
            }

            RoomCommand::StartGame { player_id, reply } => {
                let result = self.game.start_game(player_id);
                if result.is_ok() {
                    tracing::info!(
                        room = %self.game.code(),
                        players = self.game.player_count(),
                        "game started"
                    );
                    self.broadcast(ServerEvent::GameStarted);
                    self.broadcast_state();
                    self.launch_round();
                }
                let _ = reply.send(result);
            }

            RoomCommand::SubmitWord {
                player_id,
                word,
                reply,
            } => {
                match self.game.submit_word(player_id, &word) {
                    Ok(status) => {
                        let nickname = self
                            .game
                            .nickname(player_id)
                            .unwrap_or_default()
                            .to_string();
                        self.broadcast(ServerEvent::WordSubmitted {
                            player_id,
                            nickname,
                        });
                        if status.all_submitted {
                            // All in before the deadline: the timer loses.
                            self.clock.cancel();
                            self.finish_round();
                        }
                        let _ = reply.send(Ok(()));
                    }
                    Err(e) => {
                        let _ = reply.send(Err(e));
                    }
                }
            }

            RoomCommand::Snapshot { reply } => {
                let time_left = self.clock.time_left().unwrap_or_default();
                let _ = reply.send(self.game.snapshot(time_left));
            }

            RoomCommand::Shutdown => unreachable!("Shutdown is handled by the run loop"),
        }
    }

    fn handle_leave(&mut self, player_id: PlayerId) -> LeaveOutcome {
        let outcome = self.game.remove_player(player_id);
        if !outcome.was_member {
            return LeaveOutcome::default();
        }

        self.senders.remove(&player_id);
        tracing::info!(
            room = %self.game.code(),
            %player_id,
            players = self.game.player_count(),
            "player left"
        );
        if let Some(host) = outcome.new_host {
            tracing::debug!(room = %self.game.code(), %host, "host migrated");
        }

        if outcome.room_empty {
            self.clock.cancel();
        } else if self.game.round_active() && self.game.all_submitted() {
            // The departure completed the submission set: everyone still
            // present has a word in, so the round ends now.
            self.clock.cancel();
            self.finish_round();
        } else {
            self.broadcast_state();
        }

        LeaveOutcome {
            was_member: true,
            room_empty: outcome.room_empty,
        }
    }

    fn handle_clock(&mut self, event: ClockEvent) {
        match event {
            ClockEvent::RoundExpired { round } => {
                // A firing for any round but the one currently open is
                // stale — the round already ended some other way.
                if self.game.round_active() && round == self.game.current_round() {
                    tracing::debug!(room = %self.game.code(), round, "round timed out");
                    self.finish_round();
                } else {
                    tracing::debug!(room = %self.game.code(), round, "stale round timer ignored");
                }
            }
            ClockEvent::CountdownTick { value } => {
                self.broadcast(ServerEvent::NextRoundCountdown { countdown: value });
                if value == 0 {
                    self.game.advance_round();
                    self.launch_round();
                }
            }
        }
    }

    /// Opens the current round: clean submissions, armed timer,
    /// `round-started` broadcast.
    fn launch_round(&mut self) {
        self.game.begin_round();
        let duration = self.game.config().round_duration;
        let round = self.game.current_round();
        self.clock.arm_round(round, duration);
        self.broadcast(ServerEvent::RoundStarted {
            round,
            time_left: duration.as_secs(),
        });
        tracing::debug!(room = %self.game.code(), round, "round started");
    }

    /// Round-end processing. Runs at most once per round: both paths in
    /// (all-submitted, expiry) disarm the clock, and the expiry guard
    /// drops anything stale.
    fn finish_round(&mut self) {
        let outcome = self.game.end_round();
        tracing::info!(
            room = %self.game.code(),
            round = outcome.result.round,
            matches = outcome.result.matches.len(),
            won = outcome.won,
            "round ended"
        );
        self.broadcast(ServerEvent::RoundEnded(outcome.result));

        if outcome.won {
            let final_result = self.game.finish();
            tracing::info!(room = %self.game.code(), "game finished");
            self.broadcast(ServerEvent::GameEnded(final_result));
        } else {
            self.broadcast_state();
            let config = self.game.config();
            let (from, interval) = (config.countdown_start, config.countdown_interval);
            self.clock.start_countdown(from, interval);
        }
    }

    fn broadcast_state(&self) {
        let time_left = self.clock.time_left().unwrap_or_default();
        self.broadcast(ServerEvent::GameState(self.game.snapshot(time_left)));
    }

    /// Fans an event out to every seated player. Dead receivers (mid
    /// disconnect) are silently skipped; Leave will reap them.
    fn broadcast(&self, event: ServerEvent) {
        for sender in self.senders.values() {
            let _ = sender.send(event.clone());
        }
    }
}

/// Spawns a new room actor task and returns a handle to it.
pub(crate) fn spawn_room(
    code: RoomCode,
    host_id: PlayerId,
    config: GameConfig,
    channel_size: usize,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(channel_size);

    let actor = RoomActor {
        game: GameRoom::new(code.clone(), host_id, config),
        clock: RoundClock::new(),
        senders: HashMap::new(),
        receiver: rx,
    };

    tokio::spawn(actor.run());

    RoomHandle { code, sender: tx }
}
