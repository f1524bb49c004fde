//! Per-room round clock for Wordmeld.
//!
//! A room has at most one scheduled thing at any instant: either the
//! round-expiry timer or the inter-round countdown. [`RoundClock`] holds
//! that one thing as explicit state — arming anything replaces whatever
//! was armed before, so a dangling timer can never outlive the round (or
//! the room) that armed it.
//!
//! # Integration
//!
//! The clock is designed to sit inside a room actor's `tokio::select!`
//! loop. [`RoundClock::wait`] pends forever while the clock is idle, so
//! the command branch keeps running:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = cmd_rx.recv() => { /* handle commands */ }
//!         event = clock.wait() => { /* round expired / countdown tick */ }
//!     }
//! }
//! ```
//!
//! Expiry events carry the round number they were armed for. The actor
//! compares it against its current round before processing, which makes
//! round-end single-flight even if an expiry and a cancellation race.

use std::time::Duration;

use tokio::time::{self, Instant};
use tracing::debug;

/// What the clock is telling the room actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockEvent {
    /// The expiry timer for the given round fired.
    RoundExpired { round: u32 },
    /// One countdown tick. `value` descends to 0; the tick after 0 never
    /// comes — the clock is idle again.
    CountdownTick { value: u8 },
}

#[derive(Debug, Clone, Copy)]
enum ClockState {
    Idle,
    Round {
        round: u32,
        deadline: Instant,
    },
    Countdown {
        next: Instant,
        interval: Duration,
        value: u8,
    },
}

/// The single scheduled-work slot of one room.
pub struct RoundClock {
    state: ClockState,
}

impl RoundClock {
    /// Creates an idle clock.
    pub fn new() -> Self {
        Self {
            state: ClockState::Idle,
        }
    }

    /// Arms the expiry timer for `round`, replacing anything armed before.
    pub fn arm_round(&mut self, round: u32, duration: Duration) {
        debug!(round, ?duration, "round timer armed");
        self.state = ClockState::Round {
            round,
            deadline: Instant::now() + duration,
        };
    }

    /// Starts a countdown that ticks `from, from-1, .., 0` once per
    /// `interval`, replacing anything armed before. The first tick fires
    /// one interval from now.
    pub fn start_countdown(&mut self, from: u8, interval: Duration) {
        debug!(from, ?interval, "countdown started");
        self.state = ClockState::Countdown {
            next: Instant::now() + interval,
            interval,
            value: from,
        };
    }

    /// Disarms the clock. Idempotent.
    pub fn cancel(&mut self) {
        if !self.is_idle() {
            debug!("clock cancelled");
            self.state = ClockState::Idle;
        }
    }

    /// Whether nothing is armed.
    pub fn is_idle(&self) -> bool {
        matches!(self.state, ClockState::Idle)
    }

    /// Remaining round budget. `None` unless an expiry timer is armed.
    pub fn time_left(&self) -> Option<Duration> {
        match self.state {
            ClockState::Round { deadline, .. } => {
                Some(deadline.saturating_duration_since(Instant::now()))
            }
            _ => None,
        }
    }

    /// Waits for the next clock event.
    ///
    /// Pends forever while idle — `select!` keeps servicing its other
    /// branches. Cancel-safe: dropping the future mid-sleep leaves the
    /// armed state untouched, so the next call resumes the same deadline.
    pub async fn wait(&mut self) -> ClockEvent {
        match self.state {
            ClockState::Idle => {
                std::future::pending::<()>().await;
                unreachable!()
            }
            ClockState::Round { round, deadline } => {
                time::sleep_until(deadline).await;
                self.state = ClockState::Idle;
                ClockEvent::RoundExpired { round }
            }
            ClockState::Countdown {
                next,
                interval,
                value,
            } => {
                time::sleep_until(next).await;
                self.state = if value == 0 {
                    ClockState::Idle
                } else {
                    ClockState::Countdown {
                        next: next + interval,
                        interval,
                        value: value - 1,
                    }
                };
                ClockEvent::CountdownTick { value }
            }
        }
    }
}

impl Default for RoundClock {
    fn default() -> Self {
        Self::new()
    }
}
