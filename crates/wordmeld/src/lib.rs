//! # Wordmeld
//!
//! Server for a real-time, round-based party game: players win by
//! converging on an identical word without communicating.
//!
//! The crates underneath do the work — this one wires them together:
//!
//! - [`wordmeld_protocol`] — intents, events, snapshots, codecs
//! - [`wordmeld_room`] — room state machine, round orchestration, scoring
//! - [`wordmeld_transport`] — WebSocket transport
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use wordmeld::ServerBuilder;
//!
//! # async fn run() -> Result<(), wordmeld::WordmeldError> {
//! let server = ServerBuilder::new().bind("0.0.0.0:8080").build().await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;

pub use error::WordmeldError;
pub use server::{ServerBuilder, WordmeldServer};

pub use wordmeld_protocol as protocol;
pub use wordmeld_room as room;
