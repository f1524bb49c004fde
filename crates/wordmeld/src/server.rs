//! `WordmeldServer` builder and accept loop.
//!
//! This is the entry point for running the game server. It ties the
//! layers together: transport → protocol → rooms.

use std::sync::Arc;

use tokio::sync::Mutex;
use wordmeld_protocol::{Codec, JsonCodec};
use wordmeld_room::{GameConfig, RoomManager};
use wordmeld_transport::{Transport, WebSocketTransport};

use crate::WordmeldError;
use crate::handler::handle_connection;

/// Shared server state passed to each connection handler task.
///
/// The manager is the only mutable piece shared across rooms; each room
/// behind it is exclusively owned by its own actor task.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) manager: Mutex<RoomManager>,
    pub(crate) codec: C,
}

/// Builder for configuring and starting a Wordmeld server.
///
/// ```rust,no_run
/// use wordmeld::ServerBuilder;
///
/// # async fn run() -> Result<(), wordmeld::WordmeldError> {
/// let server = ServerBuilder::new().bind("0.0.0.0:8080").build().await?;
/// server.run().await
/// # }
/// ```
pub struct ServerBuilder {
    bind_addr: String,
    game_config: GameConfig,
}

impl ServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            game_config: GameConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Overrides the room settings (round/countdown durations, limits).
    pub fn game_config(mut self, config: GameConfig) -> Self {
        self.game_config = config;
        self
    }

    /// Binds the transport and builds the server with the JSON codec.
    pub async fn build(self) -> Result<WordmeldServer<JsonCodec>, WordmeldError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let state = Arc::new(ServerState {
            manager: Mutex::new(RoomManager::new(self.game_config)),
            codec: JsonCodec,
        });

        Ok(WordmeldServer { transport, state })
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Wordmeld server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct WordmeldServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl<C: Codec> WordmeldServer<C> {
    /// Creates a new builder.
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the accept loop, spawning a handler task per connection.
    /// Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), WordmeldError> {
        tracing::info!("wordmeld server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
