//! `CampfireServer` builder and accept loop.
//!
//! This is the entry point for running a Campfire chat server. It ties
//! together all the layers: transport → protocol → session → room →
//! store.

use std::sync::Arc;

use campfire_protocol::{Codec, JsonCodec};
use campfire_room::{Narrator, RoomConfig, RoomRegistry};
use campfire_session::{spawn_sweeper, SessionConfig, SessionStore};
use campfire_store::Repository;
use campfire_transport::{Transport, WebSocketTransport};
use tokio::sync::Mutex;

use crate::handler::handle_connection;
use crate::CampfireError;

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. The
/// session store carries its own interior lock; the room registry
/// sits behind an async `Mutex` held only while resolving a handle.
pub(crate) struct ServerState<R: Repository, N: Narrator, C: Codec> {
    pub(crate) sessions: Arc<SessionStore>,
    pub(crate) rooms: Mutex<RoomRegistry<R, N>>,
    pub(crate) codec: C,
}

/// Builder for configuring and starting a Campfire server.
///
/// # Example
///
/// ```rust,ignore
/// use campfire::prelude::*;
///
/// let server = CampfireServer::builder()
///     .bind("0.0.0.0:8080")
///     .build(repo, narrator)
///     .await?;
/// server.run().await
/// ```
pub struct CampfireServerBuilder {
    bind_addr: String,
    session_config: SessionConfig,
    room_config: RoomConfig,
}

impl CampfireServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            session_config: SessionConfig::default(),
            room_config: RoomConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the session configuration.
    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    /// Sets the room configuration.
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.room_config = config;
        self
    }

    /// Builds the server against a repository and a narrator.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`, which is what the
    /// shipped browser client speaks.
    pub async fn build<R: Repository, N: Narrator>(
        self,
        repo: Arc<R>,
        narrator: Arc<N>,
    ) -> Result<CampfireServer<R, N, JsonCodec>, CampfireError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let state = Arc::new(ServerState {
            sessions: Arc::new(SessionStore::new()),
            rooms: Mutex::new(RoomRegistry::new(
                repo,
                narrator,
                self.room_config,
            )),
            codec: JsonCodec,
        });

        Ok(CampfireServer {
            transport,
            state,
            session_config: self.session_config,
        })
    }
}

impl Default for CampfireServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Campfire chat server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct CampfireServer<R: Repository, N: Narrator, C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<R, N, C>>,
    session_config: SessionConfig,
}

impl<R, N, C> CampfireServer<R, N, C>
where
    R: Repository,
    N: Narrator,
    C: Codec + Clone + 'static,
{
    /// Creates a new builder.
    pub fn builder() -> CampfireServerBuilder {
        CampfireServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// The session store connections are admitted against.
    ///
    /// The login collaborator calls [`SessionStore::create`] on this
    /// store and sets the resulting token as the `campfire-session`
    /// cookie.
    pub fn sessions(&self) -> Arc<SessionStore> {
        Arc::clone(&self.state.sessions)
    }

    /// Creates a session with the configured TTL and returns its
    /// token. Convenience for the login collaborator and for tests.
    pub fn issue_session(&self, identity: &str) -> Result<String, CampfireError> {
        Ok(self
            .state
            .sessions
            .create(identity, self.session_config.ttl)?)
    }

    /// Runs the server accept loop.
    ///
    /// Starts the session sweeper, then accepts incoming connections
    /// and spawns a handler task for each. Runs until the process is
    /// terminated.
    pub async fn run(mut self) -> Result<(), CampfireError> {
        spawn_sweeper(
            Arc::clone(&self.state.sessions),
            self.session_config.sweep_interval,
        );
        tracing::info!("Campfire server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) =
                            handle_connection::<R, N, C>(conn, state).await
                        {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
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
