//! Per-connection handler: admission, fan-in, and room routing.
//!
//! Each accepted connection gets its own Tokio task running this
//! handler. The flow is:
//!   1. Validate the session cookie captured at upgrade → identity
//!   2. Spawn a writer task that drains the connection's outbound queue
//!   3. Loop: decode envelopes → subscribe / route to room actors
//!   4. On disconnect, unsubscribe from every joined room
//!
//! The identity resolved at admission is stamped on every message this
//! connection authors. The username field of inbound envelopes is
//! ignored; clients do not get to pick who they speak as.

use std::collections::HashMap;
use std::sync::Arc;

use campfire_protocol::{sanitize, ChatEnvelope, Codec, RoomId};
use campfire_room::{Narrator, RoomHandle};
use campfire_session::gate;
use campfire_store::Repository;
use campfire_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;

use crate::server::ServerState;
use crate::CampfireError;

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<R, N, C>(
    conn: WebSocketConnection,
    state: Arc<ServerState<R, N, C>>,
) -> Result<(), CampfireError>
where
    R: Repository,
    N: Narrator,
    C: Codec + Clone,
{
    let conn_id = conn.id();

    // --- Step 1: Admission ---
    // Decided entirely from the upgrade's Cookie header, before any
    // frame is read. A rejected connection is closed with nothing else
    // mutated.
    let identity =
        match gate::admit(&state.sessions, conn.cookie_header()) {
            Ok(identity) => identity,
            Err(e) => {
                tracing::info!(%conn_id, error = %e, "connection rejected");
                let _ = conn.close().await;
                return Err(CampfireError::Session(e));
            }
        };
    // Identities render in other users' clients just like text does.
    let identity = sanitize(&identity);
    tracing::info!(%conn_id, identity, "connection admitted");

    // --- Step 2: Writer task ---
    // Room actors push envelopes into this queue from their own tasks;
    // one writer per connection serializes them onto the socket.
    let (outbound, mut outbound_rx) =
        mpsc::unbounded_channel::<ChatEnvelope>();
    let writer = {
        let conn = conn.clone();
        let codec = state.codec.clone();
        tokio::spawn(async move {
            while let Some(envelope) = outbound_rx.recv().await {
                let bytes = match codec.encode(&envelope) {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        tracing::warn!(error = %e, "encode failed, dropping envelope");
                        continue;
                    }
                };
                if conn.send(&bytes).await.is_err() {
                    break;
                }
            }
        })
    };

    // --- Step 3: Read loop ---
    let mut joined: HashMap<RoomId, RoomHandle> = HashMap::new();

    loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::info!(%conn_id, identity, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                break;
            }
        };

        let envelope: ChatEnvelope = match state.codec.decode(&data) {
            Ok(env) => env,
            Err(e) => {
                // Malformed frames are dropped, not fatal.
                tracing::debug!(%conn_id, error = %e, "failed to decode envelope");
                continue;
            }
        };

        let room_id = envelope.room_id;
        if !joined.contains_key(&room_id) {
            let handle = {
                let mut rooms = state.rooms.lock().await;
                match rooms.room(room_id).await {
                    Ok(handle) => handle,
                    Err(e) => {
                        tracing::debug!(
                            %conn_id, %room_id, error = %e,
                            "dropping frame for unusable room"
                        );
                        continue;
                    }
                }
            };
            if let Err(e) =
                handle.subscribe(conn_id, outbound.clone()).await
            {
                tracing::warn!(%conn_id, %room_id, error = %e,
                    "subscribe failed, closing connection");
                break;
            }
            tracing::debug!(%conn_id, %room_id, "joined room");
            joined.insert(room_id, handle);
        }
        // Present: either it already was, or it was just inserted.
        let Some(handle) = joined.get(&room_id) else {
            continue;
        };

        // An empty text is a presence frame: it subscribes the
        // connection to the room without posting anything.
        let text = sanitize(envelope.text.trim());
        if text.is_empty() {
            continue;
        }

        // A dead room actor ends the connection rather than the task:
        // breaking (instead of returning) guarantees the cleanup below
        // still unsubscribes every joined room, stops the writer, and
        // closes the socket.
        if let Err(e) = handle.post(conn_id, identity.clone(), text).await {
            tracing::warn!(%conn_id, %room_id, error = %e,
                "room gone, closing connection");
            break;
        }
    }

    // --- Step 4: Cleanup ---
    for (room_id, handle) in &joined {
        if handle.unsubscribe(conn_id).await.is_err() {
            tracing::debug!(%conn_id, %room_id, "room gone during cleanup");
        }
    }
    drop(outbound);
    writer.abort();
    let _ = conn.close().await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use campfire_protocol::JsonCodec;
    use campfire_room::{NarratorError, RoomConfig, RoomRegistry};
    use campfire_session::SessionStore;
    use campfire_store::{MemoryStore, ThreadId};
    use campfire_transport::{Transport, WebSocketTransport};
    use futures_util::{SinkExt, StreamExt};
    use tokio_tungstenite::tungstenite::client::IntoClientRequest;
    use tokio_tungstenite::tungstenite::http::HeaderValue;
    use tokio_tungstenite::tungstenite::Message;

    struct SilentNarrator;

    impl Narrator for SilentNarrator {
        async fn begin_story(&self) -> Result<ThreadId, NarratorError> {
            Err(NarratorError::Unavailable("silent".into()))
        }

        async fn continue_story(
            &self,
            _thread: &ThreadId,
            _choice: u8,
        ) -> Result<String, NarratorError> {
            Err(NarratorError::Unavailable("silent".into()))
        }
    }

    fn frame(room_id: RoomId, text: &str) -> Message {
        let envelope = ChatEnvelope {
            room_id,
            username: String::new(),
            text: text.to_owned(),
            room_state: false,
        };
        Message::Text(serde_json::to_string(&envelope).unwrap().into())
    }

    #[tokio::test]
    async fn test_posting_to_a_retired_room_closes_the_connection() {
        let repo = Arc::new(MemoryStore::new());
        let room = repo.add_room("lobby");
        let state = Arc::new(ServerState {
            sessions: Arc::new(SessionStore::new()),
            rooms: tokio::sync::Mutex::new(RoomRegistry::new(
                Arc::clone(&repo),
                Arc::new(SilentNarrator),
                RoomConfig::default(),
            )),
            codec: JsonCodec,
        });
        let token = state
            .sessions
            .create("alice", Duration::from_secs(600))
            .expect("session create");

        let mut transport =
            WebSocketTransport::bind("127.0.0.1:0").await.expect("bind");
        let addr = transport.local_addr().expect("local addr");
        let mut request = format!("ws://{addr}")
            .into_client_request()
            .expect("request");
        request.headers_mut().insert(
            "Cookie",
            HeaderValue::from_str(&format!("campfire-session={token}"))
                .unwrap(),
        );
        let client = tokio::spawn(async move {
            tokio_tungstenite::connect_async(request)
                .await
                .expect("connect")
                .0
        });
        let conn = transport.accept().await.expect("accept");
        let handler =
            tokio::spawn(handle_connection(conn, Arc::clone(&state)));
        let mut ws = client.await.expect("client task");

        ws.send(frame(room.id, "")).await.expect("presence frame");
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(state.rooms.lock().await.live_rooms(), 1);

        // Pull the actor out from under the live connection, then post
        // to the room it backed.
        state.rooms.lock().await.retire(room.id).await;
        tokio::time::sleep(Duration::from_millis(100)).await;
        ws.send(frame(room.id, "anyone there?")).await.expect("post");

        // The handler must tear the connection all the way down, not
        // abandon a half-dead socket with its writer still running.
        let message = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                match ws.next().await {
                    Some(Ok(Message::Ping(_) | Message::Pong(_))) => continue,
                    other => return other,
                }
            }
        })
        .await
        .expect("server should close the connection");
        match message {
            None | Some(Ok(Message::Close(_))) | Some(Err(_)) => {}
            Some(Ok(other)) => panic!("expected close, got {other:?}"),
        }

        let result = tokio::time::timeout(Duration::from_secs(5), handler)
            .await
            .expect("handler should finish")
            .expect("handler task");
        assert!(result.is_ok(), "teardown is not an error: {result:?}");
    }
}
