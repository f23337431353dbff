//! Runnable chat server with a canned, offline narrator.
//!
//! Boots a Campfire server against the in-memory store, seeds a lobby
//! room and two demo identities, and prints the session tokens to set
//! as the `campfire-session` cookie when connecting a WebSocket client.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use campfire::prelude::*;

// ---------------------------------------------------------------------------
// Narrator
// ---------------------------------------------------------------------------

/// A narrator that tells a fixed story instead of calling a real
/// language-model service. Good enough to demo the adventure loop end
/// to end without network access or credentials.
struct CannedNarrator {
    next_thread: AtomicU64,
}

impl CannedNarrator {
    fn new() -> Self {
        Self {
            next_thread: AtomicU64::new(1),
        }
    }

    fn opening(choice: u8) -> &'static str {
        match choice {
            1 => "Torchlight flickers across the castle gate. The \
                  portcullis is up, which it never is at this hour.\n\
                  1. Slip inside\n2. Wake the guard\n3. Circle the \
                  walls\n4. Wait and watch",
            2 => "Rain hammers the office window. The case file on \
                  your desk wasn't there when you left last night.\n\
                  1. Open the file\n2. Call the precinct\n3. Check \
                  the lock\n4. Pour a drink first",
            3 => "Neon bleeds through the blinds of your capsule. \
                  Your cracked deck is pinging: someone paid off your \
                  debt, and they want to talk.\n1. Take the call\n\
                  2. Trace the payment\n3. Wipe the deck\n4. Go dark",
            _ => "The group chat goes quiet. Then a message from a \
                  number you don't know: \"Look outside.\"\n1. Look \
                  outside\n2. Reply 'who is this'\n3. Ignore it\n\
                  4. Call the number",
        }
    }
}

impl Narrator for CannedNarrator {
    async fn begin_story(&self) -> Result<ThreadId, NarratorError> {
        let n = self.next_thread.fetch_add(1, Ordering::Relaxed);
        Ok(ThreadId(format!("canned-{n}")))
    }

    async fn continue_story(
        &self,
        thread: &ThreadId,
        choice: u8,
    ) -> Result<String, NarratorError> {
        tracing::debug!(thread = %thread.0, choice, "advancing canned story");
        Ok(format!(
            "{}\n\n(The canned narrator loops from here. Type 'end \
             adventure' to stop.)",
            CannedNarrator::opening(choice)
        ))
    }
}

// ---------------------------------------------------------------------------
// Server bootstrap
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), CampfireError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let repo = Arc::new(MemoryStore::new());
    let lobby = repo.add_room("lobby");
    repo.add_user("alice", "demo");
    repo.add_user("bob", "demo");

    let server = CampfireServerBuilder::new()
        .bind("127.0.0.1:8080")
        .build(repo, Arc::new(CannedNarrator::new()))
        .await?;

    for identity in ["alice", "bob"] {
        let token = server.issue_session(identity)?;
        println!("{identity}: Cookie: campfire-session={token}");
    }
    println!("lobby is {} — connect to ws://127.0.0.1:8080", lobby.id);
    println!("send {{\"roomId\":1,\"username\":\"\",\"text\":\"\",\"roomState\":false}} to join, then chat");

    server.run().await
}
