//! Binds one output subscription per live session to its rendering sink.
//!
//! Each attach spawns a forwarding task that drains the host's output
//! stream into the sink; a per-session stop channel tears the task down on
//! detach, checked with priority over pending chunks so a dismounting
//! surface stops receiving immediately. Chunk order within one session is
//! preserved end to end; nothing is guaranteed (or needed) across
//! sessions.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use bullpen_host::{HostError, OutputSink, OutputStream, ProcessHost};
use tokio::sync::mpsc;

struct Subscription {
    stop_tx: mpsc::Sender<()>,
    /// Kept so a restart can rebind the same surface to a fresh stream.
    sink: Arc<dyn OutputSink>,
}

pub struct EventMultiplexer {
    host: Arc<dyn ProcessHost>,
    subscriptions: Mutex<HashMap<String, Subscription>>,
}

impl EventMultiplexer {
    pub fn new(host: Arc<dyn ProcessHost>) -> Self {
        Self {
            host,
            subscriptions: Mutex::new(HashMap::new()),
        }
    }

    /// Subscribe a session's output and forward every chunk, in arrival
    /// order, to `sink`. An existing subscription for the same identity is
    /// fully replaced first — re-attach after a restart never double
    /// delivers.
    pub async fn attach(
        &self,
        session_id: &str,
        sink: Arc<dyn OutputSink>,
    ) -> Result<(), HostError> {
        self.detach(session_id).await;

        let output = self.host.subscribe_output(session_id).await?;
        let (stop_tx, stop_rx) = mpsc::channel::<()>(1);

        tokio::spawn(forward_loop(output, Arc::clone(&sink), stop_rx));

        self.subscriptions
            .lock()
            .expect("subscription table poisoned")
            .insert(session_id.to_string(), Subscription { stop_tx, sink });

        Ok(())
    }

    /// Cancel a session's subscription. Idempotent; unknown ids are a
    /// no-op. After this returns, the sink receives no further chunks.
    pub async fn detach(&self, session_id: &str) {
        let sub = self
            .subscriptions
            .lock()
            .expect("subscription table poisoned")
            .remove(session_id);

        if let Some(sub) = sub {
            // The task may already be gone (host stream ended); that's fine.
            let _ = sub.stop_tx.send(()).await;
        }
    }

    pub async fn detach_all(&self, session_ids: &[String]) {
        for session_id in session_ids {
            self.detach(session_id).await;
        }
    }

    pub fn attached(&self, session_id: &str) -> bool {
        self.subscriptions
            .lock()
            .expect("subscription table poisoned")
            .contains_key(session_id)
    }

    /// Move a subscription to a new session identity after a host-side
    /// restart, reusing the surface's sink. No-op if nothing was attached
    /// under the old identity.
    pub async fn rebind(&self, old_id: &str, new_id: &str) -> Result<(), HostError> {
        let sink = self
            .subscriptions
            .lock()
            .expect("subscription table poisoned")
            .get(old_id)
            .map(|sub| Arc::clone(&sub.sink));

        match sink {
            Some(sink) => {
                self.detach(old_id).await;
                self.attach(new_id, sink).await
            }
            None => Ok(()),
        }
    }
}

async fn forward_loop(
    mut output: OutputStream,
    sink: Arc<dyn OutputSink>,
    mut stop_rx: mpsc::Receiver<()>,
) {
    loop {
        tokio::select! {
            // Stop takes priority over buffered chunks: a torn-down
            // surface must not receive late data.
            biased;
            _ = stop_rx.recv() => return,
            chunk = output.recv() => match chunk {
                Some(data) => sink.push_chunk(&data),
                None => return, // host closed the stream
            },
        }
    }
}
