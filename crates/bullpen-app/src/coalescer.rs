//! Coalesces bursts of viewport geometry changes into single host commits.
//!
//! Dragging a splitter or resizing the window emits a stream of transient
//! intermediate sizes; committing each one would flood the host. Per
//! session, a small drain task collects geometry until no new value has
//! arrived for a quiet window, then commits only the latest — captured at
//! commit time, so a stale size can never overwrite a newer one.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bullpen_host::ProcessHost;
use tokio::sync::mpsc;

/// Quiet window before a pending geometry is committed.
pub const RESIZE_COALESCE_WINDOW: Duration = Duration::from_millis(50);

pub struct ResizeCoalescer {
    host: Arc<dyn ProcessHost>,
    channels: Mutex<HashMap<String, mpsc::UnboundedSender<(u16, u16)>>>,
    window: Duration,
}

impl ResizeCoalescer {
    pub fn new(host: Arc<dyn ProcessHost>) -> Self {
        Self::with_window(host, RESIZE_COALESCE_WINDOW)
    }

    pub fn with_window(host: Arc<dyn ProcessHost>, window: Duration) -> Self {
        Self {
            host,
            channels: Mutex::new(HashMap::new()),
            window,
        }
    }

    /// Record a new geometry for a session. Returns immediately; the
    /// commit happens after the quiet window. Commit failures are logged,
    /// never surfaced — resize is not user-blocking.
    pub fn request(&self, session_id: &str, cols: u16, rows: u16) {
        let mut channels = self.channels.lock().expect("resize table poisoned");

        if let Some(tx) = channels.get(session_id) {
            if tx.send((cols, rows)).is_ok() {
                return;
            }
            // Drain task exited; fall through and start a fresh one.
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let _ = tx.send((cols, rows));
        channels.insert(session_id.to_string(), tx);

        tokio::spawn(drain_loop(
            Arc::clone(&self.host),
            session_id.to_string(),
            rx,
            self.window,
        ));
    }

    /// Stop tracking a session (teardown). Any geometry already in flight
    /// may still commit once; the host rejects it for a dead session and
    /// the rejection is logged as a no-op.
    pub fn forget(&self, session_id: &str) {
        self.channels
            .lock()
            .expect("resize table poisoned")
            .remove(session_id);
    }
}

async fn drain_loop(
    host: Arc<dyn ProcessHost>,
    session_id: String,
    mut rx: mpsc::UnboundedReceiver<(u16, u16)>,
    window: Duration,
) {
    while let Some(mut latest) = rx.recv().await {
        // Collapse everything that arrives within the quiet window; each
        // new geometry restarts it.
        loop {
            match tokio::time::timeout(window, rx.recv()).await {
                Ok(Some(dims)) => latest = dims,
                Ok(None) | Err(_) => break,
            }
        }

        if let Err(e) = host.resize_session(&session_id, latest.0, latest.1).await {
            log::warn!("resize commit failed for session {session_id}: {e}");
        }
    }
}
