//! Channel-backed stand-in for the external process host, shared by the
//! test modules in this crate.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bullpen_host::{
    CliInfo, CliType, HostError, OutputStream, ProcessHost, SessionSpec,
};
use tokio::sync::mpsc;

use crate::state::AppState;

#[derive(Default)]
pub struct FakeHost {
    next_id: AtomicU64,
    live: Mutex<HashSet<String>>,
    outputs: Mutex<HashMap<String, mpsc::UnboundedSender<Vec<u8>>>>,
    pub created: Mutex<Vec<SessionSpec>>,
    pub closed: Mutex<Vec<String>>,
    pub writes: Mutex<Vec<(String, Vec<u8>)>>,
    pub resizes: Mutex<Vec<(String, u16, u16)>>,
    pub fail_create: AtomicBool,
    pub fail_close: Mutex<HashSet<String>>,
    pub fail_write: AtomicBool,
    pub preserve_identity_on_restart: AtomicBool,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn fresh_id(&self) -> String {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        format!("sess-{n}")
    }

    /// Declare a session live without going through `create_session`
    /// (multiplexer tests don't need the registry path).
    pub fn register_session(&self, session_id: &str) {
        self.live.lock().unwrap().insert(session_id.to_string());
    }

    /// Emit an output chunk for a subscribed session. Returns `false` when
    /// nothing is listening (no subscription, or its receiver is gone).
    pub fn push_output(&self, session_id: &str, data: &[u8]) -> bool {
        let outputs = self.outputs.lock().unwrap();
        match outputs.get(session_id) {
            Some(tx) => tx.send(data.to_vec()).is_ok(),
            None => false,
        }
    }

    /// Simulate the host ending a session's output stream.
    pub fn drop_output(&self, session_id: &str) {
        self.outputs.lock().unwrap().remove(session_id);
    }
}

#[async_trait]
impl ProcessHost for FakeHost {
    async fn create_session(&self, spec: SessionSpec) -> Result<String, HostError> {
        if self.fail_create.load(Ordering::Relaxed) {
            return Err(HostError::CreateFailed("injected create failure".into()));
        }
        let id = self.fresh_id();
        self.live.lock().unwrap().insert(id.clone());
        self.created.lock().unwrap().push(spec);
        Ok(id)
    }

    async fn restart_session(&self, session_id: &str) -> Result<String, HostError> {
        if !self.live.lock().unwrap().contains(session_id) {
            return Err(HostError::SessionNotFound(session_id.to_string()));
        }
        if self.preserve_identity_on_restart.load(Ordering::Relaxed) {
            return Ok(session_id.to_string());
        }
        // Close-then-create under the hood, like the real host.
        self.live.lock().unwrap().remove(session_id);
        self.outputs.lock().unwrap().remove(session_id);
        let id = self.fresh_id();
        self.live.lock().unwrap().insert(id.clone());
        Ok(id)
    }

    async fn close_session(&self, session_id: &str) -> Result<(), HostError> {
        self.live.lock().unwrap().remove(session_id);
        self.outputs.lock().unwrap().remove(session_id);
        self.closed.lock().unwrap().push(session_id.to_string());
        if self.fail_close.lock().unwrap().contains(session_id) {
            return Err(HostError::CloseFailed(format!(
                "injected close failure for {session_id}"
            )));
        }
        Ok(())
    }

    async fn write_to_session(&self, session_id: &str, data: &[u8]) -> Result<(), HostError> {
        if self.fail_write.load(Ordering::Relaxed) {
            return Err(HostError::WriteFailed("injected write failure".into()));
        }
        if !self.live.lock().unwrap().contains(session_id) {
            return Err(HostError::SessionNotFound(session_id.to_string()));
        }
        self.writes
            .lock()
            .unwrap()
            .push((session_id.to_string(), data.to_vec()));
        Ok(())
    }

    async fn resize_session(
        &self,
        session_id: &str,
        cols: u16,
        rows: u16,
    ) -> Result<(), HostError> {
        self.resizes
            .lock()
            .unwrap()
            .push((session_id.to_string(), cols, rows));
        Ok(())
    }

    async fn subscribe_output(&self, session_id: &str) -> Result<OutputStream, HostError> {
        if !self.live.lock().unwrap().contains(session_id) {
            return Err(HostError::SubscribeFailed(format!(
                "unknown session {session_id}"
            )));
        }
        let (tx, rx) = mpsc::unbounded_channel();
        // Replaces any earlier subscription for this identity.
        self.outputs
            .lock()
            .unwrap()
            .insert(session_id.to_string(), tx);
        Ok(rx)
    }

    async fn detect_clis(&self) -> Result<Vec<CliInfo>, HostError> {
        Ok(vec![
            CliInfo {
                cli_type: CliType::Claude,
                display_name: "Claude Code".to_string(),
                available: true,
            },
            CliInfo {
                cli_type: CliType::Shell,
                display_name: "Shell".to_string(),
                available: true,
            },
        ])
    }
}

/// Fresh app state over a fake host and an in-memory database.
pub fn test_state() -> (Arc<FakeHost>, AppState) {
    let host = Arc::new(FakeHost::new());
    let db = bullpen_db::open_in_memory().expect("in-memory db");
    let state = AppState::new(host.clone() as Arc<dyn ProcessHost>, db);
    (host, state)
}
