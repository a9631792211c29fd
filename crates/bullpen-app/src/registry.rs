//! Authoritative set of live sessions, bucketed per team.
//!
//! The registry owns the session map exclusively; other components only
//! read snapshots. Creation calls the host first and registers on success
//! (no partial insert); removal always deletes the local entry, even when
//! the host-side close fails, so the registry never holds a session the
//! user asked to remove.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use bullpen_host::{CliType, HostError, ProcessHost, SessionSpec};
use bullpen_layout::grid::next_slot_index;
use serde::Serialize;

/// One live session as the renderer sees it. Identity fields are immutable
/// after creation; only a host-side restart may re-key `session_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionEntry {
    pub session_id: String,
    pub team_id: String,
    pub agent_name: String,
    pub cli_type: CliType,
    pub slot_index: u32,
}

/// Errors from registry operations.
#[derive(Debug)]
pub enum RegistryError {
    Host(HostError),
    SlotTaken { team_id: String, slot_index: u32 },
    SessionNotFound(String),
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::Host(err) => write!(f, "{err}"),
            RegistryError::SlotTaken {
                team_id,
                slot_index,
            } => write!(f, "slot {slot_index} already taken in team {team_id}"),
            RegistryError::SessionNotFound(id) => write!(f, "session not registered: {id}"),
        }
    }
}

impl std::error::Error for RegistryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RegistryError::Host(err) => Some(err),
            _ => None,
        }
    }
}

impl From<HostError> for RegistryError {
    fn from(err: HostError) -> Self {
        RegistryError::Host(err)
    }
}

pub struct SessionRegistry {
    host: Arc<dyn ProcessHost>,
    sessions: Mutex<HashMap<String, Vec<SessionEntry>>>,
}

impl SessionRegistry {
    pub fn new(host: Arc<dyn ProcessHost>) -> Self {
        Self {
            host,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Create a session through the host and register it.
    ///
    /// The slot index is the caller's choice when given, otherwise one past
    /// the team's highest index in use. Host failure propagates with the
    /// registry unchanged. A requested slot that turns out to be taken at
    /// insert time (a sibling add can land while the host call is in
    /// flight) closes the fresh host session best-effort and fails.
    pub async fn add_session(
        &self,
        team_id: &str,
        agent_name: &str,
        work_dir: &str,
        cli_type: CliType,
        prompt_id: Option<String>,
        slot_index: Option<u32>,
    ) -> Result<SessionEntry, RegistryError> {
        let spec = SessionSpec {
            team_id: team_id.to_string(),
            agent_name: agent_name.to_string(),
            work_dir: work_dir.to_string(),
            cli_type,
            prompt_id,
        };

        let session_id = self.host.create_session(spec).await?;

        let inserted = {
            let mut sessions = self.sessions.lock().expect("session table poisoned");
            let bucket = sessions.entry(team_id.to_string()).or_default();
            let taken: Vec<u32> = bucket.iter().map(|s| s.slot_index).collect();

            let slot = match slot_index {
                Some(requested) if taken.contains(&requested) => None,
                Some(requested) => Some(requested),
                None => Some(next_slot_index(&taken)),
            };

            slot.map(|slot_index| {
                let entry = SessionEntry {
                    session_id: session_id.clone(),
                    team_id: team_id.to_string(),
                    agent_name: agent_name.to_string(),
                    cli_type,
                    slot_index,
                };
                bucket.push(entry.clone());
                entry
            })
        };

        match inserted {
            Some(entry) => Ok(entry),
            None => {
                // Roll the host session back so nothing half-created leaks.
                if let Err(e) = self.host.close_session(&session_id).await {
                    log::warn!("rollback close failed for session {session_id}: {e}");
                }
                Err(RegistryError::SlotTaken {
                    team_id: team_id.to_string(),
                    slot_index: slot_index.unwrap_or_default(),
                })
            }
        }
    }

    /// Close a session on the host, then drop the local entry.
    ///
    /// The entry is dropped regardless of the close outcome; a host-side
    /// failure is returned for logging but must not keep the session
    /// around.
    pub async fn remove_session(&self, team_id: &str, session_id: &str) -> Result<(), HostError> {
        let close_result = self.host.close_session(session_id).await;

        let mut sessions = self.sessions.lock().expect("session table poisoned");
        if let Some(bucket) = sessions.get_mut(team_id) {
            bucket.retain(|s| s.session_id != session_id);
        }

        close_result
    }

    /// Rebind a session's slot to a fresh underlying process.
    ///
    /// Slot index and list position are preserved. If the host cannot keep
    /// the identity, the entry is re-keyed in place and the new id
    /// returned; the caller re-keys subscriptions, layout, and focus with
    /// it.
    pub async fn restart_session(
        &self,
        team_id: &str,
        session_id: &str,
    ) -> Result<String, RegistryError> {
        if self.find_session(team_id, session_id).is_none() {
            return Err(RegistryError::SessionNotFound(session_id.to_string()));
        }

        let new_id = self.host.restart_session(session_id).await?;

        if new_id != session_id {
            let mut sessions = self.sessions.lock().expect("session table poisoned");
            if let Some(bucket) = sessions.get_mut(team_id) {
                if let Some(entry) = bucket.iter_mut().find(|s| s.session_id == session_id) {
                    entry.session_id = new_id.clone();
                }
            }
        }

        Ok(new_id)
    }

    /// Best-effort close of every session in a team, then clear the bucket.
    ///
    /// Individual close failures are collected and logged, never re-thrown
    /// mid-loop — one stuck session must not keep the rest alive.
    pub async fn remove_all_for_team(&self, team_id: &str) -> Vec<(String, HostError)> {
        let ids = self.live_ids(team_id);

        let mut failures = Vec::new();
        for session_id in ids {
            if let Err(e) = self.host.close_session(&session_id).await {
                log::warn!("close failed for session {session_id}: {e}");
                failures.push((session_id, e));
            }
        }

        self.sessions
            .lock()
            .expect("session table poisoned")
            .remove(team_id);

        failures
    }

    /// Ordered snapshot of a team's sessions.
    pub fn list_sessions(&self, team_id: &str) -> Vec<SessionEntry> {
        self.sessions
            .lock()
            .expect("session table poisoned")
            .get(team_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Session ids of a team, in registration order.
    pub fn live_ids(&self, team_id: &str) -> Vec<String> {
        self.list_sessions(team_id)
            .into_iter()
            .map(|s| s.session_id)
            .collect()
    }

    pub fn find_session(&self, team_id: &str, session_id: &str) -> Option<SessionEntry> {
        self.sessions
            .lock()
            .expect("session table poisoned")
            .get(team_id)?
            .iter()
            .find(|s| s.session_id == session_id)
            .cloned()
    }

    /// The team owning a session id, if any.
    pub fn session_team(&self, session_id: &str) -> Option<String> {
        let sessions = self.sessions.lock().expect("session table poisoned");
        for (team_id, bucket) in sessions.iter() {
            if bucket.iter().any(|s| s.session_id == session_id) {
                return Some(team_id.clone());
            }
        }
        None
    }
}
