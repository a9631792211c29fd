//! Commands for terminal session management.
//!
//! These are invoked by the rendering shell and handle creating, binding,
//! writing to, resizing, restarting, and closing sessions. Creation
//! failures are surfaced to the caller (the user asked for the session and
//! must see that it didn't start); teardown and resize failures degrade to
//! logged warnings. Operations on ids that are no longer registered are
//! no-ops — races between UI actions and external teardown are expected.

use std::sync::Arc;

use bullpen_host::{CliInfo, CliType, OutputSink};

use crate::registry::{RegistryError, SessionEntry};
use crate::state::AppState;

/// Create a new terminal session for a team and return its id.
///
/// The slot index is normally left to the registry; setup placeholders
/// pass the slot they sit in so the session lands in that cell.
pub async fn create_terminal(
    state: &AppState,
    team_id: &str,
    agent_name: &str,
    work_dir: &str,
    cli_type: &str,
    prompt_id: Option<String>,
    slot_index: Option<u32>,
) -> Result<String, String> {
    let cli_type =
        CliType::parse(cli_type).ok_or_else(|| format!("unknown CLI type: {cli_type}"))?;

    let entry = state
        .registry
        .add_session(team_id, agent_name, work_dir, cli_type, prompt_id, slot_index)
        .await
        .map_err(|e| {
            log::error!("create terminal failed for team {team_id}: {e}");
            format!("Failed to create terminal session: {e}")
        })?;

    Ok(entry.session_id)
}

/// Bind a mounted surface's sink to a session's output stream.
pub async fn attach_terminal(
    state: &AppState,
    session_id: &str,
    sink: Arc<dyn OutputSink>,
) -> Result<(), String> {
    if state.registry.session_team(session_id).is_none() {
        log::warn!("attach requested for unregistered session {session_id}");
        return Ok(());
    }

    state
        .mux
        .attach(session_id, sink)
        .await
        .map_err(|e| format!("Failed to subscribe to session output: {e}"))
}

/// Release a surface's subscription (surface dismounted).
pub async fn detach_terminal(state: &AppState, session_id: &str) {
    state.mux.detach(session_id).await;
}

/// Forward user input bytes to a session, unmodified and in order.
/// Failures are logged and surfaced; retrying is the host's business.
pub async fn write_input(state: &AppState, session_id: &str, data: &[u8]) -> Result<(), String> {
    if state.registry.session_team(session_id).is_none() {
        return Ok(());
    }

    state
        .host
        .write_to_session(session_id, data)
        .await
        .map_err(|e| {
            log::warn!("write to session {session_id} failed: {e}");
            format!("Write error: {e}")
        })
}

/// Record a new viewport geometry for a session. The commit to the host is
/// coalesced; transient intermediate sizes never reach it.
pub fn resize_terminal(state: &AppState, session_id: &str, cols: u16, rows: u16) {
    if state.registry.session_team(session_id).is_none() {
        return;
    }
    state.resizer.request(session_id, cols, rows);
}

/// Close a terminal session.
///
/// The output subscription is cancelled before anything else so the
/// surface is quiet by the time it's torn down; the registry entry is
/// dropped even if the host-side close fails.
pub async fn close_terminal(state: &AppState, team_id: &str, session_id: &str) {
    state.mux.detach(session_id).await;
    state.resizer.forget(session_id);

    if let Err(e) = state.registry.remove_session(team_id, session_id).await {
        log::warn!("host close failed for session {session_id}: {e}");
    }

    state.focus.invalidate(session_id);
    state.layouts.prune_session(team_id, session_id);
}

/// Rebind a session's slot to a fresh underlying process.
///
/// When the host reassigns the identity, every reference is re-keyed in
/// one synchronous sequence — registry entry (slot preserved), output
/// subscription (same sink), layout rectangle, focus — so no frame can
/// observe a half-restarted session.
pub async fn restart_terminal(
    state: &AppState,
    team_id: &str,
    session_id: &str,
) -> Result<String, String> {
    let new_id = match state.registry.restart_session(team_id, session_id).await {
        Ok(id) => id,
        Err(RegistryError::SessionNotFound(_)) => {
            log::warn!("restart requested for unregistered session {session_id}");
            return Ok(session_id.to_string());
        }
        Err(e) => {
            log::error!("restart failed for session {session_id}: {e}");
            return Err(format!("Failed to restart terminal: {e}"));
        }
    };

    state.resizer.forget(session_id);

    // Re-subscribe the surface to the fresh stream; same identity still
    // needs the replacement to avoid a dead subscription.
    if let Err(e) = state.mux.rebind(session_id, &new_id).await {
        log::warn!("resubscribe after restart failed for session {new_id}: {e}");
    }

    if new_id != session_id {
        state.layouts.rekey(team_id, session_id, &new_id);
        state.focus.rekey(session_id, &new_id);
    }

    Ok(new_id)
}

/// Best-effort close of every session in a team. Individual failures are
/// logged and never abort the rest.
pub async fn close_team_terminals(state: &AppState, team_id: &str) {
    let ids = state.registry.live_ids(team_id);

    state.mux.detach_all(&ids).await;
    for session_id in &ids {
        state.resizer.forget(session_id);
        state.focus.invalidate(session_id);
    }

    let failures = state.registry.remove_all_for_team(team_id).await;
    if !failures.is_empty() {
        log::warn!(
            "{} session(s) failed to close cleanly for team {team_id}",
            failures.len()
        );
    }

    for session_id in &ids {
        state.layouts.prune_session(team_id, session_id);
    }
}

/// Snapshot of a team's sessions, in registration order.
pub fn list_terminals(state: &AppState, team_id: &str) -> Vec<SessionEntry> {
    state.registry.list_sessions(team_id)
}

/// Toggle the focus overlay on a session: focusing the focused session
/// clears it, any other session takes focus directly. Surfaces stay
/// mounted either way; focus only changes visibility.
pub fn toggle_focus(state: &AppState, session_id: &str) -> Option<String> {
    state.focus.toggle(session_id)
}

/// Escape signal: always leaves the focus overlay.
pub fn escape_focus(state: &AppState) {
    state.focus.escape();
}

/// The session whose surface should be fully visible for a team, already
/// validated against the team's live set. A focused id whose session died
/// renders as unfocused.
pub fn focused_session(state: &AppState, team_id: &str) -> Option<String> {
    let live = state.registry.list_sessions(team_id);
    state.focus.visible_in(&live)
}

/// The CLI variants the host can spawn.
pub async fn detect_clis(state: &AppState) -> Result<Vec<CliInfo>, String> {
    state
        .host
        .detect_clis()
        .await
        .map_err(|e| format!("Failed to detect CLIs: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::test_state;
    use bullpen_host::ChannelSink;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    async fn create(state: &AppState, team: &str, name: &str) -> String {
        create_terminal(state, team, name, "/tmp", "claude", None, None)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_validates_cli_type() {
        let (_host, state) = test_state();

        let err = create_terminal(&state, "t1", "a", "/tmp", "telnet", None, None)
            .await
            .unwrap_err();
        assert!(err.contains("unknown CLI type"));
        assert!(state.registry.list_sessions("t1").is_empty());
    }

    #[tokio::test]
    async fn test_create_failure_is_surfaced() {
        let (host, state) = test_state();
        host.fail_create.store(true, Ordering::Relaxed);

        let err = create_terminal(&state, "t1", "a", "/tmp", "claude", None, None)
            .await
            .unwrap_err();
        assert!(err.contains("Failed to create terminal session"));
        assert!(state.registry.list_sessions("t1").is_empty());
    }

    #[tokio::test]
    async fn test_create_attach_write_close_flow() {
        let (host, state) = test_state();
        let id = create(&state, "t1", "alice").await;

        let (sink, mut rx) = ChannelSink::new();
        attach_terminal(&state, &id, Arc::new(sink)).await.unwrap();

        host.push_output(&id, b"hello");
        let chunk = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(chunk, b"hello");

        write_input(&state, &id, b"ls\n").await.unwrap();
        assert_eq!(host.writes.lock().unwrap().len(), 1);

        close_terminal(&state, "t1", &id).await;
        assert!(state.registry.list_sessions("t1").is_empty());
        assert!(!state.mux.attached(&id));
        assert_eq!(host.closed.lock().unwrap().as_slice(), [id.clone()]);

        // Late chunk after close: silently discarded.
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!host.push_output(&id, b"late"));
    }

    #[tokio::test]
    async fn test_stale_references_are_noops() {
        let (_host, state) = test_state();

        attach_terminal(&state, "ghost", Arc::new(ChannelSink::new().0))
            .await
            .unwrap();
        write_input(&state, "ghost", b"x").await.unwrap();
        resize_terminal(&state, "ghost", 80, 24);
        close_terminal(&state, "t1", "ghost").await;

        let restarted = restart_terminal(&state, "t1", "ghost").await.unwrap();
        assert_eq!(restarted, "ghost");
    }

    #[tokio::test]
    async fn test_restart_rekeys_everything() {
        let (host, state) = test_state();
        let id = create(&state, "t1", "alice").await;

        let (sink, mut rx) = ChannelSink::new();
        attach_terminal(&state, &id, Arc::new(sink)).await.unwrap();
        state.focus.toggle(&id);
        let before = state.layouts.sync_team("t1", &state.registry.live_ids("t1"));

        let new_id = restart_terminal(&state, "t1", &id).await.unwrap();
        assert_ne!(new_id, id);

        // Registry re-keyed, slot preserved.
        let live = state.registry.list_sessions("t1");
        assert_eq!(live[0].session_id, new_id);
        assert_eq!(live[0].slot_index, 0);

        // Subscription follows the new identity with the same sink.
        tokio::time::sleep(Duration::from_millis(20)).await;
        host.push_output(&new_id, b"back");
        let chunk = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(chunk, b"back");

        // Layout rectangle and focus follow too.
        let after = state.layouts.snapshot("t1");
        assert_eq!(after[0].session_id, new_id);
        assert_eq!((after[0].x, after[0].y), (before[0].x, before[0].y));
        assert_eq!(state.focus.current().as_deref(), Some(new_id.as_str()));
    }

    #[tokio::test]
    async fn test_close_team_terminals_clears_everything() {
        let (host, state) = test_state();
        let a = create(&state, "t1", "a").await;
        let b = create(&state, "t1", "b").await;

        attach_terminal(&state, &a, Arc::new(ChannelSink::new().0))
            .await
            .unwrap();
        attach_terminal(&state, &b, Arc::new(ChannelSink::new().0))
            .await
            .unwrap();
        state.focus.toggle(&a);
        state.layouts.sync_team("t1", &state.registry.live_ids("t1"));

        host.fail_close.lock().unwrap().insert(a.clone());
        close_team_terminals(&state, "t1").await;

        assert!(state.registry.list_sessions("t1").is_empty());
        assert!(!state.mux.attached(&a));
        assert!(!state.mux.attached(&b));
        assert_eq!(state.focus.current(), None);
        assert!(state.layouts.snapshot("t1").is_empty());
    }

    #[tokio::test]
    async fn test_resize_commits_coalesced() {
        let (host, state) = test_state();
        let id = create(&state, "t1", "alice").await;

        resize_terminal(&state, &id, 80, 24);
        resize_terminal(&state, &id, 100, 30);

        // Past the quiet window, only the final geometry reached the host.
        tokio::time::sleep(Duration::from_millis(120)).await;
        let resizes = host.resizes.lock().unwrap().clone();
        assert_eq!(resizes, vec![(id, 100, 30)]);
    }

    #[tokio::test]
    async fn test_focus_invalidated_by_close() {
        let (_host, state) = test_state();
        let id = create(&state, "t1", "alice").await;

        toggle_focus(&state, &id);
        assert_eq!(focused_session(&state, "t1"), Some(id.clone()));

        close_terminal(&state, "t1", &id).await;
        assert_eq!(focused_session(&state, "t1"), None);
        assert_eq!(state.focus.current(), None);
    }

    #[tokio::test]
    async fn test_detect_clis_passthrough() {
        let (_host, state) = test_state();
        let clis = detect_clis(&state).await.unwrap();
        assert!(clis.iter().any(|c| c.cli_type == CliType::Claude));
    }
}
