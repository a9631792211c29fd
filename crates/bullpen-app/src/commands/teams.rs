//! Commands for team management and active-team selection.

use bullpen_db::teams::{self, AgentConfig, Team};
use bullpen_db::settings;
use bullpen_layout::GridSpec;

use crate::commands::terminal;
use crate::state::AppState;

/// Settings key remembering the last active team across restarts.
pub const SETTING_ACTIVE_TEAM: &str = "active_team";

/// Load teams from the store and restore the active-team selection: the
/// remembered team if it still exists, otherwise the first team.
pub fn load_teams(state: &AppState) -> Result<Vec<Team>, String> {
    let (all, remembered) = {
        let conn = state.db.lock().map_err(|e| format!("Lock error: {e}"))?;
        let all = teams::list_teams(&conn).map_err(|e| format!("Failed to load teams: {e}"))?;
        let remembered = settings::get(&conn, SETTING_ACTIVE_TEAM)
            .ok()
            .flatten();
        (all, remembered)
    };

    let active = remembered
        .filter(|id| all.iter().any(|t| &t.id == id))
        .or_else(|| all.first().map(|t| t.id.clone()));

    *state.active_team.lock().expect("active team poisoned") = active;
    Ok(all)
}

pub fn list_teams(state: &AppState) -> Result<Vec<Team>, String> {
    let conn = state.db.lock().map_err(|e| format!("Lock error: {e}"))?;
    teams::list_teams(&conn).map_err(|e| format!("Failed to list teams: {e}"))
}

pub fn get_team(state: &AppState, team_id: &str) -> Result<Option<Team>, String> {
    let conn = state.db.lock().map_err(|e| format!("Lock error: {e}"))?;
    teams::get_team(&conn, team_id).map_err(|e| format!("Failed to read team: {e}"))
}

/// Create a team and make it active.
pub async fn create_team(
    state: &AppState,
    name: &str,
    grid_layout: &str,
    agents: &[AgentConfig],
) -> Result<Team, String> {
    if !GridSpec::is_valid_descriptor(grid_layout) {
        return Err(format!("invalid grid layout: {grid_layout}"));
    }

    let team = {
        let conn = state.db.lock().map_err(|e| format!("Lock error: {e}"))?;
        teams::create_team(&conn, name, grid_layout, agents)
            .map_err(|e| format!("Failed to create team: {e}"))?
    };

    set_active_team(state, &team.id).await?;
    Ok(team)
}

/// Update a team's name, layout descriptor, or agent templates.
///
/// Changing the grid descriptor never moves or destroys sessions; it only
/// changes how many cells the fixed grid shows.
pub fn update_team(
    state: &AppState,
    team_id: &str,
    name: &str,
    grid_layout: &str,
    agents: &[AgentConfig],
) -> Result<Team, String> {
    if !GridSpec::is_valid_descriptor(grid_layout) {
        return Err(format!("invalid grid layout: {grid_layout}"));
    }

    let conn = state.db.lock().map_err(|e| format!("Lock error: {e}"))?;
    teams::update_team(&conn, team_id, name, grid_layout, agents)
        .map_err(|e| format!("Failed to update team: {e}"))?
        .ok_or_else(|| format!("team not found: {team_id}"))
}

/// Delete a team: best-effort close of its sessions, then drop its layout
/// and store row. The active selection moves to the first remaining team.
pub async fn delete_team(state: &AppState, team_id: &str) -> Result<(), String> {
    terminal::close_team_terminals(state, team_id).await;
    state.layouts.drop_team(team_id);

    let remaining = {
        let conn = state.db.lock().map_err(|e| format!("Lock error: {e}"))?;
        teams::delete_team(&conn, team_id).map_err(|e| format!("Failed to delete team: {e}"))?;
        teams::list_teams(&conn).map_err(|e| format!("Failed to list teams: {e}"))?
    };

    let was_active = {
        let active = state.active_team.lock().expect("active team poisoned");
        active.as_deref() == Some(team_id)
    };
    if was_active {
        match remaining.first() {
            Some(next) => set_active_team(state, &next.id).await?,
            None => {
                *state.active_team.lock().expect("active team poisoned") = None;
                let conn = state.db.lock().map_err(|e| format!("Lock error: {e}"))?;
                if let Err(e) = settings::delete(&conn, SETTING_ACTIVE_TEAM) {
                    log::warn!("failed to clear remembered active team: {e}");
                }
            }
        }
    }

    Ok(())
}

/// Switch the active team. Surfaces of the outgoing team are dismounted by
/// the renderer, so their output subscriptions are dropped here — a team
/// switch must not leak subscriptions.
pub async fn set_active_team(state: &AppState, team_id: &str) -> Result<(), String> {
    if get_team(state, team_id)?.is_none() {
        return Err(format!("team not found: {team_id}"));
    }

    let previous = {
        let active = state.active_team.lock().expect("active team poisoned");
        active.clone()
    };
    if previous.as_deref() == Some(team_id) {
        return Ok(());
    }

    if let Some(previous) = previous {
        let outgoing = state.registry.live_ids(&previous);
        state.mux.detach_all(&outgoing).await;
        for session_id in &outgoing {
            state.resizer.forget(session_id);
        }
    }

    *state.active_team.lock().expect("active team poisoned") = Some(team_id.to_string());

    let conn = state.db.lock().map_err(|e| format!("Lock error: {e}"))?;
    if let Err(e) = settings::set(&conn, SETTING_ACTIVE_TEAM, team_id) {
        log::warn!("failed to remember active team: {e}");
    }
    Ok(())
}

pub fn active_team(state: &AppState) -> Option<String> {
    state
        .active_team
        .lock()
        .expect("active team poisoned")
        .clone()
}
