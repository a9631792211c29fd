//! Snapshot queries and commands for both layout regimes.

use bullpen_layout::grid::{self, GridSlot};
use bullpen_layout::{GridSpec, LayoutItem};

use crate::registry::SessionEntry;
use crate::state::AppState;

use super::teams;

/// Row-major cells for a fixed-grid team: each cell is either a session or
/// an empty/setup placeholder carrying its slot index. Sessions whose slot
/// index falls outside the current capacity stay live but don't appear.
pub fn grid_slots(
    state: &AppState,
    team_id: &str,
) -> Result<Vec<Vec<GridSlot<SessionEntry>>>, String> {
    let team = teams::get_team(state, team_id)?.ok_or_else(|| format!("team not found: {team_id}"))?;

    let spec = GridSpec::parse(&team.grid_layout);
    if spec.is_custom() {
        return Err(format!("team {team_id} uses the freeform layout"));
    }

    let keyed: Vec<(u32, SessionEntry)> = state
        .registry
        .list_sessions(team_id)
        .into_iter()
        .map(|s| (s.slot_index, s))
        .collect();

    let slots = grid::assign_slots(&spec, &keyed);
    Ok(grid::slot_rows(slots, spec.cols()))
}

/// The slot index the next added session would get — what an "add
/// terminal" placeholder passes to `create_terminal`.
pub fn next_free_slot(state: &AppState, team_id: &str) -> u32 {
    let taken: Vec<u32> = state
        .registry
        .list_sessions(team_id)
        .iter()
        .map(|s| s.slot_index)
        .collect();
    grid::next_slot_index(&taken)
}

/// A freeform team's layout, reconciled with its live session set. Reading
/// an already-consistent layout performs no store write.
pub fn freeform_layout(state: &AppState, team_id: &str) -> Vec<LayoutItem> {
    let live = state.registry.live_ids(team_id);
    state.layouts.sync_team(team_id, &live)
}

/// Commit a settled drag/resize mutation. Geometry is clamped back into
/// the canvas invariants and items for dead sessions are dropped; the
/// result (what the renderer should show) is returned.
pub fn commit_freeform_layout(
    state: &AppState,
    team_id: &str,
    items: &[LayoutItem],
) -> Vec<LayoutItem> {
    let live = state.registry.live_ids(team_id);
    state.layouts.commit(team_id, items, &live)
}
