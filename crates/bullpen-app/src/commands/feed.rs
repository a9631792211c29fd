//! Commands for the communication feed: message ingest and presence.

use std::collections::HashMap;

use crate::feed::{self, AgentPresence, Message};
use crate::state::AppState;

/// Merge a batch of incoming room messages (from the external event bus).
/// Returns how many were new.
pub fn ingest_messages(state: &AppState, room: &str, batch: Vec<Message>) -> usize {
    state.feed.merge_messages(room, batch)
}

/// Replace a room's presence map wholesale.
pub fn set_presence(state: &AppState, room: &str, agents: HashMap<String, AgentPresence>) {
    state.feed.set_presence(room, agents);
}

pub fn room_messages(state: &AppState, room: &str) -> Vec<Message> {
    state.feed.messages(room)
}

pub fn room_presence(state: &AppState, room: &str) -> HashMap<String, AgentPresence> {
    state.feed.presence(room)
}

/// Names of the agents active in a room as of `now_secs`, sorted for a
/// stable display order.
pub fn active_agents(state: &AppState, room: &str, now_secs: u64) -> Vec<String> {
    let mut names: Vec<String> = state
        .feed
        .presence(room)
        .into_iter()
        .filter(|(_, p)| feed::is_active(p, now_secs))
        .map(|(name, _)| name)
        .collect();
    names.sort();
    names
}
