//! Per-room message and presence aggregation for the communication feed.
//!
//! Messages accumulate append-only, deduplicated by id; presence records
//! are replaced wholesale on every update. "Active" is a read-time
//! predicate over `last_seen`, not stored state.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

/// An agent counts as active while its last heartbeat is younger than this.
pub const PRESENCE_ACTIVE_WINDOW_SECS: u64 = 300;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub from: String,
    pub to: String,
    pub content: String,
    pub timestamp: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub expects_reply: bool,
    pub priority: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentPresence {
    pub role: String,
    pub joined_at: String,
    /// Unix seconds of the agent's last heartbeat.
    pub last_seen: u64,
}

/// Pure activity predicate: seen within the window as of `now_secs`.
pub fn is_active(presence: &AgentPresence, now_secs: u64) -> bool {
    now_secs.saturating_sub(presence.last_seen) < PRESENCE_ACTIVE_WINDOW_SECS
}

#[derive(Default)]
struct RoomFeed {
    messages: Vec<Message>,
    agents: HashMap<String, AgentPresence>,
}

pub struct FeedAggregator {
    rooms: Mutex<HashMap<String, RoomFeed>>,
}

impl FeedAggregator {
    pub fn new() -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
        }
    }

    /// Merge a batch of incoming messages into a room: anything whose id
    /// is already present is dropped, the rest append in arrival order.
    /// Returns how many were actually appended.
    pub fn merge_messages(&self, room: &str, batch: Vec<Message>) -> usize {
        let mut rooms = self.rooms.lock().expect("feed state poisoned");
        let feed = rooms.entry(room.to_string()).or_default();

        let existing: std::collections::HashSet<i64> =
            feed.messages.iter().map(|m| m.id).collect();

        let mut appended = 0;
        let mut seen_in_batch = std::collections::HashSet::new();
        for message in batch {
            if existing.contains(&message.id) || !seen_in_batch.insert(message.id) {
                continue;
            }
            feed.messages.push(message);
            appended += 1;
        }
        appended
    }

    /// Replace a room's presence map wholesale.
    pub fn set_presence(&self, room: &str, agents: HashMap<String, AgentPresence>) {
        let mut rooms = self.rooms.lock().expect("feed state poisoned");
        rooms.entry(room.to_string()).or_default().agents = agents;
    }

    pub fn messages(&self, room: &str) -> Vec<Message> {
        let rooms = self.rooms.lock().expect("feed state poisoned");
        rooms
            .get(room)
            .map(|f| f.messages.clone())
            .unwrap_or_default()
    }

    pub fn presence(&self, room: &str) -> HashMap<String, AgentPresence> {
        let rooms = self.rooms.lock().expect("feed state poisoned");
        rooms
            .get(room)
            .map(|f| f.agents.clone())
            .unwrap_or_default()
    }
}

impl Default for FeedAggregator {
    fn default() -> Self {
        Self::new()
    }
}
