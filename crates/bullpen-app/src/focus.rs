//! Focus overlay state: at most one session elevated to full visibility.
//!
//! Focus is UI-only and never persisted. While focused, every live
//! surface stays mounted (subscriptions untouched); only visibility
//! changes — so toggling focus never churns subscribe/unsubscribe.

use std::sync::Mutex;

use crate::registry::SessionEntry;

pub struct FocusTracker {
    focused: Mutex<Option<String>>,
}

impl FocusTracker {
    pub fn new() -> Self {
        Self {
            focused: Mutex::new(None),
        }
    }

    /// Toggle focus on a session: focusing the already-focused id clears
    /// it, anything else focuses that id directly (no unfocus step in
    /// between). Returns the new state.
    pub fn toggle(&self, session_id: &str) -> Option<String> {
        let mut focused = self.focused.lock().expect("focus state poisoned");
        *focused = match focused.as_deref() {
            Some(current) if current == session_id => None,
            _ => Some(session_id.to_string()),
        };
        focused.clone()
    }

    /// Escape signal: always ends up unfocused.
    pub fn escape(&self) {
        *self.focused.lock().expect("focus state poisoned") = None;
    }

    /// Clear focus if it points at this session (called on removal).
    pub fn invalidate(&self, session_id: &str) {
        let mut focused = self.focused.lock().expect("focus state poisoned");
        if focused.as_deref() == Some(session_id) {
            *focused = None;
        }
    }

    /// Follow a session identity re-keyed by a restart.
    pub fn rekey(&self, old_id: &str, new_id: &str) {
        let mut focused = self.focused.lock().expect("focus state poisoned");
        if focused.as_deref() == Some(old_id) {
            *focused = Some(new_id.to_string());
        }
    }

    /// Raw state, which may reference a session that no longer exists.
    /// Renderers should use [`FocusTracker::visible_in`] instead.
    pub fn current(&self) -> Option<String> {
        self.focused.lock().expect("focus state poisoned").clone()
    }

    /// The focused session id, but only if it is present in the given
    /// live set — the render-time liveness check that keeps a stale
    /// focused id from holding the UI in a broken focused view.
    pub fn visible_in(&self, live: &[SessionEntry]) -> Option<String> {
        let focused = self.focused.lock().expect("focus state poisoned");
        focused
            .as_deref()
            .filter(|id| live.iter().any(|s| s.session_id == *id))
            .map(str::to_string)
    }
}

impl Default for FocusTracker {
    fn default() -> Self {
        Self::new()
    }
}
