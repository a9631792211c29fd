use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Width of the freeform canvas in grid-cell units.
pub const TOTAL_COLUMNS: u32 = 12;

/// Default rectangle for a newly synthesized item.
pub const DEFAULT_W: u32 = 6;
pub const DEFAULT_H: u32 = 8;

/// Smallest rectangle a session surface can be dragged down to.
pub const MIN_W: u32 = 3;
pub const MIN_H: u32 = 4;

/// One positioned, resizable rectangle bound to a session on the freeform
/// canvas. All coordinates are integer grid-cell units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutItem {
    pub session_id: String,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
    pub min_w: u32,
    pub min_h: u32,
}

impl LayoutItem {
    /// Whether the item already satisfies every geometry invariant.
    pub fn is_normalized(&self) -> bool {
        *self == normalize(self)
    }
}

/// Clamp an item back inside the canvas invariants: `w` within
/// `[min_w, TOTAL_COLUMNS]`, `x` within `[0, TOTAL_COLUMNS - w]`, `h`
/// floored at `min_h`. Out-of-range geometry from drag/resize input is
/// always recovered this way, never rejected. Idempotent.
pub fn normalize(item: &LayoutItem) -> LayoutItem {
    let min_w = item.min_w.clamp(1, TOTAL_COLUMNS);
    let min_h = item.min_h.max(1);
    let w = item.w.clamp(min_w, TOTAL_COLUMNS);
    let x = item.x.min(TOTAL_COLUMNS - w);
    let h = item.h.max(min_h);

    LayoutItem {
        session_id: item.session_id.clone(),
        x,
        y: item.y,
        w,
        h,
        min_w,
        min_h,
    }
}

/// Deterministic default placement for the item at position `ordinal` in
/// the layout: default-sized rectangles packed left to right, wrapping to a
/// new row when the next one would overflow the column count.
pub fn default_item(session_id: &str, ordinal: usize) -> LayoutItem {
    let per_row = (TOTAL_COLUMNS / DEFAULT_W).max(1);
    let ordinal = ordinal as u32;

    LayoutItem {
        session_id: session_id.to_string(),
        x: (ordinal % per_row) * DEFAULT_W,
        y: (ordinal / per_row) * DEFAULT_H,
        w: DEFAULT_W,
        h: DEFAULT_H,
        min_w: MIN_W,
        min_h: MIN_H,
    }
}

/// Reconcile a stored layout with the live session set.
///
/// Items whose session is still live are retained (normalized, duplicates
/// collapsed to the first occurrence); items for dead sessions are dropped;
/// live sessions with no item get a synthesized default placement. The
/// result is ordered by `live` (session append order), which keeps the
/// synthesized packing deterministic. Syncing an already-synced layout is a
/// no-op up to [`signature`] equality.
pub fn sync(items: &[LayoutItem], live: &[String]) -> Vec<LayoutItem> {
    let mut by_id: HashMap<&str, &LayoutItem> = HashMap::with_capacity(items.len());
    for item in items {
        by_id.entry(item.session_id.as_str()).or_insert(item);
    }

    let mut out = Vec::with_capacity(live.len());
    for session_id in live {
        match by_id.get(session_id.as_str()) {
            Some(item) => out.push(normalize(item)),
            None => out.push(default_item(session_id, out.len())),
        }
    }
    out
}

/// Canonical signature of a layout: items sorted by session identity, with
/// normalized coordinates concatenated. Two layouts with equal signatures
/// are geometrically identical, so persistence writes can be skipped.
pub fn signature(items: &[LayoutItem]) -> String {
    let mut normalized: Vec<LayoutItem> = items.iter().map(normalize).collect();
    normalized.sort_by(|a, b| a.session_id.cmp(&b.session_id));

    let parts: Vec<String> = normalized
        .iter()
        .map(|i| format!("{}:{}:{}:{}:{}", i.session_id, i.x, i.y, i.w, i.h))
        .collect();
    parts.join("|")
}
