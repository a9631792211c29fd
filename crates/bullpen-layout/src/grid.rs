use std::collections::HashMap;

use serde::Serialize;

/// Descriptor token for the freeform canvas regime.
pub const CUSTOM_LAYOUT: &str = "custom";

/// A parsed grid descriptor: either a fixed `cols x rows` grid or the
/// freeform canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridSpec {
    Fixed { cols: u16, rows: u16 },
    Custom,
}

impl GridSpec {
    /// Parse a grid descriptor (`"2x2"`, `"3x4"`, `"custom"`, ...).
    ///
    /// Malformed tokens fall back to a 1x1 grid rather than failing; team
    /// create/update validates descriptors up front via
    /// [`GridSpec::is_valid_descriptor`], so the fallback only covers data
    /// that predates validation.
    pub fn parse(descriptor: &str) -> Self {
        if descriptor == CUSTOM_LAYOUT {
            return GridSpec::Custom;
        }
        Self::parse_fixed(descriptor).unwrap_or(GridSpec::Fixed { cols: 1, rows: 1 })
    }

    fn parse_fixed(descriptor: &str) -> Option<Self> {
        let (cols, rows) = descriptor.split_once('x')?;
        let cols: u16 = cols.parse().ok()?;
        let rows: u16 = rows.parse().ok()?;
        if cols == 0 || rows == 0 {
            return None;
        }
        Some(GridSpec::Fixed { cols, rows })
    }

    /// Whether a descriptor names a real layout (strict, for validation).
    pub fn is_valid_descriptor(descriptor: &str) -> bool {
        descriptor == CUSTOM_LAYOUT || Self::parse_fixed(descriptor).is_some()
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, GridSpec::Custom)
    }

    /// Number of cells in the grid; `None` means unbounded (freeform).
    pub fn capacity(&self) -> Option<u32> {
        match self {
            GridSpec::Fixed { cols, rows } => Some(u32::from(*cols) * u32::from(*rows)),
            GridSpec::Custom => None,
        }
    }

    pub fn cols(&self) -> u16 {
        match self {
            GridSpec::Fixed { cols, .. } => *cols,
            GridSpec::Custom => 1,
        }
    }

    pub fn rows(&self) -> u16 {
        match self {
            GridSpec::Fixed { rows, .. } => *rows,
            GridSpec::Custom => 1,
        }
    }
}

/// One cell of a fixed grid: either a live session's payload or an
/// empty/setup placeholder at a given slot index.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GridSlot<T> {
    Occupied(T),
    Empty { slot_index: u32 },
}

/// Assign sessions to grid cells by slot index.
///
/// `sessions` pairs each payload with its slot index. Every cell in
/// `[0, capacity)` is emitted: occupied where a session claims that slot,
/// a placeholder otherwise. Sessions whose slot index falls outside the
/// current capacity are not emitted at all — they stay live but are not
/// reachable from the fixed grid view.
///
/// Returns an empty vec for the freeform regime (unbounded capacity).
pub fn assign_slots<T: Clone>(spec: &GridSpec, sessions: &[(u32, T)]) -> Vec<GridSlot<T>> {
    let Some(capacity) = spec.capacity() else {
        return Vec::new();
    };

    let by_slot: HashMap<u32, &T> = sessions.iter().map(|(slot, t)| (*slot, t)).collect();

    (0..capacity)
        .map(|i| match by_slot.get(&i) {
            Some(t) => GridSlot::Occupied((*t).clone()),
            None => GridSlot::Empty { slot_index: i },
        })
        .collect()
}

/// Group cells into rows of `cols` contiguous slots for row-major rendering.
pub fn slot_rows<T>(slots: Vec<GridSlot<T>>, cols: u16) -> Vec<Vec<GridSlot<T>>> {
    let cols = usize::from(cols.max(1));
    let mut rows = Vec::with_capacity(slots.len().div_ceil(cols));
    let mut iter = slots.into_iter().peekable();
    while iter.peek().is_some() {
        rows.push(iter.by_ref().take(cols).collect());
    }
    rows
}

/// The slot index a newly added session gets when the caller doesn't pick
/// one: one past the highest index in use (indices are never reused, so
/// removal leaves gaps rather than renumbering survivors).
pub fn next_slot_index(taken: &[u32]) -> u32 {
    taken.iter().max().map(|max| max + 1).unwrap_or(0)
}
