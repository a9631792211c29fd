//! Pure layout math for the bullpen workspace.
//!
//! Two independent regimes, selected by a team's grid descriptor: fixed
//! grids (`"2x3"` and friends) place sessions by their stable slot index,
//! while the freeform canvas (`"custom"`) tracks one positioned rectangle
//! per session. Nothing in this crate performs I/O; callers own persistence
//! and session membership.

pub mod freeform;
pub mod grid;

pub use freeform::LayoutItem;
pub use grid::{GridSlot, GridSpec};
