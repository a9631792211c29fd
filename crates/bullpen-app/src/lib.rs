//! Orchestration core of the bullpen multi-agent terminal workspace.
//!
//! Owns the authoritative session registry per team, binds one output
//! subscription per live session to its rendering sink, keeps fixed-grid
//! and freeform layout state consistent under session churn, and tracks
//! the focus overlay. The process host (which spawns and owns the
//! pseudo-terminals) and the rendering shell are external; they meet this
//! crate at [`bullpen_host::ProcessHost`] and the [`commands`] surface.
//!
//! Everything is composed explicitly at the application root: construct an
//! [`AppState`] from a host handle and an open database, then drive it
//! through the command functions.

pub mod coalescer;
pub mod commands;
pub mod feed;
pub mod focus;
pub mod layouts;
pub mod multiplexer;
pub mod registry;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use state::AppState;
