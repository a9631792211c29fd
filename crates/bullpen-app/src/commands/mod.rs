//! The surface a rendering shell binds to: synchronous snapshot queries
//! plus the commands that mutate orchestration state. One module per
//! concern.

pub mod feed;
pub mod layout;
pub mod teams;
pub mod terminal;
