//! The external process-host boundary.
//!
//! The host that actually spawns and owns the underlying pseudo-terminal
//! processes lives outside this workspace; everything here is the contract
//! the orchestration core talks through: the [`ProcessHost`] trait, the
//! closed [`CliType`] enumeration, and the [`OutputSink`] rendering-sink
//! side of the stream plumbing.

mod error;
mod host;
mod sink;
mod types;

pub use error::HostError;
pub use host::{OutputStream, ProcessHost};
pub use sink::{ChannelSink, OutputSink};
pub use types::{CliInfo, CliType, SessionSpec};
