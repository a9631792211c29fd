use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::HostError;
use crate::types::{CliInfo, SessionSpec};

/// Raw output chunks for one session, in emission order.
///
/// Dropping the receiver is the unsubscribe: the host observes the closed
/// channel and stops forwarding. The multiplexer guarantees the drop
/// happens on every teardown path.
pub type OutputStream = mpsc::UnboundedReceiver<Vec<u8>>;

/// The external process host. All calls are asynchronous and fallible;
/// suspension of the orchestration loop happens only here (and at the
/// durable store).
#[async_trait]
pub trait ProcessHost: Send + Sync {
    /// Spawn a new session and return its identity.
    async fn create_session(&self, spec: SessionSpec) -> Result<String, HostError>;

    /// Rebind a session to a fresh underlying process.
    ///
    /// Hosts that cannot preserve identity across a restart return a new
    /// session id; callers must re-key their references to it.
    async fn restart_session(&self, session_id: &str) -> Result<String, HostError>;

    /// Terminate a session and release its stream.
    async fn close_session(&self, session_id: &str) -> Result<(), HostError>;

    /// Forward user input bytes, unmodified and in order.
    async fn write_to_session(&self, session_id: &str, data: &[u8]) -> Result<(), HostError>;

    /// Commit new pseudo-terminal dimensions.
    async fn resize_session(&self, session_id: &str, cols: u16, rows: u16)
        -> Result<(), HostError>;

    /// Open the output stream for a session. Subscribing again on the same
    /// identity replaces the previous stream on the host side.
    async fn subscribe_output(&self, session_id: &str) -> Result<OutputStream, HostError>;

    /// Enumerate the CLI variants this host can spawn.
    async fn detect_clis(&self) -> Result<Vec<CliInfo>, HostError>;
}
