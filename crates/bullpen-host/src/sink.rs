use tokio::sync::mpsc;

/// Where a session's output chunks land: one sink per mounted rendering
/// surface. Implementations must be cheap and non-blocking; chunk order is
/// the caller's guarantee, delivery of each chunk exactly once is ours.
pub trait OutputSink: Send + Sync {
    fn push_chunk(&self, data: &[u8]);
}

/// Channel-backed sink: forwards chunks into an in-process channel the
/// rendering surface drains. Chunks pushed after the receiver is gone are
/// silently discarded.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Vec<u8>>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Vec<u8>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl OutputSink for ChannelSink {
    fn push_chunk(&self, data: &[u8]) {
        let _ = self.tx.send(data.to_vec());
    }
}
