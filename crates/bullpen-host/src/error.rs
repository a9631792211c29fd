/// Errors from process-host operations.
#[derive(Debug)]
pub enum HostError {
    CreateFailed(String),
    CloseFailed(String),
    WriteFailed(String),
    ResizeFailed(String),
    SubscribeFailed(String),
    SessionNotFound(String),
    IoError(std::io::Error),
}

impl std::fmt::Display for HostError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HostError::CreateFailed(msg) => write!(f, "session create failed: {msg}"),
            HostError::CloseFailed(msg) => write!(f, "session close failed: {msg}"),
            HostError::WriteFailed(msg) => write!(f, "session write failed: {msg}"),
            HostError::ResizeFailed(msg) => write!(f, "session resize failed: {msg}"),
            HostError::SubscribeFailed(msg) => write!(f, "output subscribe failed: {msg}"),
            HostError::SessionNotFound(id) => write!(f, "no such session: {id}"),
            HostError::IoError(err) => write!(f, "host I/O error: {err}"),
        }
    }
}

impl std::error::Error for HostError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HostError::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for HostError {
    fn from(err: std::io::Error) -> Self {
        HostError::IoError(err)
    }
}
