use thiserror::Error;

/// Everything that can go wrong while driving the client.
///
/// Every variant is recovered where it occurs and surfaced to the user as
/// a status line; callers only see these to decide an exit code or to log.
/// No variant is retried automatically.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Initialization failed: {0}")]
    Initialization(String),

    #[error("Login failed: {0}")]
    Login(String),

    #[error("Logout failed: {0}")]
    Logout(String),

    /// An operation that needs a transport handle was invoked without one.
    #[error("No session is active")]
    LoginRequired,

    #[error("No file selected")]
    NoFileSelected,

    #[error("File size exceeds the {0} byte upload limit")]
    SizeCapExceeded(u64),

    #[error("Upload failed: {0}")]
    RemoteUpload(String),

    #[error("Listing failed: {0}")]
    RemoteList(String),
}
