use thiserror::Error;

/// Failures surfaced by the remote processing client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// No interpretable response: connection failure, timeout or non-2xx status.
    #[error("network error: {0}")]
    Network(String),

    /// Well-formed reply with `success: false`.
    #[error("{0}")]
    Remote(String),

    /// Reply that is not JSON or lacks an expected field.
    #[error("unexpected response: {0}")]
    Protocol(String),
}

pub type RemoteResult<T> = std::result::Result<T, RemoteError>;
