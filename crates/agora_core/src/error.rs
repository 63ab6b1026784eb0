use thiserror::Error;

/// Closed failure taxonomy shared by every layer of the chat core.
///
/// Expected failures are returned, not thrown: every public operation in the
/// connection manager and the orchestrator yields `Result<T, AgoraError>`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AgoraError {
    /// Malformed or missing request fields. Client-caused, locally recoverable.
    #[error("validation error: {0}")]
    Validation(String),

    /// Required deployment configuration is absent (e.g. the MCP server path).
    #[error("environment error: {0}")]
    Environment(String),

    /// Transport failure: establishing, tearing down, or communicating over
    /// the MCP connection.
    #[error("MCP client error: {0}")]
    Client(String),

    /// The tool-invocation capability reported a failure after a connection
    /// existed.
    #[error("MCP service error: {0}")]
    Service(String),

    /// Failure persisting an interaction log entry. Never fatal to the caller.
    #[error("storage error: {0}")]
    Storage(String),
}

impl AgoraError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn environment(msg: impl Into<String>) -> Self {
        Self::Environment(msg.into())
    }

    pub fn client(msg: impl Into<String>) -> Self {
        Self::Client(msg.into())
    }

    pub fn service(msg: impl Into<String>) -> Self {
        Self::Service(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// The carried message without the kind prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Validation(m)
            | Self::Environment(m)
            | Self::Client(m)
            | Self::Service(m)
            | Self::Storage(m) => m,
        }
    }
}

pub type Result<T> = std::result::Result<T, AgoraError>;
