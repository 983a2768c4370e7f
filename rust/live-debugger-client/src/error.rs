use thiserror::Error;

/// The common error type used by this crate
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LiveDebuggerError {
    /// The page carries no debugger config meta tag
    #[error("Debugger config meta tag is missing")]
    MissingConfig,

    /// The config meta tag is present but unusable
    #[error("Invalid debugger config: {0}")]
    InvalidConfig(String),

    /// Connecting to, or pushing over, the debugger channel failed
    #[error("Debugger channel error: {0}")]
    Transport(String),

    /// An inbound channel event could not be decoded
    #[error("Malformed channel event: {0}")]
    Protocol(String),

    /// A browser API call failed
    #[error("Browser API call failed: {0}")]
    Platform(String),
}

impl From<serde_json::Error> for LiveDebuggerError {
    fn from(error: serde_json::Error) -> Self {
        LiveDebuggerError::Protocol(format!("{error}"))
    }
}
