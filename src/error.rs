use thiserror::Error;

/// Errors raised while connecting to or talking with an RFB server.
#[derive(Debug, Error)]
pub enum VncError {
    /// The transport reached EOF or was reset mid-message.
    #[error("transport closed: {0}")]
    Transport(#[from] std::io::Error),

    /// The server refused the connection at security negotiation.
    #[error("server rejected the connection: {0}")]
    HandshakeRejected(String),

    /// No security type on offer matches the supplied credentials.
    #[error("no acceptable security type offered for the supplied credentials")]
    AuthUnsupported,

    /// Apple authentication needs both a username and a password.
    #[error("username and password are both required for Apple authentication")]
    CredentialsRequired,

    /// The server rejected the credentials after the exchange.
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// A malformed message, unknown encoding or inconsistent length.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// A key-agreement or cipher failure.
    #[error("crypto failure: {0}")]
    Crypto(String),

    /// A key name that is not in the keysym table.
    #[error("unrecognised key name: {0:?}")]
    UnknownKey(String),
}
