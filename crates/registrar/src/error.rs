//! Unified error type for the Registrar client.

use registrar_gateway::GatewayError;
use registrar_protocol::ProtocolError;
use registrar_session::SessionError;
use registrar_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `registrar` meta-crate, you deal with this single
/// error type instead of importing errors from each sub-crate.
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum RegistrarError {
    /// A transport-level error (client setup, send, receive).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A failed call: rejected, unreachable, or an expired session.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// A session-level error (sign-in refused, missing identity).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A configuration value could not be used.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl RegistrarError {
    /// Whether this error means the session could not be recovered.
    pub fn is_session_expired(&self) -> bool {
        match self {
            Self::Gateway(e) | Self::Session(SessionError::Request(e)) => e.is_session_expired(),
            _ => false,
        }
    }
}
