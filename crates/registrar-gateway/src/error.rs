//! Error type for the gateway.

use registrar_protocol::ProtocolError;
use registrar_transport::TransportError;

/// Message carried by a call that failed because the session could not be
/// recovered.
pub const SESSION_EXPIRED_MESSAGE: &str = "session expired";

/// Why a call through the gateway failed.
///
/// Every variant's `Display` is the human-readable reason a page would show
/// next to the form that made the call.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The backing service answered with a failing status. `message` is the
    /// body's error field, verbatim, or a generic fallback.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// The credential was rejected and refreshing it failed at the
    /// transport level. The session coordinator has been notified.
    #[error("session expired")]
    SessionExpired,

    /// The backing service could not be reached.
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),

    /// A successful response had a body that could not be parsed, or a
    /// request body could not be encoded.
    #[error("malformed message: {0}")]
    Protocol(#[from] ProtocolError),
}

impl GatewayError {
    /// Returns `true` if this failure ended the session.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Self::SessionExpired)
    }

    /// The HTTP status of a rejected call.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}
