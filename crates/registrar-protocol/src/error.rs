//! Error types for the protocol layer.
//!
//! A `ProtocolError` always means a body could not be turned into (or out
//! of) the shape the caller asked for. Network problems live in
//! `TransportError`, rejected calls in the gateway's error type.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serializing a request body failed.
    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// A response body was not valid JSON, or did not match the expected
    /// type.
    #[error("decode failed: {0}")]
    Decode(#[source] serde_json::Error),

    /// The response was well-formed but not what the caller can use,
    /// e.g. decoding a typed payload out of a no-content envelope.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
