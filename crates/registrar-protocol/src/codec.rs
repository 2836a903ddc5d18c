//! Codec trait and the JSON implementation used for every body.
//!
//! The backing service speaks JSON only, but request bodies and typed
//! payloads go through the [`Codec`] trait so the encoding lives in one
//! place and can be swapped in tests.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes request bodies and decodes response payloads.
///
/// `Send + Sync + 'static` because the codec is shared by every call the
/// gateway makes.
pub trait Codec: Send + Sync + 'static {
    /// The `Content-Type` value bodies from this codec are sent with.
    fn content_type(&self) -> &'static str;

    /// Serializes a value into body bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if the value cannot be represented.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes body bytes into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or do not
    /// match `T`.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// ## Example
///
/// ```rust
/// use registrar_protocol::{Codec, Credentials, JsonCodec};
///
/// let codec = JsonCodec;
/// let bytes = codec.encode(&Credentials::new("admin", "secret")).unwrap();
/// let value: serde_json::Value = codec.decode(&bytes).unwrap();
/// assert_eq!(value["username"], "admin");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
