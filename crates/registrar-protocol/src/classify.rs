//! Response classification: turning a status and a body into an envelope.
//!
//! Rules, in priority order:
//!
//! ```text
//! 401            → Unauthorized        (gateway refreshes and replays)
//! 204            → NoContent           (body never parsed)
//! 2xx, JSON      → Data { payload }
//! 2xx, not JSON  → ProtocolError::Decode
//! other          → ErrorMessage { body.error | body.detail | generic }
//! ```

use registrar_transport::RawResponse;

use crate::{ProtocolError, ResponseEnvelope};

/// Status that starts the refresh-and-retry protocol.
pub const STATUS_UNAUTHORIZED: u16 = 401;

/// Status that short-circuits body parsing.
pub const STATUS_NO_CONTENT: u16 = 204;

/// Message used when a failing response carries no readable error field.
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred";

/// Body fields checked, in order, for a human-readable error message.
const ERROR_FIELDS: [&str; 2] = ["error", "detail"];

/// Result of classifying a first-attempt response.
#[derive(Debug, Clone, PartialEq)]
pub enum Classified {
    /// The credential was rejected; the caller must not see this directly.
    Unauthorized,
    /// Anything else.
    Envelope(ResponseEnvelope),
}

/// Classifies a first-attempt response.
///
/// # Errors
/// Returns `ProtocolError::Decode` for a successful status whose body is
/// not JSON.
pub fn classify(response: &RawResponse) -> Result<Classified, ProtocolError> {
    if response.status == STATUS_UNAUTHORIZED {
        return Ok(Classified::Unauthorized);
    }
    ResponseEnvelope::from_response(response).map(Classified::Envelope)
}

impl ResponseEnvelope {
    /// Classifies a response with no special handling for 401, which is
    /// treated like any other failing status. Used for replays.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` for a successful status whose body
    /// is not JSON.
    pub fn from_response(response: &RawResponse) -> Result<Self, ProtocolError> {
        if response.status == STATUS_NO_CONTENT {
            return Ok(Self::NoContent);
        }

        if response.is_success() {
            let payload = serde_json::from_slice(&response.body)
                .map_err(ProtocolError::Decode)?;
            return Ok(Self::Data { payload });
        }

        Ok(Self::ErrorMessage {
            status: response.status,
            text: error_message(&response.body),
        })
    }
}

/// Extracts the conventional error message from a failing response body.
pub fn error_message(body: &[u8]) -> String {
    let Ok(serde_json::Value::Object(fields)) =
        serde_json::from_slice::<serde_json::Value>(body)
    else {
        return GENERIC_ERROR_MESSAGE.to_string();
    };
    ERROR_FIELDS
        .iter()
        .find_map(|name| {
            fields
                .get(*name)
                .and_then(|v| v.as_str())
                .filter(|text| !text.is_empty())
        })
        .unwrap_or(GENERIC_ERROR_MESSAGE)
        .to_string()
}
