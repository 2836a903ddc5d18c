//! Core protocol types: what a call asks for and what it gets back.

use std::fmt;

use registrar_transport::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::{Codec, JsonCodec, ProtocolError};

// ---------------------------------------------------------------------------
// RequestDescriptor
// ---------------------------------------------------------------------------

/// Everything needed to issue one call to the backing service.
///
/// Built with the consuming `with_*` methods, then handed to the gateway by
/// reference. Fields are private so an issued descriptor can't change; the
/// body is owned bytes so the gateway can replay it exactly.
///
/// ```rust
/// use registrar_protocol::{Method, RequestDescriptor};
///
/// let descriptor = RequestDescriptor::get("students/")
///     .with_query([("search", "amal"), ("level", "2")]);
/// assert_eq!(descriptor.method(), Method::Get);
/// assert_eq!(descriptor.path(), "students/?search=amal&level=2");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    method: Method,
    path: String,
    body: Option<Vec<u8>>,
    headers: Vec<(String, String)>,
}

impl RequestDescriptor {
    /// A body-less request for `path`, relative to the gateway's base URL.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            headers: Vec::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::Patch, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Sets the body to `value` encoded as JSON.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if `value` can't be serialized.
    pub fn with_json<T: Serialize>(mut self, value: &T) -> Result<Self, ProtocolError> {
        self.body = Some(JsonCodec.encode(value)?);
        Ok(self)
    }

    /// Sets a raw body.
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Adds a header override. A later override of the same name (ignoring
    /// case) replaces the earlier one.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
        self
    }

    /// Appends a form-urlencoded query string. An empty iterator leaves the
    /// path untouched (no dangling `?`).
    pub fn with_query<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish();
        if !query.is_empty() {
            let separator = if self.path.contains('?') { '&' } else { '?' };
            self.path.push(separator);
            self.path.push_str(&query);
        }
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// Path relative to the base URL, including any query string.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Caller-supplied header overrides.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }
}

// ---------------------------------------------------------------------------
// ResponseEnvelope
// ---------------------------------------------------------------------------

/// The classified result of one HTTP response.
///
/// Built by [`ResponseEnvelope::from_response`]. The gateway hands callers
/// only `NoContent` and `Data`; an `ErrorMessage` becomes a failed call.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseEnvelope {
    /// 204: nothing to parse.
    NoContent,
    /// A successful response and its parsed JSON body.
    Data { payload: serde_json::Value },
    /// A failing status and the human-readable message extracted from it.
    ErrorMessage { status: u16, text: String },
}

impl ResponseEnvelope {
    /// The parsed payload, if this is a `Data` envelope.
    pub fn payload(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Data { payload } => Some(payload),
            _ => None,
        }
    }

    /// Consumes the envelope, returning the payload if there is one.
    pub fn into_payload(self) -> Option<serde_json::Value> {
        match self {
            Self::Data { payload } => Some(payload),
            _ => None,
        }
    }

    /// Decodes the payload into `T`.
    ///
    /// Returns `Ok(None)` for `NoContent`.
    ///
    /// # Errors
    /// - `ProtocolError::Decode`: the payload doesn't match `T`
    /// - `ProtocolError::InvalidMessage`: this is an `ErrorMessage`
    pub fn decode<T: DeserializeOwned>(self) -> Result<Option<T>, ProtocolError> {
        match self {
            Self::NoContent => Ok(None),
            Self::Data { payload } => serde_json::from_value(payload)
                .map(Some)
                .map_err(ProtocolError::Decode),
            Self::ErrorMessage { text, .. } => Err(ProtocolError::InvalidMessage(text)),
        }
    }
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Numeric identifier of a signed-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "U-{}", self.0)
    }
}

/// The principal returned by the "who am I" check and by sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    #[serde(default)]
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub is_superuser: bool,
}

/// Username and password for the sign-in endpoint.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body of a successful sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SignInResponse {
    #[serde(default)]
    pub message: String,
    pub user: UserIdentity,
}
