//! HTTP transport abstraction layer for Registrar.
//!
//! Provides the [`HttpTransport`] trait that the request gateway sends every
//! call through, plus the plain request/response values that cross it.
//! Nothing in this crate knows about JSON, sessions, or retries: it moves
//! bytes to the backing service and brings the status and body back.
//!
//! # Feature Flags
//!
//! - `reqwest` (default): [`ReqwestTransport`], backed by a `reqwest`
//!   client with a cookie jar for credential carriage
//! - `mock`: [`ScriptedTransport`], a scripted in-memory backend for tests

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "reqwest")]
mod http_client;
#[cfg(feature = "mock")]
mod mock;

pub use error::{BoxError, TransportError};
#[cfg(feature = "reqwest")]
pub use http_client::ReqwestTransport;
#[cfg(feature = "mock")]
pub use mock::{Reply, ScriptedTransport};

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter for generating unique call IDs.
static NEXT_CALL_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque identifier for one logical call through the gateway.
///
/// A logical call may produce several network operations (original,
/// refresh, replay); they all log under the same `CallId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallId(u64);

impl CallId {
    /// Creates a new `CallId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Allocates the next process-unique `CallId`.
    pub fn next() -> Self {
        Self(NEXT_CALL_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "call-{}", self.0)
    }
}

/// HTTP method of an outbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    /// The method's canonical upper-case name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully resolved request, ready to put on the wire.
///
/// Owns all of its data (including the body) so the same value can be
/// sent more than once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRequest {
    pub method: Method,
    /// Absolute URL.
    pub url: String,
    /// Header name/value pairs, in the order they should be sent.
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
    /// Whether the transport-managed credential (cookies) is carried.
    pub with_credentials: bool,
}

impl RawRequest {
    /// Looks up a header value by name, ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Creates a response from a status code and body bytes.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends requests to the backing service.
///
/// # Trait bounds
///
/// - `Send + Sync + 'static` → one transport is shared by every call the
///   gateway makes, including a refresh that may outlive the call that
///   started it.
/// - The returned future is `Send` so the gateway can box and share it.
pub trait HttpTransport: Send + Sync + 'static {
    /// Performs one HTTP exchange.
    ///
    /// # Returns
    /// - `Ok(RawResponse)`: the server answered, whatever the status
    /// - `Err(TransportError)`: no answer was obtained
    fn send(
        &self,
        request: RawRequest,
    ) -> impl Future<Output = Result<RawResponse, TransportError>> + Send;
}
