/// Boxed error used as the source of transport failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur in the transport layer.
///
/// Every variant means the request never produced an HTTP response. A
/// response with a failing status code is NOT a transport error; it is
/// delivered as a [`RawResponse`](crate::RawResponse) and classified above.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request could not be built (bad header name, bad URL, ...).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Sending the request failed (DNS, connection refused, timeout).
    #[error("send failed: {0}")]
    SendFailed(#[source] BoxError),

    /// The response head arrived but the body could not be read.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] BoxError),

    /// The transport itself could not be constructed or is shut down.
    #[error("transport unavailable: {0}")]
    Unavailable(String),
}
