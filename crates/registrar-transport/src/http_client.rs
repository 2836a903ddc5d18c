//! HTTP transport implementation using `reqwest`.

use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::{HttpTransport, Method, RawRequest, RawResponse, TransportError};

/// Default per-request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A `reqwest`-backed [`HttpTransport`].
///
/// Credential carriage is the cookie jar: cookies set by the backing
/// service (access and refresh tokens) are stored in the jar and sent back
/// on every request that asks for credentials. The transport never reads
/// them itself.
pub struct ReqwestTransport {
    with_cookies: reqwest::Client,
    without_cookies: reqwest::Client,
    jar: Arc<Jar>,
}

impl ReqwestTransport {
    /// Builds a transport with an empty cookie jar and the default timeout.
    pub fn new() -> Result<Self, TransportError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Builds a transport with an empty cookie jar and the given timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        let jar = Arc::new(Jar::default());
        let with_cookies = reqwest::Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Unavailable(e.to_string()))?;
        let without_cookies = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Unavailable(e.to_string()))?;
        tracing::debug!(?timeout, "reqwest transport ready");
        Ok(Self {
            with_cookies,
            without_cookies,
            jar,
        })
    }

    /// The cookie jar holding the transport credential.
    pub fn cookie_jar(&self) -> &Arc<Jar> {
        &self.jar
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

fn to_header_map(
    headers: &[(String, String)],
) -> Result<HeaderMap, TransportError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
            TransportError::InvalidRequest(format!("header name {name:?}: {e}"))
        })?;
        let value = HeaderValue::from_str(value).map_err(|e| {
            TransportError::InvalidRequest(format!("header {name}: {e}"))
        })?;
        map.insert(name, value);
    }
    Ok(map)
}

impl HttpTransport for ReqwestTransport {
    async fn send(
        &self,
        request: RawRequest,
    ) -> Result<RawResponse, TransportError> {
        let client = if request.with_credentials {
            &self.with_cookies
        } else {
            &self.without_cookies
        };

        let mut builder = client
            .request(to_reqwest_method(request.method), &request.url)
            .headers(to_header_map(&request.headers)?);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::SendFailed(Box::new(e)))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::ReceiveFailed(Box::new(e)))?;

        tracing::trace!(
            method = %request.method,
            url = %request.url,
            status,
            len = body.len(),
            "http exchange complete"
        );

        Ok(RawResponse::new(status, body.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_reqwest_method_maps_every_variant() {
        assert_eq!(to_reqwest_method(Method::Get), reqwest::Method::GET);
        assert_eq!(to_reqwest_method(Method::Post), reqwest::Method::POST);
        assert_eq!(to_reqwest_method(Method::Put), reqwest::Method::PUT);
        assert_eq!(to_reqwest_method(Method::Patch), reqwest::Method::PATCH);
        assert_eq!(to_reqwest_method(Method::Delete), reqwest::Method::DELETE);
    }

    #[test]
    fn test_to_header_map_rejects_invalid_name() {
        let result = to_header_map(&[("bad header".into(), "x".into())]);
        assert!(matches!(result, Err(TransportError::InvalidRequest(_))));
    }

    #[test]
    fn test_to_header_map_keeps_values() {
        let map = to_header_map(&[(
            "Content-Type".into(),
            "application/json".into(),
        )])
        .expect("valid headers");
        assert_eq!(map["content-type"], "application/json");
    }
}
