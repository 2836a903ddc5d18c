//! A scripted in-memory backend for exercising the layers above.
//!
//! Tests register replies per `(method, path)` and inspect every request
//! the transport saw afterwards.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::{HttpTransport, Method, RawRequest, RawResponse, TransportError};

/// One scripted answer.
#[derive(Debug, Clone)]
pub struct Reply {
    outcome: Result<RawResponse, String>,
    delay: Option<Duration>,
}

impl Reply {
    /// A response with the given status and an empty body.
    pub fn status(status: u16) -> Self {
        Self {
            outcome: Ok(RawResponse::new(status, Vec::new())),
            delay: None,
        }
    }

    /// A 200 response carrying `value` as JSON.
    pub fn json(value: serde_json::Value) -> Self {
        Self::status(200).with_json(value)
    }

    /// A transport failure: the backend is unreachable.
    pub fn unreachable(reason: impl Into<String>) -> Self {
        Self {
            outcome: Err(reason.into()),
            delay: None,
        }
    }

    /// Replaces the body with `value` serialized as JSON.
    pub fn with_json(self, value: serde_json::Value) -> Self {
        self.with_body(value.to_string())
    }

    /// Replaces the body with raw bytes.
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        if let Ok(response) = &mut self.outcome {
            response.body = body.into();
        }
        self
    }

    /// Delays the answer by `delay` (uses tokio time, so paused clocks
    /// advance it instantly).
    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

struct Route {
    method: Method,
    path: String,
    replies: VecDeque<Reply>,
}

impl Route {
    fn matches(&self, request: &RawRequest) -> bool {
        let path = request.url.split('?').next().unwrap_or_default();
        self.method == request.method && path.ends_with(&self.path)
    }
}

/// An [`HttpTransport`] that answers from a script.
///
/// Routes match on method and URL path suffix (query string ignored).
/// Replies for a route are consumed in order; the last one is sticky and
/// answers every further request. A request with no matching route fails
/// as if the backend were unreachable.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<Vec<Route>>,
    seen: Mutex<Vec<RawRequest>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ScriptedTransport {
    /// Creates a transport with no routes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `reply` to the script for `method path`.
    pub fn script(&self, method: Method, path: &str, reply: Reply) -> &Self {
        let mut routes = lock(&self.routes);
        match routes
            .iter_mut()
            .find(|r| r.method == method && r.path == path)
        {
            Some(route) => route.replies.push_back(reply),
            None => routes.push(Route {
                method,
                path: path.to_string(),
                replies: VecDeque::from([reply]),
            }),
        }
        self
    }

    /// Every request sent so far, in order.
    pub fn requests(&self) -> Vec<RawRequest> {
        lock(&self.seen).clone()
    }

    /// Number of requests sent so far.
    pub fn request_count(&self) -> usize {
        lock(&self.seen).len()
    }

    /// Number of requests sent to `method path`.
    pub fn count(&self, method: Method, path: &str) -> usize {
        lock(&self.seen)
            .iter()
            .filter(|r| {
                r.method == method
                    && r.url.split('?').next().unwrap_or_default().ends_with(path)
            })
            .count()
    }

    fn next_reply(&self, request: &RawRequest) -> Option<Reply> {
        let mut routes = lock(&self.routes);
        let route = routes.iter_mut().find(|r| r.matches(request))?;
        if route.replies.len() > 1 {
            route.replies.pop_front()
        } else {
            route.replies.front().cloned()
        }
    }
}

impl HttpTransport for ScriptedTransport {
    async fn send(
        &self,
        request: RawRequest,
    ) -> Result<RawResponse, TransportError> {
        let reply = self.next_reply(&request);
        lock(&self.seen).push(request.clone());

        let Some(reply) = reply else {
            return Err(TransportError::SendFailed(
                format!("no scripted reply for {} {}", request.method, request.url)
                    .into(),
            ));
        };
        if let Some(delay) = reply.delay {
            tokio::time::sleep(delay).await;
        }
        reply
            .outcome
            .map_err(|reason| TransportError::SendFailed(reason.into()))
    }
}
