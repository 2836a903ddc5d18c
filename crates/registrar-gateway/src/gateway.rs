//! The gateway: single point of egress for every backend call.
//!
//! # Call flow
//!
//! ```text
//! execute(descriptor)
//!   │
//!   ├─ send ──→ 401? ──no──→ classify ──→ NoContent | Data | Rejected
//!   │            │
//!   │           yes
//!   │            ▼
//!   │         refresh ──failed──→ notify observer ──→ SessionExpired
//!   │            │
//!   │        attempted
//!   │            ▼
//!   └────── replay once ──→ classify (401 is an ordinary rejection)
//! ```

use std::sync::{Arc, OnceLock, Weak};

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use registrar_protocol::{
    Classified, Codec, JsonCodec, RequestDescriptor, ResponseEnvelope, classify,
};
use registrar_transport::{CallId, HttpTransport, Method, RawRequest};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::{ExpiryObserver, GatewayConfig, GatewayError, RefreshPolicy};

/// How a refresh attempt ended.
#[derive(Debug, Clone)]
enum RefreshOutcome {
    /// The refresh endpoint answered (with any status).
    Attempted { status: u16 },
    /// The refresh endpoint could not be reached.
    Failed { reason: String },
}

type SharedRefresh = Shared<BoxFuture<'static, RefreshOutcome>>;

/// Sends every call to the backing service and recovers from an expired
/// credential by refreshing it once.
///
/// Cheap to share behind an `Arc`; all methods take `&self`.
pub struct Gateway<T: HttpTransport> {
    transport: Arc<T>,
    config: GatewayConfig,
    /// Held weakly so the gateway never keeps its own observer alive.
    observer: OnceLock<Weak<dyn ExpiryObserver>>,
    /// The refresh currently in flight (coalesced policy only).
    in_flight: Mutex<Option<SharedRefresh>>,
}

impl<T: HttpTransport> Gateway<T> {
    /// Creates a gateway sending through `transport`.
    pub fn new(transport: T, config: GatewayConfig) -> Self {
        debug!(
            base_url = %config.base_url,
            policy = ?config.refresh_policy,
            "gateway created"
        );
        Self {
            transport: Arc::new(transport),
            config,
            observer: OnceLock::new(),
            in_flight: Mutex::new(None),
        }
    }

    /// Registers the observer told about unrecoverable expiry.
    ///
    /// Only the first registration takes effect; returns `false` if an
    /// observer was already set.
    pub fn set_expiry_observer<O: ExpiryObserver>(&self, observer: &Arc<O>) -> bool {
        let weak: Weak<O> = Arc::downgrade(observer);
        let weak: Weak<dyn ExpiryObserver> = weak;
        self.observer.set(weak).is_ok()
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Executes one logical call.
    ///
    /// Returns `NoContent` or `Data`; every other outcome is an error.
    ///
    /// # Errors
    /// - [`GatewayError::Rejected`]: failing status (including a 401 on
    ///   the replay after a refresh)
    /// - [`GatewayError::SessionExpired`]: the refresh endpoint was
    ///   unreachable
    /// - [`GatewayError::Transport`]: the call itself was unreachable
    /// - [`GatewayError::Protocol`]: a successful body was not JSON
    pub async fn execute(
        &self,
        descriptor: &RequestDescriptor,
    ) -> Result<ResponseEnvelope, GatewayError> {
        let call = CallId::next();
        debug!(
            %call,
            method = %descriptor.method(),
            path = descriptor.path(),
            "executing call"
        );

        let response = self.transport.send(self.raw_request(descriptor)).await?;
        match classify(&response)? {
            Classified::Envelope(envelope) => settle(call, envelope),
            Classified::Unauthorized => self.recover(call, descriptor).await,
        }
    }

    /// Executes a call and decodes its payload into `R`.
    ///
    /// Returns `Ok(None)` for a no-content response.
    pub async fn fetch<R: DeserializeOwned>(
        &self,
        descriptor: &RequestDescriptor,
    ) -> Result<Option<R>, GatewayError> {
        Ok(self.execute(descriptor).await?.decode()?)
    }

    /// Refresh-and-retry, entered once on the first 401 of a call.
    async fn recover(
        &self,
        call: CallId,
        descriptor: &RequestDescriptor,
    ) -> Result<ResponseEnvelope, GatewayError> {
        debug!(%call, "credential rejected, refreshing");

        let outcome = match self.config.refresh_policy {
            RefreshPolicy::PerCall => self.start_refresh().await,
            RefreshPolicy::Coalesced => self.join_refresh(call).await,
        };

        match outcome {
            RefreshOutcome::Attempted { status } => {
                debug!(%call, refresh_status = status, "refresh attempted, replaying call");
                let response = self.transport.send(self.raw_request(descriptor)).await?;
                settle(call, ResponseEnvelope::from_response(&response)?)
            }
            RefreshOutcome::Failed { reason } => {
                warn!(%call, %reason, "credential refresh failed, session expired");
                Err(GatewayError::SessionExpired)
            }
        }
    }

    /// Builds one refresh attempt.
    ///
    /// A failed refresh notifies the observer from inside this future, so
    /// a coalesced refresh notifies exactly once however many callers
    /// are still waiting on it.
    fn start_refresh(&self) -> BoxFuture<'static, RefreshOutcome> {
        let transport = Arc::clone(&self.transport);
        let request = self.refresh_request();
        let observer = self.observer.get().cloned();
        async move {
            match transport.send(request).await {
                Ok(response) => RefreshOutcome::Attempted {
                    status: response.status,
                },
                Err(e) => {
                    notify_expired(observer.as_ref());
                    RefreshOutcome::Failed {
                        reason: e.to_string(),
                    }
                }
            }
        }
        .boxed()
    }

    /// Awaits the in-flight refresh, starting one if there is none.
    async fn join_refresh(&self, call: CallId) -> RefreshOutcome {
        let (pending, leader) = {
            let mut slot = self.in_flight.lock().await;
            match slot.as_ref() {
                Some(pending) => (pending.clone(), false),
                None => {
                    let pending = self.start_refresh().shared();
                    *slot = Some(pending.clone());
                    (pending, true)
                }
            }
        };
        if !leader {
            debug!(%call, "joining in-flight refresh");
        }

        let outcome = pending.clone().await;

        let mut slot = self.in_flight.lock().await;
        if slot.as_ref().is_some_and(|current| current.ptr_eq(&pending)) {
            *slot = None;
        }
        outcome
    }

    /// Applies transport defaults to a descriptor.
    ///
    /// Caller headers replace the default `Content-Type`; credential
    /// carriage is always on.
    fn raw_request(&self, descriptor: &RequestDescriptor) -> RawRequest {
        let mut headers = vec![(
            "Content-Type".to_string(),
            JsonCodec.content_type().to_string(),
        )];
        for (name, value) in descriptor.headers() {
            headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
            headers.push((name.clone(), value.clone()));
        }
        RawRequest {
            method: descriptor.method(),
            url: self.config.url_for(descriptor.path()),
            headers,
            body: descriptor.body().map(<[u8]>::to_vec),
            with_credentials: true,
        }
    }

    fn refresh_request(&self) -> RawRequest {
        RawRequest {
            method: Method::Post,
            url: self.config.url_for(&self.config.refresh_path),
            headers: Vec::new(),
            body: None,
            with_credentials: true,
        }
    }
}

fn notify_expired(observer: Option<&Weak<dyn ExpiryObserver>>) {
    match observer.and_then(Weak::upgrade) {
        Some(observer) => observer.session_expired(),
        None => warn!("session expired with no observer registered"),
    }
}

/// Turns an error envelope into a failed call.
fn settle(call: CallId, envelope: ResponseEnvelope) -> Result<ResponseEnvelope, GatewayError> {
    match envelope {
        ResponseEnvelope::ErrorMessage { status, text } => {
            debug!(%call, status, message = %text, "call rejected");
            Err(GatewayError::Rejected {
                status,
                message: text,
            })
        }
        other => Ok(other),
    }
}
