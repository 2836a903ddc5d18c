//! `RegistrarClient` builder.
//!
//! This is the entry point for talking to a Registrar service. It ties
//! together all the layers: transport → protocol → gateway → session.

use std::sync::Arc;
use std::time::Duration;

use registrar_gateway::{Gateway, RefreshPolicy};
use registrar_protocol::{Credentials, UserIdentity};
use registrar_session::{Navigator, SessionCoordinator, SessionState};
use registrar_transport::{HttpTransport, ReqwestTransport};
use tokio::sync::watch;

use crate::config::parse_base_url;
use crate::{ClientConfig, RegistrarError};

/// Builder for configuring a [`RegistrarClient`].
///
/// # Example
///
/// ```rust,no_run
/// use registrar::prelude::*;
///
/// # async fn run() -> Result<(), RegistrarError> {
/// let client = RegistrarClientBuilder::new()
///     .base_url("https://school.example/api")
///     .build(|route: &str| println!("go to {route}"))?;
///
/// client.bootstrap().await;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct RegistrarClientBuilder {
    config: ClientConfig,
    base_url: Option<String>,
    timeout: Option<Duration>,
}

impl RegistrarClientBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole configuration (e.g. one read by
    /// [`ClientConfig::from_env`]).
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the service base URL. Checked when the client is built.
    pub fn base_url(mut self, base_url: &str) -> Self {
        self.base_url = Some(base_url.to_string());
        self
    }

    pub fn refresh_policy(mut self, policy: RefreshPolicy) -> Self {
        self.config.gateway.refresh_policy = policy;
        self
    }

    /// Sets the countdown between an unrecoverable expiry and the forced
    /// sign-out.
    pub fn grace_period(mut self, grace: Duration) -> Self {
        self.config.session.grace_period = grace;
        self
    }

    pub fn sign_in_route(mut self, route: &str) -> Self {
        self.config.session.sign_in_route = route.to_string();
        self
    }

    /// Per-request timeout for the HTTP transport.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds a client on the cookie-carrying `reqwest` transport.
    ///
    /// # Errors
    /// - [`RegistrarError::Config`]: the base URL is not an absolute
    ///   http(s) URL
    /// - [`RegistrarError::Transport`]: the HTTP client couldn't be built
    pub fn build<N: Navigator>(
        self,
        navigator: N,
    ) -> Result<RegistrarClient<ReqwestTransport, N>, RegistrarError> {
        let transport = match self.timeout {
            Some(timeout) => ReqwestTransport::with_timeout(timeout)?,
            None => ReqwestTransport::new()?,
        };
        self.build_with_transport(transport, navigator)
    }

    /// Builds a client on any transport.
    pub fn build_with_transport<T: HttpTransport, N: Navigator>(
        mut self,
        transport: T,
        navigator: N,
    ) -> Result<RegistrarClient<T, N>, RegistrarError> {
        if let Some(base_url) = &self.base_url {
            self.config.gateway.base_url = parse_base_url(base_url)?;
        }

        tracing::debug!(
            base_url = %self.config.gateway.base_url,
            grace_secs = self.config.session.grace_period.as_secs_f64(),
            "building client"
        );
        let gateway = Arc::new(Gateway::new(transport, self.config.gateway));
        let session = SessionCoordinator::new(Arc::clone(&gateway), navigator, self.config.session);
        Ok(RegistrarClient { gateway, session })
    }
}

/// A configured client: the gateway every call goes through and the
/// session coordinator watching it.
///
/// Resource calls go through [`gateway()`](Self::gateway); session
/// operations are available directly.
pub struct RegistrarClient<T: HttpTransport, N: Navigator> {
    gateway: Arc<Gateway<T>>,
    session: SessionCoordinator<T, N>,
}

impl<T: HttpTransport, N: Navigator> RegistrarClient<T, N> {
    /// Creates a new builder.
    pub fn builder() -> RegistrarClientBuilder {
        RegistrarClientBuilder::new()
    }

    pub fn gateway(&self) -> &Gateway<T> {
        &self.gateway
    }

    pub fn session(&self) -> &SessionCoordinator<T, N> {
        &self.session
    }

    /// See [`SessionCoordinator::bootstrap`].
    pub async fn bootstrap(&self) -> Option<UserIdentity> {
        self.session.bootstrap().await
    }

    pub async fn sign_in(&self, credentials: &Credentials) -> Result<UserIdentity, RegistrarError> {
        Ok(self.session.sign_in(credentials).await?)
    }

    pub async fn sign_out(&self) -> Result<(), RegistrarError> {
        Ok(self.session.sign_out().await?)
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.session.subscribe()
    }

    /// Cancels a pending forced sign-out; called before exit. See
    /// [`SessionCoordinator::shutdown`].
    pub fn shutdown(&self) {
        self.session.shutdown();
    }
}
