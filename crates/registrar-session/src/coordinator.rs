//! The session coordinator: owns authentication state and the forced
//! sign-out after an unrecoverable expiry.
//!
//! # Concurrency note
//!
//! State lives in a `tokio::sync::watch` channel. The sender is the single
//! writer and sits inside `Shared`; readers take snapshots or subscribe.
//! The gateway reaches the coordinator through [`ExpiryObserver`], which is
//! implemented on `Shared` and registered (weakly) at construction.
//!
//! The countdown is the only long-lived task. Its abort handle is kept in
//! `Shared::countdown` and aborted on [`SessionCoordinator::shutdown`] and
//! on drop; the task itself only holds a `Weak` back-reference, so a
//! coordinator that's gone never navigates.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use registrar_gateway::{ExpiryObserver, Gateway, GatewayError};
use registrar_protocol::endpoints;
use registrar_protocol::{Credentials, SignInResponse, UserIdentity};
use registrar_transport::HttpTransport;
use tokio::sync::watch;
use tokio::task::AbortHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::{ExpiryOverlay, Navigator, SessionConfig, SessionError, SessionState};

/// A running forced sign-out.
struct Countdown {
    deadline: Instant,
    abort: AbortHandle,
}

/// State shared between the coordinator, the gateway's observer slot,
/// and the countdown task.
struct Shared<N: Navigator> {
    state: watch::Sender<SessionState>,
    countdown: Mutex<Option<Countdown>>,
    navigator: N,
    config: SessionConfig,
    /// Lets `session_expired(&self)` hand an owned reference to the
    /// countdown task.
    me: Weak<Shared<N>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<N: Navigator> Shared<N> {
    /// Enters `ExpiredPending`, once per episode.
    fn begin_expiry(&self) {
        let started = self.state.send_if_modified(|state| {
            if state.expired {
                false
            } else {
                state.expired = true;
                true
            }
        });
        if !started {
            debug!("expiry already pending, countdown unchanged");
            return;
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            error!("session expired outside a tokio runtime; signing out without a grace period");
            self.finish_expiry();
            return;
        };

        let grace = self.config.grace_period;
        let deadline = Instant::now() + grace;
        let me = self.me.clone();
        // Held across the spawn so a zero grace period can't finish first.
        let mut slot = lock(&self.countdown);
        let task = runtime.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            if let Some(shared) = me.upgrade() {
                shared.finish_expiry();
            }
        });

        warn!(grace_secs = grace.as_secs_f64(), "session expired, forced sign-out scheduled");
        *slot = Some(Countdown {
            deadline,
            abort: task.abort_handle(),
        });
    }

    /// Runs when the countdown elapses: `ExpiredPending → LoggedOut`.
    fn finish_expiry(&self) {
        lock(&self.countdown).take();
        self.clear_expired();
        info!(route = %self.config.sign_in_route, "forced sign-out");
        self.navigator.navigate(&self.config.sign_in_route);
    }

    /// Drops the user and leaves `ExpiredPending`. Returns whether an
    /// expiry was pending.
    fn clear_expired(&self) -> bool {
        self.state.send_if_modified(|state| {
            let pending = state.expired;
            state.user = None;
            state.expired = false;
            pending
        })
    }

    fn set_user(&self, user: Option<UserIdentity>) {
        self.state.send_modify(|state| {
            state.user = user;
            state.loading = false;
        });
    }

    fn cancel_countdown(&self) {
        if let Some(countdown) = lock(&self.countdown).take() {
            countdown.abort.abort();
            debug!("forced sign-out countdown cancelled");
        }
    }
}

impl<N: Navigator> ExpiryObserver for Shared<N> {
    fn session_expired(&self) {
        self.begin_expiry();
    }
}

/// Holds the client's authentication state and drives sign-in, sign-out,
/// and the forced sign-out after an unrecoverable expiry.
///
/// Construct one per running client and pass it to whatever needs the
/// session; it is not a global. Dropping it cancels a pending countdown.
///
/// ## Lifecycle
///
/// ```text
/// new() ──→ bootstrap() ──→ sign_in() ──→ ... ──→ sign_out()
///                                 │
///                    gateway: refresh failed
///                                 ▼
///                      on_session_expired() ── grace period ──→ navigate("/login")
/// ```
pub struct SessionCoordinator<T: HttpTransport, N: Navigator> {
    gateway: Arc<Gateway<T>>,
    shared: Arc<Shared<N>>,
}

impl<T: HttpTransport, N: Navigator> SessionCoordinator<T, N> {
    /// Creates the coordinator and registers it as the gateway's expiry
    /// observer.
    ///
    /// The gateway accepts one observer; if another was registered first
    /// it keeps that one and this coordinator won't see expiries.
    pub fn new(gateway: Arc<Gateway<T>>, navigator: N, config: SessionConfig) -> Self {
        let (state, _) = watch::channel(SessionState::initial());
        let shared = Arc::new_cyclic(|me| Shared {
            state,
            countdown: Mutex::new(None),
            navigator,
            config,
            me: me.clone(),
        });
        if !gateway.set_expiry_observer(&shared) {
            warn!("gateway already has an expiry observer; this coordinator won't be notified");
        }
        Self { gateway, shared }
    }

    /// The gateway this coordinator signs in through.
    pub fn gateway(&self) -> &Arc<Gateway<T>> {
        &self.gateway
    }

    pub fn config(&self) -> &SessionConfig {
        &self.shared.config
    }

    /// Asks "who am I" and records the answer.
    ///
    /// Never fails: any error leaves the user signed out. `loading` is
    /// `false` afterwards either way.
    pub async fn bootstrap(&self) -> Option<UserIdentity> {
        let user = match self.gateway.fetch::<UserIdentity>(&endpoints::me()).await {
            Ok(user) => user,
            Err(e) => {
                debug!(error = %e, "startup identity check failed, no user");
                None
            }
        };
        match &user {
            Some(user) => info!(user_id = %user.id, username = %user.username, "session restored"),
            None => debug!("no session to restore"),
        }
        self.shared.set_user(user.clone());
        user
    }

    /// Signs in and stores the returned identity.
    ///
    /// # Errors
    /// - [`SessionError::Request`]: the gateway's error, unchanged (a
    ///   rejected password surfaces the service's message)
    /// - [`SessionError::MissingIdentity`]: the service answered with no
    ///   content
    /// - [`SessionError::ExpiryPending`]: a forced sign-out is counting
    ///   down
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<UserIdentity, SessionError> {
        if self.shared.state.borrow().expired {
            return Err(SessionError::ExpiryPending);
        }

        let descriptor = endpoints::login(credentials).map_err(GatewayError::from)?;
        let response: SignInResponse = self
            .gateway
            .fetch(&descriptor)
            .await?
            .ok_or(SessionError::MissingIdentity)?;

        info!(user_id = %response.user.id, username = %response.user.username, "signed in");
        self.shared.set_user(Some(response.user.clone()));
        Ok(response.user)
    }

    /// Signs out remotely, then clears the local user whatever the remote
    /// call did.
    ///
    /// # Errors
    /// The remote call's error, returned after the local state is cleared.
    pub async fn sign_out(&self) -> Result<(), SessionError> {
        let remote = self.gateway.execute(&endpoints::logout()).await;
        self.shared.set_user(None);
        info!("signed out");
        remote.map(|_| ()).map_err(|e| {
            debug!(error = %e, "remote sign-out failed, local session cleared anyway");
            SessionError::from(e)
        })
    }

    /// Starts the forced sign-out.
    ///
    /// Idempotent while pending: a second call neither restarts nor
    /// extends the countdown. Normally invoked by the gateway.
    pub fn on_session_expired(&self) {
        self.shared.begin_expiry();
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> SessionState {
        self.shared.state.borrow().clone()
    }

    /// Subscribes to state changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.shared.state.subscribe()
    }

    /// The expiry notice, if a forced sign-out is counting down.
    pub fn expiry_overlay(&self) -> Option<ExpiryOverlay> {
        if !self.shared.state.borrow().expired {
            return None;
        }
        let remaining = lock(&self.shared.countdown)
            .as_ref()
            .map(|c| c.deadline.saturating_duration_since(Instant::now()))
            .unwrap_or_default();
        Some(ExpiryOverlay { remaining })
    }

    /// Cancels a pending countdown.
    ///
    /// A pending expiry is applied on the spot: the user is signed out
    /// without navigating, so the coordinator never stays stuck in
    /// `ExpiredPending`. Otherwise the state is left as is.
    pub fn shutdown(&self) {
        self.shared.cancel_countdown();
        if self.shared.clear_expired() {
            info!("pending forced sign-out applied at shutdown");
        }
    }
}

impl<T: HttpTransport, N: Navigator> Drop for SessionCoordinator<T, N> {
    fn drop(&mut self) {
        self.shared.cancel_countdown();
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Time-dependent tests run on a paused clock. Sleeping in the test
    //! lets the runtime auto-advance to the next timer, so the countdown
    //! task fires before a test sleep that ends later.

    use std::time::Duration;

    use registrar_gateway::GatewayConfig;
    use registrar_protocol::{Method, UserId};
    use registrar_transport::{Reply, ScriptedTransport};
    use serde_json::json;

    use super::*;

    // -- Helpers ----------------------------------------------------------

    #[derive(Clone, Default)]
    struct RecordingNavigator {
        routes: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingNavigator {
        fn routes(&self) -> Vec<String> {
            lock(&self.routes).clone()
        }
    }

    impl Navigator for RecordingNavigator {
        fn navigate(&self, route: &str) {
            lock(&self.routes).push(route.to_string());
        }
    }

    type TestCoordinator = SessionCoordinator<ScriptedTransport, RecordingNavigator>;

    fn coordinator() -> (TestCoordinator, RecordingNavigator) {
        let gateway = Arc::new(Gateway::new(
            ScriptedTransport::new(),
            GatewayConfig::with_base_url("http://backend.test/api"),
        ));
        let navigator = RecordingNavigator::default();
        let coordinator =
            SessionCoordinator::new(gateway, navigator.clone(), SessionConfig::default());
        (coordinator, navigator)
    }

    fn transport(c: &TestCoordinator) -> &ScriptedTransport {
        c.gateway().transport()
    }

    fn admin() -> serde_json::Value {
        json!({"id": 1, "username": "admin", "email": "admin@school.test", "is_superuser": true})
    }

    async fn sleep_ms(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    // =====================================================================
    // bootstrap()
    // =====================================================================

    #[tokio::test]
    async fn test_bootstrap_known_user_populates_state() {
        let (c, _) = coordinator();
        transport(&c).script(Method::Get, "/auth/me/", Reply::json(admin()));
        assert!(c.state().loading);

        let user = c.bootstrap().await;

        assert_eq!(user.as_ref().map(|u| u.id), Some(UserId(1)));
        let state = c.state();
        assert!(!state.loading);
        assert_eq!(state.user.unwrap().username, "admin");
    }

    #[tokio::test]
    async fn test_bootstrap_failure_is_silent() {
        let (c, _) = coordinator();
        transport(&c).script(
            Method::Get,
            "/auth/me/",
            Reply::status(403).with_json(json!({"detail": "Not authenticated"})),
        );

        let user = c.bootstrap().await;

        assert!(user.is_none());
        let state = c.state();
        assert!(!state.loading);
        assert!(state.user.is_none());
        assert!(!state.expired);
    }

    // =====================================================================
    // sign_in() / sign_out()
    // =====================================================================

    #[tokio::test]
    async fn test_sign_in_stores_and_returns_identity() {
        let (c, _) = coordinator();
        transport(&c).script(
            Method::Post,
            "/auth/login/",
            Reply::json(json!({"message": "Login successful", "user": admin()})),
        );

        let user = c.sign_in(&Credentials::new("admin", "pw")).await.unwrap();

        assert_eq!(user.username, "admin");
        assert!(user.is_superuser);
        assert_eq!(c.state().user, Some(user));
    }

    #[tokio::test]
    async fn test_sign_in_rejected_propagates_message_unchanged() {
        let (c, _) = coordinator();
        transport(&c).script(
            Method::Post,
            "/auth/login/",
            Reply::status(401).with_json(json!({"error": "Invalid credentials"})),
        );
        transport(&c).script(Method::Post, "/auth/refresh/", Reply::status(401));

        let err = c.sign_in(&Credentials::new("admin", "wrong")).await.unwrap_err();

        assert!(matches!(
            &err,
            SessionError::Request(GatewayError::Rejected { status: 401, .. })
        ));
        assert_eq!(err.to_string(), "Invalid credentials");
        assert!(c.state().user.is_none());
    }

    #[tokio::test]
    async fn test_sign_in_no_content_is_missing_identity() {
        let (c, _) = coordinator();
        transport(&c).script(Method::Post, "/auth/login/", Reply::status(204));

        let err = c.sign_in(&Credentials::new("admin", "pw")).await.unwrap_err();

        assert!(matches!(err, SessionError::MissingIdentity));
    }

    #[tokio::test]
    async fn test_sign_out_remote_failure_still_clears_user() {
        let (c, _) = coordinator();
        transport(&c)
            .script(Method::Get, "/auth/me/", Reply::json(admin()))
            .script(Method::Post, "/auth/logout/", Reply::unreachable("offline"));
        c.bootstrap().await;

        let result = c.sign_out().await;

        assert!(matches!(result, Err(SessionError::Request(GatewayError::Transport(_)))));
        assert!(c.state().user.is_none());
    }

    #[tokio::test]
    async fn test_sign_out_success_clears_user() {
        let (c, _) = coordinator();
        transport(&c)
            .script(Method::Get, "/auth/me/", Reply::json(admin()))
            .script(
                Method::Post,
                "/auth/logout/",
                Reply::json(json!({"message": "Logout successful"})),
            );
        c.bootstrap().await;

        c.sign_out().await.unwrap();

        assert!(!c.state().is_authenticated());
    }

    // =====================================================================
    // on_session_expired()
    // =====================================================================

    #[tokio::test(start_paused = true)]
    async fn test_on_session_expired_sets_flag_immediately() {
        let (c, nav) = coordinator();

        c.on_session_expired();

        assert!(c.state().expired);
        assert_eq!(
            c.expiry_overlay(),
            Some(ExpiryOverlay {
                remaining: Duration::from_secs(5)
            })
        );
        assert!(nav.routes().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_on_session_expired_twice_does_not_extend_countdown() {
        let (c, nav) = coordinator();
        c.on_session_expired();

        sleep_ms(3_000).await;
        c.on_session_expired();
        assert_eq!(c.expiry_overlay().unwrap().remaining, Duration::from_secs(2));

        sleep_ms(2_001).await;

        assert_eq!(nav.routes(), vec!["/login".to_string()]);
        assert!(!c.state().expired);
    }

    #[tokio::test(start_paused = true)]
    async fn test_countdown_elapsed_clears_user_and_navigates_once() {
        let (c, nav) = coordinator();
        transport(&c).script(Method::Get, "/auth/me/", Reply::json(admin()));
        c.bootstrap().await;

        c.on_session_expired();
        sleep_ms(4_999).await;
        assert!(c.state().user.is_some());
        assert!(nav.routes().is_empty());

        sleep_ms(2).await;

        let state = c.state();
        assert!(state.user.is_none());
        assert!(!state.expired);
        assert!(c.expiry_overlay().is_none());
        assert_eq!(nav.routes(), vec!["/login".to_string()]);

        sleep_ms(60_000).await;
        assert_eq!(nav.routes().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sign_in_while_expiry_pending_is_refused() {
        let (c, _) = coordinator();
        c.on_session_expired();

        let err = c.sign_in(&Credentials::new("admin", "pw")).await.unwrap_err();

        assert!(matches!(err, SessionError::ExpiryPending));
        assert_eq!(transport(&c).request_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_cancels_countdown() {
        let (c, nav) = coordinator();
        c.on_session_expired();

        c.shutdown();
        sleep_ms(10_000).await;

        assert!(nav.routes().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_countdown() {
        let (c, nav) = coordinator();
        c.on_session_expired();

        drop(c);
        sleep_ms(10_000).await;

        assert!(nav.routes().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribe_sees_expiry_transition() {
        let (c, _) = coordinator();
        let mut rx = c.subscribe();

        c.on_session_expired();

        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().expired);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_during_expiry_signs_out_without_navigating() {
        let (c, nav) = coordinator();
        transport(&c)
            .script(Method::Get, "/auth/me/", Reply::json(admin()))
            .script(
                Method::Post,
                "/auth/login/",
                Reply::json(json!({"message": "Login successful", "user": admin()})),
            );
        c.bootstrap().await;
        c.on_session_expired();

        c.shutdown();
        sleep_ms(10_000).await;

        let state = c.state();
        assert!(!state.expired);
        assert!(state.user.is_none());
        assert!(c.expiry_overlay().is_none());
        assert!(nav.routes().is_empty());
        let user = c.sign_in(&Credentials::new("admin", "pw")).await.unwrap();
        assert_eq!(c.state().user, Some(user));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_without_expiry_keeps_user() {
        let (c, _) = coordinator();
        transport(&c).script(Method::Get, "/auth/me/", Reply::json(admin()));
        c.bootstrap().await;

        c.shutdown();

        assert!(c.state().is_authenticated());
    }

    #[test]
    fn test_on_session_expired_without_runtime_signs_out_immediately() {
        let (c, nav) = coordinator();

        c.on_session_expired();

        let state = c.state();
        assert!(!state.expired);
        assert!(state.user.is_none());
        assert!(c.expiry_overlay().is_none());
        assert_eq!(nav.routes(), vec!["/login".to_string()]);
        c.on_session_expired();
        assert_eq!(nav.routes().len(), 2);
    }
}
