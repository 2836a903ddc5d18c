//! # Registrar
//!
//! Session-aware client for an institution's record-keeping service
//! (students, payments, results, contact messages).
//!
//! Every call goes through one [`Gateway`], which carries the session
//! cookie, classifies responses, and refreshes an expired credential once
//! before replaying the call. When the refresh can't reach the service the
//! [`SessionCoordinator`] shows an expiry notice for a grace period, then
//! signs the user out and navigates to the sign-in route.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use registrar::prelude::*;
//!
//! # async fn run() -> Result<(), RegistrarError> {
//! registrar::init_tracing();
//!
//! let client = RegistrarClientBuilder::new()
//!     .config(ClientConfig::from_env()?)
//!     .build(|route: &str| println!("navigate to {route}"))?;
//!
//! if client.bootstrap().await.is_none() {
//!     client.sign_in(&Credentials::new("admin", "secret")).await?;
//! }
//! let students = client.gateway().students(&StudentQuery::default()).await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
mod logging;

pub use client::{RegistrarClient, RegistrarClientBuilder};
pub use config::{ClientConfig, ENV_BASE_URL, ENV_GRACE_SECS, ENV_REFRESH_POLICY};
pub use error::RegistrarError;
pub use logging::{DEFAULT_LOG_FILTER, init_tracing};

pub use registrar_gateway::{
    ExpiryObserver, Gateway, GatewayConfig, GatewayError, RefreshPolicy,
};
pub use registrar_protocol::{
    Credentials, Method, RequestDescriptor, ResponseEnvelope, UserId, UserIdentity, endpoints,
};
pub use registrar_session::{
    ExpiryOverlay, Navigator, SessionConfig, SessionCoordinator, SessionError, SessionState,
};
pub use registrar_transport::{HttpTransport, ReqwestTransport, TransportError};

/// Everything a shell needs in one import.
pub mod prelude {
    pub use crate::endpoints::{
        ContactMessageQuery, ContactMessageUpdate, ContactSubmission, NewPayment, NewResult,
        StudentQuery, SubjectScore,
    };
    pub use crate::{
        ClientConfig, Credentials, ExpiryOverlay, Gateway, GatewayError, Navigator,
        RefreshPolicy, RegistrarClient, RegistrarClientBuilder, RegistrarError, ResponseEnvelope,
        SessionState, UserIdentity,
    };
}
