//! Session-aware request gateway for Registrar.
//!
//! Every call to the backing service goes through one [`Gateway`]. It:
//!
//! 1. **Applies transport defaults**: JSON content type, credential
//!    carriage (cookies) on every request
//! 2. **Classifies the response**: no-content, data, or a rejected call
//!    with the service's own error message
//! 3. **Recovers expired credentials**: on the first 401 of a call it
//!    refreshes the credential once and replays the call once
//! 4. **Reports unrecoverable expiry**: if the refresh can't reach the
//!    service, the registered [`ExpiryObserver`] is told and the call fails
//!    with [`GatewayError::SessionExpired`]
//!
//! # How it fits in the stack
//!
//! ```text
//! Session Layer (above)  ← observes expiry, signs in/out through the gateway
//!     ↕
//! Gateway Layer (this crate)  ← classification, refresh, replay
//!     ↕
//! Protocol Layer (below)  ← descriptors, envelopes, endpoints
//! ```

#![allow(async_fn_in_trait)]

mod config;
mod error;
mod gateway;
mod observer;
mod resources;

pub use config::{GatewayConfig, RefreshPolicy};
pub use error::{GatewayError, SESSION_EXPIRED_MESSAGE};
pub use gateway::Gateway;
pub use observer::ExpiryObserver;
