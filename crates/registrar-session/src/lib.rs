//! Session lifecycle for Registrar.
//!
//! This crate owns "who is signed in" for a running client:
//!
//! 1. **Startup**: probing the service for an existing session
//!    ([`SessionCoordinator::bootstrap`])
//! 2. **Sign-in / sign-out**: through the gateway, storing the identity
//!    the service returns
//! 3. **Forced sign-out**: when the gateway can't refresh an expired
//!    credential, a grace-period countdown ends with the user cleared and
//!    the shell sent to the sign-in route ([`Navigator`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Shell (above)  ← reads SessionState, shows the expiry overlay
//!     ↕
//! Session Layer (this crate)  ← identity, countdown, forced navigation
//!     ↕
//! Gateway Layer (below)  ← executes calls, reports unrecoverable expiry
//! ```

mod config;
mod coordinator;
mod error;
mod navigator;
mod state;

pub use config::{DEFAULT_GRACE_PERIOD, DEFAULT_SIGN_IN_ROUTE, SessionConfig};
pub use coordinator::SessionCoordinator;
pub use error::SessionError;
pub use navigator::Navigator;
pub use state::{ExpiryOverlay, SessionState};
