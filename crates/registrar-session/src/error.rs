//! Error types for the session layer.

use registrar_gateway::GatewayError;

/// Errors returned by [`SessionCoordinator`](crate::SessionCoordinator)
/// operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The underlying call failed. Carries the gateway's error unchanged,
    /// so a rejected sign-in shows the service's own message.
    #[error(transparent)]
    Request(#[from] GatewayError),

    /// The service accepted the sign-in but sent no identity back.
    #[error("sign-in response carried no user")]
    MissingIdentity,

    /// A forced sign-out is counting down; a new sign-in has to wait for
    /// it to finish.
    #[error("session expired; sign-in is available after the forced sign-out")]
    ExpiryPending,
}
