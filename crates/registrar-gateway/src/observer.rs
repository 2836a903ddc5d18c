//! Expiry notification hook.
//!
//! The gateway doesn't know what a "session" is. When a credential can't
//! be refreshed it tells whoever registered an [`ExpiryObserver`], and
//! carries on failing the call. The session coordinator registers itself
//! here at construction.

/// Receives the gateway's "session is unrecoverable" signal.
///
/// # Contract
///
/// - Called synchronously from inside the failing call, so an observer
///   that flips a flag has flipped it before that call returns.
/// - Fire-and-forget: the observer can't influence the call's result.
/// - Must not block. Long work (timers, navigation) belongs in a task the
///   observer spawns.
pub trait ExpiryObserver: Send + Sync + 'static {
    /// The credential was rejected and could not be refreshed.
    fn session_expired(&self);
}
