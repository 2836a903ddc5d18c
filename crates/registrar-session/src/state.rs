//! Session state: what the rest of the client reads about who is signed in.
//!
//! The coordinator is the only writer. Everyone else gets a snapshot
//! ([`SessionState`] is `Clone`) or a change subscription.

use std::time::Duration;

use registrar_protocol::UserIdentity;

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// Authentication state of the running client.
///
/// Per expiry episode the state moves one way only:
///
/// ```text
///   Normal ──(refresh failed)──→ ExpiredPending ──(grace elapsed)──→ LoggedOut
///   expired = false              expired = true                      expired = false
///                                user still set                      user = None
/// ```
///
/// While `expired` is `true` the user is already scheduled for removal;
/// it is cleared no later than the forced navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    /// The signed-in user, if any.
    pub user: Option<UserIdentity>,

    /// `true` until the startup identity check has finished, whatever its outcome.
    pub loading: bool,

    /// `true` while a forced sign-out is counting down.
    pub expired: bool,
}

impl SessionState {
    /// The state before the startup identity check has run.
    pub fn initial() -> Self {
        Self {
            user: None,
            loading: true,
            expired: false,
        }
    }

    /// Whether a user is currently signed in.
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::initial()
    }
}

// ---------------------------------------------------------------------------
// ExpiryOverlay
// ---------------------------------------------------------------------------

/// What an expiry notice needs to render: the time left before the
/// forced sign-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryOverlay {
    pub remaining: Duration,
}
