//! Session coordinator configuration.

use std::time::Duration;

/// How long the "session expired" notice stays up before the user is
/// signed out.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(5);

/// Where the user is sent after a forced sign-out.
pub const DEFAULT_SIGN_IN_ROUTE: &str = "/login";

/// Configuration for a [`SessionCoordinator`](crate::SessionCoordinator).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Countdown between an unrecoverable expiry and the forced sign-out.
    ///
    /// Default: 5 seconds.
    pub grace_period: Duration,

    /// Route handed to the [`Navigator`](crate::Navigator) when the
    /// countdown elapses.
    pub sign_in_route: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            grace_period: DEFAULT_GRACE_PERIOD,
            sign_in_route: DEFAULT_SIGN_IN_ROUTE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_five_seconds_to_login() {
        let config = SessionConfig::default();
        assert_eq!(config.grace_period, Duration::from_secs(5));
        assert_eq!(config.sign_in_route, "/login");
    }
}
