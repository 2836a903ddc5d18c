//! Gateway configuration.

use registrar_protocol::endpoints;

/// How concurrent calls that hit 401 at the same time refresh the
/// credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshPolicy {
    /// Every call runs its own refresh, even when several calls are
    /// refreshing at once.
    PerCall,
    /// Calls that hit 401 while a refresh is in flight wait for that
    /// refresh instead of starting another.
    #[default]
    Coalesced,
}

impl std::str::FromStr for RefreshPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "per-call" | "per_call" | "percall" => Ok(Self::PerCall),
            "coalesced" => Ok(Self::Coalesced),
            other => Err(format!(
                "unknown refresh policy {other:?} (expected \"per-call\" or \"coalesced\")"
            )),
        }
    }
}

/// Configuration for a [`Gateway`](crate::Gateway).
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Absolute URL every descriptor path is resolved against.
    pub base_url: String,
    /// Path of the refresh-credential endpoint, relative to `base_url`.
    pub refresh_path: String,
    pub refresh_policy: RefreshPolicy,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000/api".to_string(),
            refresh_path: endpoints::REFRESH.to_string(),
            refresh_policy: RefreshPolicy::default(),
        }
    }
}

impl GatewayConfig {
    /// Default settings against `base_url`.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Resolves a descriptor path against the base URL.
    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GatewayConfig::default();
        assert_eq!(config.refresh_path, "auth/refresh/");
        assert_eq!(config.refresh_policy, RefreshPolicy::Coalesced);
    }

    #[test]
    fn test_url_for_joins_with_single_slash() {
        let config = GatewayConfig::with_base_url("http://backend.test/api/");
        assert_eq!(
            config.url_for("/students/?level=1"),
            "http://backend.test/api/students/?level=1"
        );
        assert_eq!(config.url_for("auth/me/"), "http://backend.test/api/auth/me/");
    }

    #[test]
    fn test_refresh_policy_from_str() {
        assert_eq!("per-call".parse::<RefreshPolicy>(), Ok(RefreshPolicy::PerCall));
        assert_eq!(" Coalesced ".parse::<RefreshPolicy>(), Ok(RefreshPolicy::Coalesced));
        assert!("sometimes".parse::<RefreshPolicy>().is_err());
    }
}
