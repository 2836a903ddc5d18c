//! Client configuration, assembled from defaults and the environment.
//!
//! | variable | meaning | default |
//! |---|---|---|
//! | `REGISTRAR_BASE_URL` | service base URL | `http://127.0.0.1:8000/api` |
//! | `REGISTRAR_GRACE_SECS` | forced sign-out countdown, seconds | `5` |
//! | `REGISTRAR_REFRESH_POLICY` | `coalesced` or `per-call` | `coalesced` |

use std::time::Duration;

use registrar_gateway::{GatewayConfig, RefreshPolicy};
use registrar_session::SessionConfig;
use url::Url;

use crate::RegistrarError;

pub const ENV_BASE_URL: &str = "REGISTRAR_BASE_URL";
pub const ENV_GRACE_SECS: &str = "REGISTRAR_GRACE_SECS";
pub const ENV_REFRESH_POLICY: &str = "REGISTRAR_REFRESH_POLICY";

/// Everything needed to build a [`RegistrarClient`](crate::RegistrarClient).
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    pub gateway: GatewayConfig,
    pub session: SessionConfig,
}

impl ClientConfig {
    /// Reads overrides from the process environment.
    ///
    /// Unset variables keep their defaults.
    ///
    /// # Errors
    /// [`RegistrarError::Config`] naming the variable that couldn't be used.
    pub fn from_env() -> Result<Self, RegistrarError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), reading values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, RegistrarError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(base_url) = lookup(ENV_BASE_URL) {
            config.gateway.base_url = parse_base_url(&base_url)?;
        }
        if let Some(secs) = lookup(ENV_GRACE_SECS) {
            let secs: u64 = secs
                .trim()
                .parse()
                .map_err(|e| RegistrarError::Config(format!("{ENV_GRACE_SECS}: {e}")))?;
            config.session.grace_period = Duration::from_secs(secs);
        }
        if let Some(policy) = lookup(ENV_REFRESH_POLICY) {
            config.gateway.refresh_policy = policy
                .parse::<RefreshPolicy>()
                .map_err(|e| RegistrarError::Config(format!("{ENV_REFRESH_POLICY}: {e}")))?;
        }

        Ok(config)
    }
}

/// Checks that `raw` is an absolute http(s) URL; returns it without a
/// trailing slash.
pub(crate) fn parse_base_url(raw: &str) -> Result<String, RegistrarError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| RegistrarError::Config(format!("{ENV_BASE_URL}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(RegistrarError::Config(format!(
            "{ENV_BASE_URL}: unsupported scheme {:?}",
            url.scheme()
        )));
    }
    Ok(url.as_str().trim_end_matches('/').to_string())
}
