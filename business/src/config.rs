use std::env::vars;
use std::time::Duration;

use log::info;
use serde::Deserialize;
use thiserror::Error;
use ustr::Ustr;

const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// What happens to a mutation that is still waiting on the directory when the
/// operator leaves the view that started it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InFlightPolicy {
    /// The request runs to completion and its invalidations still apply.
    #[default]
    LetComplete,
    /// The request is abandoned: no notification, no invalidation.
    CancelOnNavigation,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration from environment: {0}")]
    Env(#[from] serde_env::Error),
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    staffdesk_api_base_url: Option<String>,
    staffdesk_request_timeout_secs: Option<u64>,
    staffdesk_in_flight_policy: Option<InFlightPolicy>,
}

#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub in_flight_policy: InFlightPolicy,
}

impl ConsoleConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_in_flight_policy(mut self, policy: InFlightPolicy) -> Self {
        self.in_flight_policy = policy;
        self
    }

    /// Base for every directory endpoint, e.g. `https://host/api/v1`.
    pub fn api_url(&self) -> Ustr {
        let base = self.api_base_url.trim_end_matches('/');
        Ustr::from(&format!("{base}/api/v1"))
    }

    /// Reads `STAFFDESK_*` variables from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading console configuration from environment variables");
        Self::from_vars(vars())
    }

    /// Same as [`ConsoleConfig::from_env`], over an explicit set of
    /// `(name, value)` pairs. Names and values share one string type.
    pub fn from_vars<I, S>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (S, S)>,
        S: AsRef<str>,
    {
        let raw: RawConfig = serde_env::from_iter(vars)?;
        Ok(Self::from_raw(raw))
    }

    fn from_raw(raw: RawConfig) -> Self {
        let RawConfig {
            staffdesk_api_base_url,
            staffdesk_request_timeout_secs,
            staffdesk_in_flight_policy,
        } = raw;

        let api_base_url = staffdesk_api_base_url.unwrap_or_else(|| {
            info!("STAFFDESK_API_BASE_URL not set, defaulting to {DEFAULT_API_BASE_URL}");
            DEFAULT_API_BASE_URL.to_owned()
        });

        Self {
            api_base_url,
            request_timeout: Duration::from_secs(
                staffdesk_request_timeout_secs.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            ),
            in_flight_policy: staffdesk_in_flight_policy.unwrap_or_default(),
        }
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            in_flight_policy: InFlightPolicy::default(),
        }
    }
}
