//! Configuration for the FNOL tools.

use std::env;
use std::time::Duration;

/// Default AWS region used for request signing.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Configuration for the FNOL collaborators.
#[derive(Debug, Clone, PartialEq)]
pub struct FnolConfig {
    /// Signing region.
    pub region: String,

    /// Full claims-intake URL.
    pub fnol_api_endpoint: Option<String>,

    /// Customer API base URL; `/customer` is appended.
    pub customer_api_endpoint: Option<String>,

    /// Timeout for claim submission.
    pub submit_timeout: Duration,

    /// Timeout for the customer profile lookup.
    pub customer_timeout: Duration,

    /// Idle time after which a session is swept.
    pub session_ttl: Duration,

    /// How often the background sweeper runs.
    pub sweep_interval: Duration,
}

impl Default for FnolConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            fnol_api_endpoint: None,
            customer_api_endpoint: None,
            submit_timeout: Duration::from_secs(30),
            customer_timeout: Duration::from_secs(10),
            session_ttl: Duration::from_secs(30 * 60),
            sweep_interval: Duration::from_secs(60),
        }
    }
}

impl FnolConfig {
    /// Create configuration from environment variables.
    ///
    /// Every variable is optional. Missing endpoints are reported by the
    /// tools that need them, at first use.
    ///
    /// - `AWS_REGION` - Signing region (default: us-east-1)
    /// - `FNOL_API_ENDPOINT` - Claims-intake URL
    /// - `CUSTOMER_API_ENDPOINT` - Customer API base URL
    /// - `FNOL_SUBMIT_TIMEOUT_SECS` - Submission timeout (default: 30)
    /// - `CUSTOMER_API_TIMEOUT_SECS` - Profile lookup timeout (default: 10)
    /// - `FNOL_SESSION_TTL_SECS` - Session idle TTL (default: 1800)
    /// - `FNOL_SWEEP_INTERVAL_SECS` - Sweeper interval (default: 60)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let region = env::var("AWS_REGION")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.region);

        Self {
            region,
            fnol_api_endpoint: non_empty_var("FNOL_API_ENDPOINT"),
            customer_api_endpoint: non_empty_var("CUSTOMER_API_ENDPOINT"),
            submit_timeout: secs_var("FNOL_SUBMIT_TIMEOUT_SECS").unwrap_or(defaults.submit_timeout),
            customer_timeout: secs_var("CUSTOMER_API_TIMEOUT_SECS")
                .unwrap_or(defaults.customer_timeout),
            session_ttl: secs_var("FNOL_SESSION_TTL_SECS").unwrap_or(defaults.session_ttl),
            sweep_interval: secs_var("FNOL_SWEEP_INTERVAL_SECS").unwrap_or(defaults.sweep_interval),
        }
    }

    /// Create a new config builder.
    pub fn builder() -> FnolConfigBuilder {
        FnolConfigBuilder::default()
    }

    /// Full URL of the customer lookup, if a base URL is configured.
    pub fn customer_url(&self) -> Option<String> {
        self.customer_api_endpoint
            .as_deref()
            .map(|base| format!("{}/customer", base.trim_end_matches('/')))
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn secs_var(key: &str) -> Option<Duration> {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .map(Duration::from_secs)
}

/// Builder for FnolConfig.
#[derive(Debug, Default)]
pub struct FnolConfigBuilder {
    config: FnolConfig,
}

impl FnolConfigBuilder {
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.config.region = region.into();
        self
    }

    pub fn fnol_api_endpoint(mut self, url: impl Into<String>) -> Self {
        self.config.fnol_api_endpoint = Some(url.into());
        self
    }

    pub fn customer_api_endpoint(mut self, url: impl Into<String>) -> Self {
        self.config.customer_api_endpoint = Some(url.into());
        self
    }

    pub fn submit_timeout(mut self, timeout: Duration) -> Self {
        self.config.submit_timeout = timeout;
        self
    }

    pub fn customer_timeout(mut self, timeout: Duration) -> Self {
        self.config.customer_timeout = timeout;
        self
    }

    pub fn session_ttl(mut self, ttl: Duration) -> Self {
        self.config.session_ttl = ttl;
        self
    }

    pub fn sweep_interval(mut self, interval: Duration) -> Self {
        self.config.sweep_interval = interval;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> FnolConfig {
        self.config
    }
}
