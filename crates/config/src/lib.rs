//! Incident CLI configuration
use std::time::Duration;

use clap::Parser;
use url::Url;

/// Default PagerDuty REST API endpoint
pub const DEFAULT_API_URL: &str = "https://api.pagerduty.com";

/// PagerDuty API configuration options
#[derive(Debug, Clone, Parser)]
pub struct PagerDutyOpts {
    /// PagerDuty REST API token
    #[clap(long, env = "PAGERDUTY_API_TOKEN", hide_env_values = true)]
    pub api_token: String,
    /// PagerDuty REST API base URL
    #[clap(long, env = "PAGERDUTY_BASE_URL", default_value = DEFAULT_API_URL)]
    pub base_url: Url,
    /// Email of the PagerDuty user performing write actions (sent as `From`)
    #[clap(long, env = "PAGERDUTY_FROM")]
    pub from: Option<String>,
    /// HTTP request timeout in seconds
    #[clap(long, env = "PAGERDUTY_TIMEOUT_SECS", default_value = "30")]
    pub timeout_secs: u64,
}

impl PagerDutyOpts {
    /// Request timeout as a [`Duration`].
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_verify_cli() {
        use clap::CommandFactory;
        PagerDutyOpts::command().debug_assert()
    }

    #[test]
    #[serial]
    fn test_defaults() {
        let opts = PagerDutyOpts::try_parse_from(["test", "--api-token", "tok"]).unwrap();
        assert_eq!(opts.api_token, "tok");
        assert_eq!(opts.base_url.as_str(), "https://api.pagerduty.com/");
        assert_eq!(opts.from, None);
        assert_eq!(opts.timeout(), Duration::from_secs(30));
    }

    #[test]
    #[serial]
    fn test_env_fallback() {
        // SAFETY: serialized with the other env-reading tests.
        unsafe {
            std::env::set_var("PAGERDUTY_API_TOKEN", "env-token");
            std::env::set_var("PAGERDUTY_FROM", "oncall@example.com");
        }
        let opts = PagerDutyOpts::try_parse_from(["test"]).unwrap();
        unsafe {
            std::env::remove_var("PAGERDUTY_API_TOKEN");
            std::env::remove_var("PAGERDUTY_FROM");
        }
        assert_eq!(opts.api_token, "env-token");
        assert_eq!(opts.from.as_deref(), Some("oncall@example.com"));
    }
}
