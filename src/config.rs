use std::time::Duration;

use serde::Deserialize;
use serde_with::{serde_as, DurationMilliSeconds};

use crate::errors::IapConfigError;

/// Delay before each purchase-status poll.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Number of polls after which the safety-net job gives up silently.
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 20;

pub const DEFAULT_SUPPORTED_CURRENCIES: &[&str] = &["USD"];

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IapConfig {
    #[serde(rename = "poll_interval_ms")]
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub poll_interval: Duration,
    pub max_poll_attempts: u32,
    /// ISO 4217 codes for which in-app purchases are offered.
    pub supported_currencies: Vec<String>,
}

impl Default for IapConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_poll_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
            supported_currencies: DEFAULT_SUPPORTED_CURRENCIES
                .iter()
                .map(|c| c.to_string())
                .collect(),
        }
    }
}

impl IapConfig {
    /// Parses a (possibly partial) JSON object. Missing keys fall back to the
    /// defaults.
    pub fn from_json(raw: &str) -> Result<Self, IapConfigError> {
        let config: IapConfig = serde_json::from_str(raw)?;
        if config.max_poll_attempts == 0 {
            return Err(IapConfigError::Invalid(
                "max_poll_attempts must be at least 1",
            ));
        }
        Ok(config)
    }

    pub fn is_currency_supported(&self, currency: &str) -> bool {
        self.supported_currencies
            .iter()
            .any(|c| c.eq_ignore_ascii_case(currency))
    }
}
