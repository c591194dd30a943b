use thiserror::Error;

/// Typed failure reported by the billing service, or by the coordinator on
/// its behalf.
///
/// Each variant carries the debug message the billing service attached to the
/// failing result (empty if none was provided).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IapError {
    #[error("user cancelled the purchase flow: {0}")]
    UserCancelled(String),
    #[error("item is already owned: {0}")]
    ItemAlreadyOwned(String),
    #[error("billing developer error: {0}")]
    DeveloperError(String),
    #[error("billing service disconnected: {0}")]
    ServiceDisconnected(String),
    #[error("billing is unavailable: {0}")]
    BillingUnavailable(String),
    #[error("item is unavailable: {0}")]
    ItemUnavailable(String),
    #[error("feature not supported: {0}")]
    FeatureNotSupported(String),
    #[error("billing service timed out: {0}")]
    ServiceTimeout(String),
    #[error("billing service is unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("item is not owned: {0}")]
    ItemNotOwned(String),
    #[error("unknown billing error: {0}")]
    Unknown(String),
}

impl IapError {
    pub fn debug_message(&self) -> &str {
        match self {
            IapError::UserCancelled(m)
            | IapError::ItemAlreadyOwned(m)
            | IapError::DeveloperError(m)
            | IapError::ServiceDisconnected(m)
            | IapError::BillingUnavailable(m)
            | IapError::ItemUnavailable(m)
            | IapError::FeatureNotSupported(m)
            | IapError::ServiceTimeout(m)
            | IapError::ServiceUnavailable(m)
            | IapError::ItemNotOwned(m)
            | IapError::Unknown(m) => m,
        }
    }
}

#[derive(Debug, Error)]
pub enum IapConfigError {
    #[error("failed to parse IAP config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid IAP config: {0}")]
    Invalid(&'static str),
}
