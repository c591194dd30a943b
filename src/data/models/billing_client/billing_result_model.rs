use serde::{Deserialize, Serialize};

/// Outcome attached to every billing-service response and callback.
///
/// https://developer.android.com/reference/com/android/billingclient/api/BillingResult
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingResultModel {
    /// One of the codes in [`response_code`]. Kept as a raw integer because
    /// the service may report codes newer than this crate knows about.
    pub response_code: i32,
    /// Developer-facing description of the result. Not localized.
    #[serde(default)]
    pub debug_message: String,
}

impl BillingResultModel {
    pub fn ok() -> Self {
        Self::new(response_code::OK, "")
    }

    pub fn new(response_code: i32, debug_message: impl Into<String>) -> Self {
        Self {
            response_code,
            debug_message: debug_message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.response_code == response_code::OK
    }
}

/// Billing response codes:
/// https://developer.android.com/reference/com/android/billingclient/api/BillingClient.BillingResponseCode
pub mod response_code {
    pub const SERVICE_TIMEOUT: i32 = -3;
    pub const FEATURE_NOT_SUPPORTED: i32 = -2;
    pub const SERVICE_DISCONNECTED: i32 = -1;
    pub const OK: i32 = 0;
    pub const USER_CANCELED: i32 = 1;
    pub const SERVICE_UNAVAILABLE: i32 = 2;
    pub const BILLING_UNAVAILABLE: i32 = 3;
    pub const ITEM_UNAVAILABLE: i32 = 4;
    pub const DEVELOPER_ERROR: i32 = 5;
    pub const ERROR: i32 = 6;
    pub const ITEM_ALREADY_OWNED: i32 = 7;
    pub const ITEM_NOT_OWNED: i32 = 8;
    pub const NETWORK_ERROR: i32 = 12;
}
