use chrono::serde::ts_milliseconds;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

use super::billing_result_model::BillingResultModel;

/// Purchase record as reported by the billing service, either from a
/// purchases query or from the purchases-updated callback.
///
/// https://developer.android.com/reference/com/android/billingclient/api/Purchase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseModel {
    /// Unique order identifier for the transaction. Absent for pending
    /// purchases.
    pub order_id: Option<String>,
    /// Product ids contained in the purchase.
    pub products: Vec<String>,
    pub purchase_state: PurchaseStateModel,
    #[serde(with = "ts_milliseconds")]
    pub purchase_time: DateTime<Utc>,
    pub purchase_token: String,
    /// Signature of the purchase data, signed with the developer's private
    /// key.
    #[serde(default)]
    pub signature: String,
    #[serde(default)]
    pub is_acknowledged: bool,
    #[serde(default)]
    pub is_auto_renewing: bool,
    /// If not present, the quantity is 1.
    pub quantity: Option<u32>,
}

/// https://developer.android.com/reference/com/android/billingclient/api/Purchase.PurchaseState
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum PurchaseStateModel {
    UnspecifiedState = 0,
    Purchased = 1,
    Pending = 2,
}

/// https://developer.android.com/reference/com/android/billingclient/api/PurchasesResult
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchasesResultModel {
    pub billing_result: BillingResultModel,
    #[serde(default)]
    pub purchases_list: Vec<PurchaseModel>,
}
