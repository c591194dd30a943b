use serde::{Deserialize, Serialize};

use super::product_details_model::ProductTypeModel;

/// Parameters handed to the billing service to launch the purchase UI.
///
/// https://developer.android.com/reference/com/android/billingclient/api/BillingFlowParams
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingFlowParamsModel {
    pub product_details_params_list: Vec<ProductDetailsParamsModel>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetailsParamsModel {
    pub product_id: String,
    pub product_type: ProductTypeModel,
    /// Required for subscriptions, absent for one-time products.
    pub offer_token: Option<String>,
}
