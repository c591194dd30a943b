use serde::{Deserialize, Serialize};

use super::billing_result_model::BillingResultModel;

/// Product kind as the billing service spells it.
///
/// https://developer.android.com/reference/com/android/billingclient/api/BillingClient.ProductType
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductTypeModel {
    #[serde(rename = "subs")]
    Subs,
    #[serde(rename = "inapp")]
    InApp,
}

/// https://developer.android.com/reference/com/android/billingclient/api/ProductDetails
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetailsModel {
    pub product_id: String,
    pub product_type: ProductTypeModel,
    /// Localized title, suffixed with the app name.
    pub title: String,
    /// Localized title without the app name.
    pub name: String,
    pub description: String,
    /// Only set for one-time products.
    pub one_time_purchase_offer_details: Option<OneTimePurchaseOfferDetailsModel>,
    /// Only set for subscriptions. One entry per base plan and offer the user
    /// is eligible for.
    pub subscription_offer_details: Option<Vec<SubscriptionOfferDetailsModel>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OneTimePurchaseOfferDetailsModel {
    pub formatted_price: String,
    pub price_amount_micros: i64,
    pub price_currency_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionOfferDetailsModel {
    pub base_plan_id: String,
    pub offer_id: Option<String>,
    /// Required to launch the purchase flow for this offer.
    pub offer_token: String,
    pub pricing_phases: PricingPhasesModel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingPhasesModel {
    #[serde(default)]
    pub pricing_phase_list: Vec<PricingPhaseModel>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingPhaseModel {
    pub formatted_price: String,
    pub price_amount_micros: i64,
    pub price_currency_code: String,
    /// ISO 8601 period, e.g. "P1M".
    pub billing_period: String,
}

/// https://developer.android.com/reference/com/android/billingclient/api/ProductDetailsResult
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetailsResultModel {
    pub billing_result: BillingResultModel,
    #[serde(default)]
    pub product_details_list: Vec<ProductDetailsModel>,
}
