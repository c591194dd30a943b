use super::iap_product::{IapProduct, IapProductType};

/// Resolved store metadata for a product. Fetched on demand, never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IapProductDetails {
    pub product_id: String,
    pub product_type: IapProductType,
    pub localized_title: String,
    pub localized_description: String,
    /// Price of the first offer, in micro-units of `currency` (1_000_000 =
    /// 1.00).
    pub price_micros: i64,
    pub formatted_price: String,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Purchasable variants. Subscriptions list one entry per base plan /
    /// offer; one-time products have a single entry without an offer token.
    pub offers: Vec<IapOffer>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IapOffer {
    /// Token handed back to the billing service when launching the flow.
    /// Only subscriptions carry one.
    pub offer_token: Option<String>,
    pub base_plan_id: Option<String>,
    pub offer_id: Option<String>,
    pub price_micros: i64,
    pub formatted_price: String,
    pub currency: String,
}

impl IapProductDetails {
    pub fn product(&self) -> IapProduct {
        IapProduct::new(self.product_id.clone(), self.product_type)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IapProductDetailsResponse {
    Success(IapProductDetails),
    Error(crate::errors::IapError),
}
