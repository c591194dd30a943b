use chrono::{DateTime, Utc};

use super::iap_product::IapProductType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IapPurchaseState {
    Unspecified,
    Pending,
    Purchased,
}

/// A completed or pending transaction.
///
/// Only built by the mapping layer from a raw billing-service record.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct IapPurchase {
    pub order_id: Option<String>,
    pub products: Vec<IapPurchasedProduct>,
    pub is_acknowledged: bool,
    pub is_auto_renewing: bool,
    pub state: IapPurchaseState,
    pub purchase_time: DateTime<Utc>,
    pub quantity: u32,
    /// Opaque token used to verify the purchase server-side.
    pub purchase_token: String,
    pub signature: String,
}

/// A product contained in a purchase, joined with its resolved details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IapPurchasedProduct {
    pub product_id: String,
    pub product_type: IapProductType,
    pub localized_title: String,
    pub localized_description: String,
    pub price_micros: i64,
    pub currency: String,
}

impl IapPurchase {
    pub fn contains_product(&self, product_id: &str) -> bool {
        self.products.iter().any(|p| p.product_id == product_id)
    }
}
