/// Kind of purchasable item, as the coordinator sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IapProductType {
    /// Auto-renewing subscription.
    Subscription,
    /// One-time (in-app) product.
    OneTime,
}

/// A purchasable item: stable product identifier plus its kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IapProduct {
    pub product_id: String,
    pub product_type: IapProductType,
}

impl IapProduct {
    pub fn new(product_id: impl Into<String>, product_type: IapProductType) -> Self {
        Self {
            product_id: product_id.into(),
            product_type,
        }
    }

    pub fn subscription(product_id: impl Into<String>) -> Self {
        Self::new(product_id, IapProductType::Subscription)
    }

    pub fn one_time(product_id: impl Into<String>) -> Self {
        Self::new(product_id, IapProductType::OneTime)
    }
}
