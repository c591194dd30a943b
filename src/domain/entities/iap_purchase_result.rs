use crate::errors::IapError;

use super::iap_purchase::IapPurchase;

/// Terminal outcome of a purchase query or purchase attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IapPurchaseResult {
    Success(Vec<IapPurchase>),
    Error(IapError),
}

impl From<Result<Vec<IapPurchase>, IapError>> for IapPurchaseResult {
    fn from(result: Result<Vec<IapPurchase>, IapError>) -> Self {
        match result {
            Ok(purchases) => IapPurchaseResult::Success(purchases),
            Err(e) => IapPurchaseResult::Error(e),
        }
    }
}
