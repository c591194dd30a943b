use tokio::sync::broadcast;

use crate::data::models::billing_client::{
    billing_result_model::BillingResultModel, purchase_model::PurchaseModel,
};

const UPDATE_CHANNEL_CAPACITY: usize = 16;

/// Raw payload of one purchases-updated callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchasesUpdate {
    pub billing_result: BillingResultModel,
    pub purchases: Vec<PurchaseModel>,
}

/// Republishes the billing service's single-slot purchases-updated callback
/// as a multi-consumer stream.
///
/// Clone it into the billing-client glue; every clone publishes to the same
/// stream.
#[derive(Debug, Clone)]
pub struct PurchasesUpdatedListener {
    tx: broadcast::Sender<PurchasesUpdate>,
}

impl PurchasesUpdatedListener {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Self { tx }
    }

    /// PurchasesUpdatedListener.onPurchasesUpdated:
    /// https://developer.android.com/reference/com/android/billingclient/api/PurchasesUpdatedListener
    ///
    /// Accepted whether or not a purchase flow is in flight.
    pub fn on_purchases_updated(
        &self,
        billing_result: BillingResultModel,
        purchases: Vec<PurchaseModel>,
    ) {
        tracing::info!(
            response_code = billing_result.response_code,
            purchases = purchases.len(),
            "purchases updated"
        );
        let update = PurchasesUpdate {
            billing_result,
            purchases,
        };
        if self.tx.send(update).is_err() {
            tracing::debug!("no subscriber for purchases update");
        }
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<PurchasesUpdate> {
        self.tx.subscribe()
    }
}

impl Default for PurchasesUpdatedListener {
    fn default() -> Self {
        Self::new()
    }
}
