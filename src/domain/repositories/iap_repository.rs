use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::{
    data::billing::connection_state_handler::ConnectionState,
    domain::entities::{
        iap_product::{IapProduct, IapProductType},
        iap_product_details::{IapProductDetails, IapProductDetailsResponse},
        iap_purchase_result::IapPurchaseResult,
    },
};

#[async_trait]
pub trait IapRepository: Send + Sync {
    type Activity: Send + Sync;

    fn connect(&self);

    fn disconnect(&self);

    fn connection_state(&self) -> ConnectionState;

    async fn fetch_purchases(&self, product_type: IapProductType) -> IapPurchaseResult;

    /// Returns once the purchase UI has been launched (or launching failed).
    /// The outcome is delivered on [`IapRepository::purchase_results`].
    async fn start_purchase(&self, activity: &Self::Activity, product_details: &IapProductDetails);

    async fn fetch_product_details(&self, product: &IapProduct) -> IapProductDetailsResponse;

    fn purchase_results(&self) -> broadcast::Receiver<IapPurchaseResult>;
}
