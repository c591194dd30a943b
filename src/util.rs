use tokio::sync::broadcast;

use crate::{
    config::IapConfig,
    data::{
        billing::{
            connection_state_handler::ConnectionState,
            purchases_updated_listener::PurchasesUpdatedListener,
        },
        datasources::billing_client_datasource::BillingClientDatasource,
        repositories::iap_repository_impl::IapRepositoryImpl,
    },
    domain::{
        entities::{
            iap_product::{IapProduct, IapProductType},
            iap_product_details::{IapProductDetails, IapProductDetailsResponse},
            iap_purchase::IapPurchaseState,
            iap_purchase_result::IapPurchaseResult,
        },
        repositories::iap_repository::IapRepository,
    },
    errors::IapError,
};

pub struct IapUtil<R: IapRepository> {
    iap_repository: R,
    config: IapConfig,
}

impl<R: IapRepository> IapUtil<R> {
    pub fn connect(&self) {
        self.iap_repository.connect()
    }

    pub fn disconnect(&self) {
        self.iap_repository.disconnect()
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.iap_repository.connection_state()
    }

    pub async fn fetch_purchases(&self, product_type: IapProductType) -> IapPurchaseResult {
        self.iap_repository.fetch_purchases(product_type).await
    }

    pub async fn start_purchase(&self, activity: &R::Activity, product_details: &IapProductDetails) {
        self.iap_repository
            .start_purchase(activity, product_details)
            .await
    }

    pub async fn fetch_product_details(&self, product: &IapProduct) -> IapProductDetailsResponse {
        self.iap_repository.fetch_product_details(product).await
    }

    /// Stream of purchase outcomes. Subscribe before calling
    /// [`IapUtil::start_purchase`] to observe its result.
    pub fn purchase_results(&self) -> broadcast::Receiver<IapPurchaseResult> {
        self.iap_repository.purchase_results()
    }

    /// True if a purchase of the product is currently held in the purchased
    /// state. Pending purchases do not count.
    pub async fn is_product_purchased(&self, product: &IapProduct) -> Result<bool, IapError> {
        match self.fetch_purchases(product.product_type).await {
            IapPurchaseResult::Success(purchases) => Ok(purchases.iter().any(|p| {
                p.state == IapPurchaseState::Purchased && p.contains_product(&product.product_id)
            })),
            IapPurchaseResult::Error(e) => Err(e),
        }
    }

    /// True if the product is priced in one of the configured currencies.
    pub async fn is_product_supported(&self, product: &IapProduct) -> Result<bool, IapError> {
        match self.fetch_product_details(product).await {
            IapProductDetailsResponse::Success(details) => {
                let supported = self.config.is_currency_supported(&details.currency);
                if !supported {
                    tracing::info!(
                        product_id = %product.product_id,
                        currency = %details.currency,
                        "product priced in unsupported currency"
                    );
                }
                Ok(supported)
            }
            IapProductDetailsResponse::Error(e) => Err(e),
        }
    }
}

impl<B: BillingClientDatasource> IapUtil<IapRepositoryImpl<B>> {
    /// `purchases_updated_listener` must be the listener the billing client
    /// reports purchase updates to. Must be called from within a tokio
    /// runtime.
    pub fn new(
        billing_client: B,
        purchases_updated_listener: &PurchasesUpdatedListener,
        config: IapConfig,
    ) -> Self {
        Self {
            iap_repository: IapRepositoryImpl::new(
                billing_client,
                purchases_updated_listener,
                &config,
            ),
            config,
        }
    }
}
