use async_trait::async_trait;

use crate::data::{
    billing::connection_state_handler::BillingClientStateListener,
    models::billing_client::{
        billing_flow_params_model::BillingFlowParamsModel,
        billing_result_model::BillingResultModel,
        product_details_model::{ProductDetailsResultModel, ProductTypeModel},
        purchase_model::PurchasesResultModel,
    },
};

/// Outbound contract of the platform billing service.
///
/// Implemented by the host-side glue that talks to the store SDK. Purchase
/// completions are not returned from any method here: the implementation
/// forwards them to the `PurchasesUpdatedListener` it was built with.
#[async_trait]
pub trait BillingClientDatasource: Send + Sync + 'static {
    /// Host handle required to present the purchase UI (an Activity on
    /// Android).
    type Activity: Send + Sync;

    /// BillingClient.startConnection:
    /// https://developer.android.com/reference/com/android/billingclient/api/BillingClient#startConnection(com.android.billingclient.api.BillingClientStateListener)
    ///
    /// listener:
    ///   Must receive exactly the setup-finished and service-disconnected
    ///   callbacks of this connection attempt. May be invoked synchronously
    ///   from within this call.
    fn start_connection(&self, listener: BillingClientStateListener);

    /// BillingClient.endConnection:
    /// https://developer.android.com/reference/com/android/billingclient/api/BillingClient#endConnection()
    fn end_connection(&self);

    /// BillingClient.queryPurchasesAsync:
    /// https://developer.android.com/reference/com/android/billingclient/api/BillingClient#queryPurchasesAsync(com.android.billingclient.api.QueryPurchasesParams,%20com.android.billingclient.api.PurchasesResponseListener)
    ///
    /// product_type:
    ///   Only purchases of this kind are returned.
    async fn query_purchases(&self, product_type: ProductTypeModel) -> PurchasesResultModel;

    /// BillingClient.queryProductDetailsAsync:
    /// https://developer.android.com/reference/com/android/billingclient/api/BillingClient#queryProductDetailsAsync(com.android.billingclient.api.QueryProductDetailsParams,%20com.android.billingclient.api.ProductDetailsResponseListener)
    ///
    /// product_ids:
    ///   Ids to resolve. Unknown ids are omitted from the result rather than
    ///   reported as an error.
    async fn query_product_details(
        &self,
        product_ids: &[String],
        product_type: ProductTypeModel,
    ) -> ProductDetailsResultModel;

    /// BillingClient.launchBillingFlow:
    /// https://developer.android.com/reference/com/android/billingclient/api/BillingClient#launchBillingFlow(android.app.Activity,%20com.android.billingclient.api.BillingFlowParams)
    ///
    /// The returned result only reports whether the UI could be shown; the
    /// outcome of the purchase itself arrives via the purchases-updated
    /// callback.
    fn launch_billing_flow(
        &self,
        activity: &Self::Activity,
        params: BillingFlowParamsModel,
    ) -> BillingResultModel;
}
