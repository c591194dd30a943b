#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use iap_client::{
    data::{
        datasources::billing_client_datasource::BillingClientDatasource,
        models::billing_client::{
            billing_flow_params_model::BillingFlowParamsModel,
            billing_result_model::BillingResultModel,
            product_details_model::{
                OneTimePurchaseOfferDetailsModel, PricingPhaseModel, PricingPhasesModel,
                ProductDetailsModel, ProductDetailsResultModel, ProductTypeModel,
                SubscriptionOfferDetailsModel,
            },
            purchase_model::{PurchaseModel, PurchaseStateModel, PurchasesResultModel},
        },
    },
    BillingClientStateListener, IapConfig, IapRepositoryImpl, IapUtil, PurchasesUpdatedListener,
};
use parking_lot::Mutex;

pub const POLL_INTERVAL: std::time::Duration = std::time::Duration::from_secs(10);

#[derive(Default)]
struct FakeState {
    /// When set, setup finishes with this result as soon as a connection is
    /// started.
    setup_result: Option<BillingResultModel>,
    listener: Option<BillingClientStateListener>,
    start_calls: usize,
    end_calls: usize,
    purchases: Vec<(ProductTypeModel, PurchasesResultModel)>,
    purchase_queries: usize,
    catalog: Vec<ProductDetailsModel>,
    details_queries: Vec<(String, ProductTypeModel)>,
    launch_result: Option<BillingResultModel>,
    launched: Vec<BillingFlowParamsModel>,
}

/// Scripted billing service. Clones share state, so a test keeps one clone
/// to steer and inspect the one handed to the coordinator.
#[derive(Clone, Default)]
pub struct FakeBillingClient {
    state: Arc<Mutex<FakeState>>,
}

impl FakeBillingClient {
    /// Connects successfully on request.
    pub fn ready() -> Self {
        let client = Self::default();
        client.state.lock().setup_result = Some(BillingResultModel::ok());
        client
    }

    /// Leaves setup pending until the test fires a callback.
    pub fn manual() -> Self {
        Self::default()
    }

    pub fn set_setup_result(&self, result: BillingResultModel) {
        self.state.lock().setup_result = Some(result);
    }

    pub fn set_purchases(&self, product_type: ProductTypeModel, result: PurchasesResultModel) {
        let mut state = self.state.lock();
        state.purchases.retain(|(t, _)| *t != product_type);
        state.purchases.push((product_type, result));
    }

    pub fn add_product(&self, details: ProductDetailsModel) {
        self.state.lock().catalog.push(details);
    }

    pub fn set_launch_result(&self, result: BillingResultModel) {
        self.state.lock().launch_result = Some(result);
    }

    pub fn listener(&self) -> BillingClientStateListener {
        self.state
            .lock()
            .listener
            .clone()
            .expect("no connection started")
    }

    pub fn start_calls(&self) -> usize {
        self.state.lock().start_calls
    }

    pub fn end_calls(&self) -> usize {
        self.state.lock().end_calls
    }

    pub fn purchase_queries(&self) -> usize {
        self.state.lock().purchase_queries
    }

    pub fn details_queries(&self) -> Vec<(String, ProductTypeModel)> {
        self.state.lock().details_queries.clone()
    }

    pub fn launched(&self) -> Vec<BillingFlowParamsModel> {
        self.state.lock().launched.clone()
    }
}

#[async_trait]
impl BillingClientDatasource for FakeBillingClient {
    type Activity = ();

    fn start_connection(&self, listener: BillingClientStateListener) {
        let setup_result = {
            let mut state = self.state.lock();
            state.start_calls += 1;
            state.listener = Some(listener.clone());
            state.setup_result.clone()
        };
        if let Some(result) = setup_result {
            listener.on_billing_setup_finished(result);
        }
    }

    fn end_connection(&self) {
        self.state.lock().end_calls += 1;
    }

    async fn query_purchases(&self, product_type: ProductTypeModel) -> PurchasesResultModel {
        let mut state = self.state.lock();
        state.purchase_queries += 1;
        state
            .purchases
            .iter()
            .find(|(t, _)| *t == product_type)
            .map(|(_, r)| r.clone())
            .unwrap_or_else(|| PurchasesResultModel {
                billing_result: BillingResultModel::ok(),
                purchases_list: vec![],
            })
    }

    async fn query_product_details(
        &self,
        product_ids: &[String],
        product_type: ProductTypeModel,
    ) -> ProductDetailsResultModel {
        let mut state = self.state.lock();
        for id in product_ids {
            state.details_queries.push((id.clone(), product_type));
        }
        ProductDetailsResultModel {
            billing_result: BillingResultModel::ok(),
            product_details_list: state
                .catalog
                .iter()
                .filter(|d| d.product_type == product_type && product_ids.contains(&d.product_id))
                .cloned()
                .collect(),
        }
    }

    fn launch_billing_flow(
        &self,
        _activity: &(),
        params: BillingFlowParamsModel,
    ) -> BillingResultModel {
        let mut state = self.state.lock();
        state.launched.push(params);
        state
            .launch_result
            .clone()
            .unwrap_or_else(BillingResultModel::ok)
    }
}

pub fn config() -> IapConfig {
    IapConfig {
        poll_interval: POLL_INTERVAL,
        max_poll_attempts: 5,
        ..IapConfig::default()
    }
}

pub type FakeIapUtil = IapUtil<IapRepositoryImpl<FakeBillingClient>>;

pub fn util(client: &FakeBillingClient) -> (FakeIapUtil, PurchasesUpdatedListener) {
    let listener = PurchasesUpdatedListener::new();
    let util = IapUtil::new(client.clone(), &listener, config());
    (util, listener)
}

pub fn subscription(product_id: &str, currency: &str) -> ProductDetailsModel {
    ProductDetailsModel {
        product_id: product_id.to_string(),
        product_type: ProductTypeModel::Subs,
        title: format!("{product_id} (App)"),
        name: product_id.to_string(),
        description: String::new(),
        one_time_purchase_offer_details: None,
        subscription_offer_details: Some(vec![SubscriptionOfferDetailsModel {
            base_plan_id: "monthly".to_string(),
            offer_id: None,
            offer_token: format!("{product_id}-token"),
            pricing_phases: PricingPhasesModel {
                pricing_phase_list: vec![PricingPhaseModel {
                    formatted_price: "$4.99".to_string(),
                    price_amount_micros: 4_990_000,
                    price_currency_code: currency.to_string(),
                    billing_period: "P1M".to_string(),
                }],
            },
        }]),
    }
}

pub fn one_time(product_id: &str) -> ProductDetailsModel {
    ProductDetailsModel {
        product_id: product_id.to_string(),
        product_type: ProductTypeModel::InApp,
        title: format!("{product_id} (App)"),
        name: product_id.to_string(),
        description: String::new(),
        one_time_purchase_offer_details: Some(OneTimePurchaseOfferDetailsModel {
            formatted_price: "$0.99".to_string(),
            price_amount_micros: 990_000,
            price_currency_code: "USD".to_string(),
        }),
        subscription_offer_details: None,
    }
}

pub fn purchase(token: &str, products: &[&str], state: PurchaseStateModel) -> PurchaseModel {
    PurchaseModel {
        order_id: Some(format!("GPA.{token}")),
        products: products.iter().map(|p| p.to_string()).collect(),
        purchase_state: state,
        purchase_time: Utc.timestamp_millis_opt(1_700_000_000_000).unwrap(),
        purchase_token: token.to_string(),
        signature: String::new(),
        is_acknowledged: false,
        is_auto_renewing: true,
        quantity: None,
    }
}

pub fn purchases_ok(purchases: Vec<PurchaseModel>) -> PurchasesResultModel {
    PurchasesResultModel {
        billing_result: BillingResultModel::ok(),
        purchases_list: purchases,
    }
}
