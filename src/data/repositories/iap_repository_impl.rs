use std::{collections::VecDeque, sync::Arc};

use async_trait::async_trait;
use futures::future::try_join_all;
use parking_lot::Mutex;
use tokio::{
    sync::broadcast::{self, error::RecvError},
    task::JoinHandle,
};

use crate::{
    config::IapConfig,
    data::{
        billing::{
            connection_state_handler::{ConnectionState, ConnectionStateHandler},
            periodic_purchase_status_checker::{
                PeriodicPurchaseStatusChecker, PurchaseStatusCheckJob,
            },
            purchases_updated_listener::{PurchasesUpdate, PurchasesUpdatedListener},
        },
        datasources::billing_client_datasource::BillingClientDatasource,
        mappers::iap_out_mapper::billing_result_to_result,
        models::billing_client::{
            billing_flow_params_model::BillingFlowParamsModel,
            product_details_model::ProductTypeModel,
            purchase_model::{PurchaseModel, PurchaseStateModel, PurchasesResultModel},
        },
    },
    domain::{
        entities::{
            iap_product::{IapProduct, IapProductType},
            iap_product_details::{IapProductDetails, IapProductDetailsResponse},
            iap_purchase::IapPurchase,
            iap_purchase_result::IapPurchaseResult,
        },
        repositories::iap_repository::IapRepository,
    },
    errors::IapError,
};

const RESULT_CHANNEL_CAPACITY: usize = 16;

/// Number of published purchases remembered for duplicate suppression.
const DELIVERED_HISTORY: usize = 64;

/// Coordinates the billing connection, purchase flows and their two
/// completion paths (purchases-updated callback and status polling).
pub struct IapRepositoryImpl<B: BillingClientDatasource> {
    billing_client: Arc<B>,
    connection: ConnectionStateHandler<B>,
    status_checker: PeriodicPurchaseStatusChecker,
    resolver: Arc<PurchaseResolver<B>>,
    update_forwarder: JoinHandle<()>,
}

/// State shared with the update-forwarding task and status-check callbacks.
struct PurchaseResolver<B: BillingClientDatasource> {
    billing_client: Arc<B>,
    results_tx: broadcast::Sender<IapPurchaseResult>,
    // Never drop a `PurchaseStatusCheckJob` while holding this lock: the job
    // fires its callback (which takes this lock) under its own cancel lock.
    attempts: Mutex<AttemptSlot>,
}

#[derive(Default)]
struct AttemptSlot {
    next_id: u64,
    active: Option<PurchaseAttempt>,
    delivered: DeliveredPurchases,
}

/// Purchases already published, keyed on token and state so that a known
/// purchase changing state still counts as new. Oldest entries are evicted.
#[derive(Default)]
struct DeliveredPurchases {
    entries: VecDeque<(String, PurchaseStateModel)>,
}

impl DeliveredPurchases {
    fn contains(&self, purchase: &PurchaseModel) -> bool {
        self.entries.iter().any(|(token, state)| {
            *token == purchase.purchase_token && *state == purchase.purchase_state
        })
    }

    fn record(&mut self, purchases: &[PurchaseModel]) {
        for purchase in purchases {
            if self.contains(purchase) {
                continue;
            }
            if self.entries.len() == DELIVERED_HISTORY {
                self.entries.pop_front();
            }
            self.entries
                .push_back((purchase.purchase_token.clone(), purchase.purchase_state));
        }
    }
}

struct PurchaseAttempt {
    id: u64,
    product: IapProduct,
    resolved: bool,
    status_check_job: Option<PurchaseStatusCheckJob>,
}

#[async_trait]
impl<B: BillingClientDatasource> IapRepository for IapRepositoryImpl<B> {
    type Activity = B::Activity;

    fn connect(&self) {
        self.connection.connect();
    }

    fn disconnect(&self) {
        self.connection.disconnect();
    }

    fn connection_state(&self) -> ConnectionState {
        self.connection.state()
    }

    async fn fetch_purchases(&self, product_type: IapProductType) -> IapPurchaseResult {
        tracing::info!(?product_type, "fetching purchases");
        if let Err(e) = self.connection.wait_until_ready().await {
            return IapPurchaseResult::Error(e);
        }
        let result = self
            .billing_client
            .query_purchases(product_type.into())
            .await;
        if let Err(e) = billing_result_to_result(&result.billing_result) {
            return IapPurchaseResult::Error(e);
        }
        self.resolver
            .map_purchases(result.purchases_list, Some(product_type))
            .await
            .into()
    }

    async fn start_purchase(&self, activity: &B::Activity, product_details: &IapProductDetails) {
        let product = product_details.product();
        tracing::info!(product_id = %product.product_id, "starting purchase");
        if let Err(e) = self.connection.wait_until_ready().await {
            self.resolver.publish(IapPurchaseResult::Error(e));
            return;
        }
        let params = match BillingFlowParamsModel::from_product_details(product_details) {
            Ok(params) => params,
            Err(e) => {
                self.resolver.publish(IapPurchaseResult::Error(e));
                return;
            }
        };

        let (attempt_id, previous) = self.resolver.begin_attempt(product.clone());
        // Cancels the previous attempt's status check, if any.
        drop(previous);

        let launch_result = self.billing_client.launch_billing_flow(activity, params);
        if let Err(e) = billing_result_to_result(&launch_result) {
            tracing::warn!(
                product_id = %product.product_id,
                response_code = launch_result.response_code,
                "billing flow could not be launched"
            );
            drop(self.resolver.end_attempt(attempt_id));
            self.resolver.publish(IapPurchaseResult::Error(e));
            return;
        }

        let query = {
            let billing_client = Arc::clone(&self.billing_client);
            let product_type = ProductTypeModel::from(product.product_type);
            move || {
                let billing_client = Arc::clone(&billing_client);
                async move { billing_client.query_purchases(product_type).await }
            }
        };
        let on_found = {
            let resolver = Arc::clone(&self.resolver);
            move |result: PurchasesResultModel| resolver.on_status_check_match(attempt_id, result)
        };
        let job = self
            .status_checker
            .start(product.product_id.clone(), query, on_found);
        if let Some(job) = self.resolver.attach_status_check(attempt_id, job) {
            // Resolved while the flow was launching.
            job.cancel();
        }
    }

    async fn fetch_product_details(&self, product: &IapProduct) -> IapProductDetailsResponse {
        tracing::info!(product_id = %product.product_id, "fetching product details");
        if let Err(e) = self.connection.wait_until_ready().await {
            return IapProductDetailsResponse::Error(e);
        }
        match self
            .resolver
            .query_product_details(&product.product_id, product.product_type)
            .await
        {
            Ok(details) => IapProductDetailsResponse::Success(details),
            Err(e) => IapProductDetailsResponse::Error(e),
        }
    }

    fn purchase_results(&self) -> broadcast::Receiver<IapPurchaseResult> {
        self.resolver.results_tx.subscribe()
    }
}

impl<B: BillingClientDatasource> IapRepositoryImpl<B> {
    /// `purchases_updated_listener` must be the listener `billing_client`
    /// reports purchase updates to. Must be called from within a tokio
    /// runtime.
    pub(crate) fn new(
        billing_client: B,
        purchases_updated_listener: &PurchasesUpdatedListener,
        config: &IapConfig,
    ) -> Self {
        let billing_client = Arc::new(billing_client);
        let (results_tx, _) = broadcast::channel(RESULT_CHANNEL_CAPACITY);
        let resolver = Arc::new(PurchaseResolver {
            billing_client: Arc::clone(&billing_client),
            results_tx,
            attempts: Mutex::new(AttemptSlot::default()),
        });

        let mut updates = purchases_updated_listener.subscribe();
        let update_forwarder = tokio::spawn({
            let resolver = Arc::clone(&resolver);
            async move {
                loop {
                    match updates.recv().await {
                        Ok(update) => resolver.on_purchases_updated(update).await,
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "purchase updates dropped")
                        }
                        Err(RecvError::Closed) => break,
                    }
                }
            }
        });

        Self {
            connection: ConnectionStateHandler::new(Arc::clone(&billing_client)),
            billing_client,
            status_checker: PeriodicPurchaseStatusChecker::new(
                config.poll_interval,
                config.max_poll_attempts,
            ),
            resolver,
            update_forwarder,
        }
    }
}

impl<B: BillingClientDatasource> Drop for IapRepositoryImpl<B> {
    fn drop(&mut self) {
        self.update_forwarder.abort();
        let attempt = self.resolver.attempts.lock().active.take();
        drop(attempt);
    }
}

impl<B: BillingClientDatasource> PurchaseResolver<B> {
    fn publish(&self, result: IapPurchaseResult) {
        if self.results_tx.send(result).is_err() {
            tracing::debug!("no subscriber for purchase result");
        }
    }

    /// Makes `product` the active attempt and hands back the one it
    /// replaces.
    fn begin_attempt(&self, product: IapProduct) -> (u64, Option<PurchaseAttempt>) {
        let mut slot = self.attempts.lock();
        let id = slot.next_id;
        slot.next_id += 1;
        let previous = slot.active.replace(PurchaseAttempt {
            id,
            product,
            resolved: false,
            status_check_job: None,
        });
        (id, previous)
    }

    fn end_attempt(&self, attempt_id: u64) -> Option<PurchaseAttempt> {
        let mut slot = self.attempts.lock();
        if slot.active.as_ref().is_some_and(|a| a.id == attempt_id) {
            slot.active.take()
        } else {
            None
        }
    }

    /// Returns the job back if the attempt is no longer waiting for an
    /// outcome.
    fn attach_status_check(
        &self,
        attempt_id: u64,
        job: PurchaseStatusCheckJob,
    ) -> Option<PurchaseStatusCheckJob> {
        let mut slot = self.attempts.lock();
        match slot.active.as_mut() {
            Some(attempt) if attempt.id == attempt_id && !attempt.resolved => {
                attempt.status_check_job = Some(job);
                None
            }
            _ => Some(job),
        }
    }

    async fn on_purchases_updated(&self, update: PurchasesUpdate) {
        let Some((product_type, job)) = self.claim_listener_update(&update) else {
            tracing::debug!(
                response_code = update.billing_result.response_code,
                "dropping duplicate purchases update"
            );
            return;
        };
        if let Some(job) = job {
            job.cancel();
        }
        let result = match billing_result_to_result(&update.billing_result) {
            Ok(()) => self
                .map_purchases(update.purchases, product_type)
                .await
                .into(),
            Err(e) => IapPurchaseResult::Error(e),
        };
        self.publish(result);
    }

    /// Decides whether a listener update is new. If so, resolves the active
    /// attempt and hands back its status-check job for cancellation.
    fn claim_listener_update(
        &self,
        update: &PurchasesUpdate,
    ) -> Option<(Option<IapProductType>, Option<PurchaseStatusCheckJob>)> {
        let mut slot = self.attempts.lock();
        let slot = &mut *slot;
        let success = update.billing_result.is_success();
        let attempt_resolved = slot.active.as_ref().is_some_and(|a| a.resolved);
        let already_delivered = success
            && !update.purchases.is_empty()
            && update
                .purchases
                .iter()
                .all(|p| slot.delivered.contains(p));
        if already_delivered || (attempt_resolved && (!success || update.purchases.is_empty())) {
            return None;
        }
        if success {
            slot.delivered.record(&update.purchases);
        }
        Some(match slot.active.as_mut() {
            Some(attempt) => {
                attempt.resolved = true;
                (
                    Some(attempt.product.product_type),
                    attempt.status_check_job.take(),
                )
            }
            None => (None, None),
        })
    }

    /// Status-check callback. Runs under the job's cancel lock, so it must
    /// not block on anything that may cancel a job.
    fn on_status_check_match(self: &Arc<Self>, attempt_id: u64, result: PurchasesResultModel) {
        let (product, purchases) = {
            let mut slot = self.attempts.lock();
            let slot = &mut *slot;
            let Some(attempt) = slot
                .active
                .as_mut()
                .filter(|a| a.id == attempt_id && !a.resolved)
            else {
                return;
            };
            attempt.resolved = true;
            let product = attempt.product.clone();
            let purchases: Vec<PurchaseModel> = result
                .purchases_list
                .into_iter()
                .filter(|p| {
                    p.purchase_state == PurchaseStateModel::Purchased
                        && p.products.contains(&product.product_id)
                })
                .collect();
            if purchases.iter().all(|p| slot.delivered.contains(p)) {
                tracing::debug!(product_id = %product.product_id, "purchase already delivered");
                return;
            }
            slot.delivered.record(&purchases);
            (product, purchases)
        };

        let resolver = Arc::clone(self);
        tokio::spawn(async move {
            let result = resolver
                .map_purchases(purchases, Some(product.product_type))
                .await
                .into();
            resolver.publish(result);
        });
    }

    /// Joins every purchase with the details of each product it contains.
    /// Fails as a whole on the first lookup error.
    async fn map_purchases(
        &self,
        purchases: Vec<PurchaseModel>,
        product_type: Option<IapProductType>,
    ) -> Result<Vec<IapPurchase>, IapError> {
        try_join_all(purchases.into_iter().map(|purchase| async move {
            let details = try_join_all(
                purchase
                    .products
                    .iter()
                    .map(|id| self.resolve_product_details(id, product_type)),
            )
            .await?;
            Ok::<_, IapError>(IapPurchase::from_model(purchase, details))
        }))
        .await
    }

    /// Without a known type, subscriptions are tried before one-time
    /// products.
    async fn resolve_product_details(
        &self,
        product_id: &str,
        product_type: Option<IapProductType>,
    ) -> Result<IapProductDetails, IapError> {
        match product_type {
            Some(product_type) => self.query_product_details(product_id, product_type).await,
            None => match self
                .query_product_details(product_id, IapProductType::Subscription)
                .await
            {
                Err(IapError::ItemUnavailable(_)) => {
                    self.query_product_details(product_id, IapProductType::OneTime)
                        .await
                }
                other => other,
            },
        }
    }

    async fn query_product_details(
        &self,
        product_id: &str,
        product_type: IapProductType,
    ) -> Result<IapProductDetails, IapError> {
        let result = self
            .billing_client
            .query_product_details(&[product_id.to_string()], product_type.into())
            .await;
        billing_result_to_result(&result.billing_result)?;
        result
            .product_details_list
            .into_iter()
            .find(|d| d.product_id == product_id)
            .map(IapProductDetails::from_model)
            .ok_or_else(|| IapError::ItemUnavailable(format!("product {product_id} not found")))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn purchase(token: &str, state: PurchaseStateModel) -> PurchaseModel {
        PurchaseModel {
            order_id: None,
            products: vec!["premium".to_string()],
            purchase_state: state,
            purchase_time: Utc::now(),
            purchase_token: token.to_string(),
            signature: String::new(),
            is_acknowledged: false,
            is_auto_renewing: false,
            quantity: None,
        }
    }

    #[test]
    fn state_change_of_a_delivered_purchase_is_new() {
        let mut delivered = DeliveredPurchases::default();
        delivered.record(&[purchase("t1", PurchaseStateModel::Pending)]);

        assert!(delivered.contains(&purchase("t1", PurchaseStateModel::Pending)));
        assert!(!delivered.contains(&purchase("t1", PurchaseStateModel::Purchased)));
    }

    #[test]
    fn history_is_bounded() {
        let mut delivered = DeliveredPurchases::default();
        let purchases: Vec<_> = (0..DELIVERED_HISTORY + 1)
            .map(|i| purchase(&format!("t{i}"), PurchaseStateModel::Purchased))
            .collect();
        delivered.record(&purchases);
        delivered.record(&purchases[DELIVERED_HISTORY..]);

        assert_eq!(delivered.entries.len(), DELIVERED_HISTORY);
        assert!(!delivered.contains(&purchases[0]));
        assert!(delivered.contains(&purchases[DELIVERED_HISTORY]));
    }
}
