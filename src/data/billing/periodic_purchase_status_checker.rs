use std::{future::Future, sync::Arc, time::Duration};

use parking_lot::Mutex;
use tokio::{sync::watch, task::JoinHandle};

use crate::data::models::billing_client::purchase_model::{
    PurchaseStateModel, PurchasesResultModel,
};

/// Safety net for dropped or delayed purchases-updated callbacks: polls the
/// purchases query until the target product shows up as purchased.
pub(crate) struct PeriodicPurchaseStatusChecker {
    poll_interval: Duration,
    max_attempts: u32,
}

impl PeriodicPurchaseStatusChecker {
    pub(crate) fn new(poll_interval: Duration, max_attempts: u32) -> Self {
        Self {
            poll_interval,
            max_attempts,
        }
    }

    /// Spawns the polling loop. Each attempt sleeps for the poll interval,
    /// then runs `query`. The first successful result containing
    /// `target_product_id` in the purchased state is passed to `on_found` and
    /// ends the loop. Running out of attempts ends it silently.
    ///
    /// Must be called from within a tokio runtime.
    pub(crate) fn start<Q, Fut, F>(
        &self,
        target_product_id: String,
        query: Q,
        on_found: F,
    ) -> PurchaseStatusCheckJob
    where
        Q: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = PurchasesResultModel> + Send + 'static,
        F: FnOnce(PurchasesResultModel) + Send + 'static,
    {
        let (cancel_tx, mut cancel_rx) = watch::channel(false);
        let cancelled = Arc::new(Mutex::new(false));
        let poll_interval = self.poll_interval;
        let max_attempts = self.max_attempts;

        let task = tokio::spawn({
            let cancelled = Arc::clone(&cancelled);
            async move {
                for attempt in 1..=max_attempts {
                    tokio::select! {
                        biased;
                        _ = wait_for_cancel(&mut cancel_rx) => {
                            tracing::debug!(product_id = %target_product_id, "purchase status check cancelled");
                            return;
                        }
                        _ = tokio::time::sleep(poll_interval) => {}
                    }
                    tracing::debug!(product_id = %target_product_id, attempt, "checking purchase status");
                    // An in-flight query is dropped on cancellation.
                    let result = tokio::select! {
                        biased;
                        _ = wait_for_cancel(&mut cancel_rx) => {
                            tracing::debug!(product_id = %target_product_id, "purchase status check cancelled");
                            return;
                        }
                        result = query() => result,
                    };
                    if !is_purchased(&result, &target_product_id) {
                        continue;
                    }
                    let mut cancelled = cancelled.lock();
                    if *cancelled {
                        return;
                    }
                    *cancelled = true;
                    tracing::info!(product_id = %target_product_id, attempt, "purchase found by status check");
                    on_found(result);
                    return;
                }
                tracing::info!(
                    product_id = %target_product_id,
                    max_attempts,
                    "purchase status check exhausted"
                );
            }
        });

        PurchaseStatusCheckJob {
            cancelled,
            cancel_tx,
            task,
        }
    }
}

async fn wait_for_cancel(cancel_rx: &mut watch::Receiver<bool>) {
    loop {
        let cancelled = *cancel_rx.borrow_and_update();
        if cancelled || cancel_rx.changed().await.is_err() {
            return;
        }
    }
}

fn is_purchased(result: &PurchasesResultModel, product_id: &str) -> bool {
    result.billing_result.is_success()
        && result.purchases_list.iter().any(|p| {
            p.purchase_state == PurchaseStateModel::Purchased
                && p.products.iter().any(|id| id == product_id)
        })
}

/// Handle to a running status check. Dropping it cancels the check and
/// aborts its task.
pub(crate) struct PurchaseStatusCheckJob {
    /// Set on cancellation, and by the loop right before it fires `on_found`.
    /// Checked and set under the same lock, so `on_found` cannot start once
    /// `cancel` has returned.
    cancelled: Arc<Mutex<bool>>,
    cancel_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl PurchaseStatusCheckJob {
    /// Safe to call any number of times, including after completion.
    pub(crate) fn cancel(&self) {
        *self.cancelled.lock() = true;
        self.cancel_tx.send_replace(true);
    }

    #[cfg(test)]
    pub(crate) fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for PurchaseStatusCheckJob {
    fn drop(&mut self) {
        self.cancel();
        self.task.abort();
    }
}
