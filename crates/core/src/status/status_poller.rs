//! Payment status poller.
//!
//! Resolves the tracked donation once, then keeps re-checking it on a fixed
//! interval for as long as it is pending. The repeating task is owned by a
//! [`StatusWatch`]; dropping the watch aborts the task together with its timer.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::status_model::{PaymentStatus, PaymentStatusView};
use crate::constants::STATUS_POLL_INTERVAL_SECS;
use crate::donations::DonationApiTrait;
use crate::errors::Error;
use crate::storage::CurrentDonationSlot;

/// Resolves and tracks the status of the donation held in the durable slot.
#[derive(Clone)]
pub struct PaymentStatusPoller {
    api: Arc<dyn DonationApiTrait>,
    slot: CurrentDonationSlot,
    interval: Duration,
}

impl PaymentStatusPoller {
    pub fn new(api: Arc<dyn DonationApiTrait>, slot: CurrentDonationSlot) -> Self {
        Self {
            api,
            slot,
            interval: Duration::from_secs(STATUS_POLL_INTERVAL_SECS),
        }
    }

    /// Override the re-check interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Identifier of the tracked donation, or `Err` with a view describing
    /// why it could not be read.
    fn tracked_id(&self) -> Result<Option<String>, PaymentStatusView> {
        self.slot.get().map_err(|e| {
            warn!("[StatusPoller] Failed to read tracked donation: {}", e);
            PaymentStatusView::error(None, e.to_string())
        })
    }

    /// Query the backend once for `donation_id`.
    async fn check(&self, donation_id: &str) -> PaymentStatusView {
        match self.api.get_donation_status(donation_id).await {
            Ok(record) => {
                let view = PaymentStatusView::from_record(donation_id, &record);
                debug!(
                    "[StatusPoller] Donation {} has code {:?} ({:?})",
                    donation_id, record.status, view.status
                );
                view
            }
            Err(Error::Api(api)) => {
                if api.is_transport() {
                    warn!(
                        "[StatusPoller] Backend unreachable while checking {}: {}",
                        donation_id, api
                    );
                } else {
                    warn!(
                        "[StatusPoller] Status lookup for {} failed ({:?}): {}",
                        donation_id, api.status, api
                    );
                }
                PaymentStatusView::error(Some(donation_id), api.message)
            }
            Err(e) => {
                warn!(
                    "[StatusPoller] Status lookup for {} failed: {}",
                    donation_id, e
                );
                PaymentStatusView::error(Some(donation_id), e.to_string())
            }
        }
    }

    /// Side effect of leaving a terminal state: stop tracking the donation.
    fn settle(&self, view: &PaymentStatusView) {
        if !view.status.is_terminal() {
            return;
        }
        let Some(donation_id) = view.donation_id.as_deref() else {
            return;
        };
        // A newer donation may already occupy the slot; leave it alone.
        match self.slot.get() {
            Ok(Some(current)) if current == donation_id => {
                if let Err(e) = self.slot.clear() {
                    warn!(
                        "[StatusPoller] Failed to clear tracked donation {}: {}",
                        donation_id, e
                    );
                } else {
                    info!(
                        "[StatusPoller] Donation {} settled as {:?}",
                        donation_id, view.status
                    );
                }
            }
            Ok(_) => {}
            Err(e) => warn!("[StatusPoller] Failed to read tracked donation: {}", e),
        }
    }

    /// Resolve the tracked donation once.
    ///
    /// Without a tracked donation this yields [`PaymentStatus::Unknown`] and
    /// makes no network call.
    pub async fn resolve_once(&self) -> PaymentStatusView {
        let donation_id = match self.tracked_id() {
            Ok(Some(id)) => id,
            Ok(None) => {
                debug!("[StatusPoller] No tracked donation");
                return PaymentStatusView::unknown();
            }
            Err(view) => return view,
        };
        let view = self.check(&donation_id).await;
        self.settle(&view);
        view
    }

    /// Start tracking in a background task.
    ///
    /// The tracked identifier is read here, once; later changes to the slot do
    /// not redirect a running poll. Must be called from within a tokio runtime.
    pub fn start(self) -> StatusWatch {
        let tracked = self.tracked_id();
        let (tx, rx) = watch::channel(None);
        let handle = tokio::spawn(self.run(tracked, tx));
        StatusWatch { rx, handle }
    }

    async fn run(
        self,
        tracked: Result<Option<String>, PaymentStatusView>,
        tx: watch::Sender<Option<PaymentStatusView>>,
    ) {
        let donation_id = match tracked {
            Ok(Some(id)) => id,
            Ok(None) => {
                debug!("[StatusPoller] No tracked donation");
                let _ = tx.send(Some(PaymentStatusView::unknown()));
                return;
            }
            Err(view) => {
                let _ = tx.send(Some(view));
                return;
            }
        };

        let view = self.check(&donation_id).await;
        if !self.publish(&tx, view) {
            return;
        }

        // One timer per pending episode; it is dropped with this frame.
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        debug!(
            "[StatusPoller] Donation {} pending, re-checking every {:?}",
            donation_id, self.interval
        );

        loop {
            ticker.tick().await;
            let view = self.check(&donation_id).await;
            if !self.publish(&tx, view) {
                return;
            }
        }
    }

    /// Publish a view and settle it. Returns whether polling should continue.
    fn publish(
        &self,
        tx: &watch::Sender<Option<PaymentStatusView>>,
        view: PaymentStatusView,
    ) -> bool {
        if tx.is_closed() {
            debug!("[StatusPoller] Watcher gone, discarding result");
            return false;
        }
        let pending = view.status.is_pending();
        self.settle(&view);
        let _ = tx.send(Some(view));
        pending
    }
}

/// Handle to a running status poll.
///
/// Holds the latest view (`None` until the first lookup finishes). Dropping
/// the handle tears the poll down: the task is aborted and its interval timer
/// goes with it.
#[derive(Debug)]
pub struct StatusWatch {
    rx: watch::Receiver<Option<PaymentStatusView>>,
    handle: JoinHandle<()>,
}

impl StatusWatch {
    /// Latest view, if any lookup has finished.
    pub fn current(&self) -> Option<PaymentStatusView> {
        self.rx.borrow().clone()
    }

    /// Wait for the next published view. `None` once the poll has ended.
    pub async fn changed(&mut self) -> Option<PaymentStatusView> {
        match self.rx.changed().await {
            Ok(()) => self.rx.borrow_and_update().clone(),
            Err(_) => None,
        }
    }

    /// Wait until the status is anything but pending.
    pub async fn wait_for_settled(&mut self) -> Option<PaymentStatusView> {
        loop {
            let current = self.rx.borrow_and_update().clone();
            if let Some(view) = current {
                if view.status != PaymentStatus::Pending {
                    return Some(view);
                }
            }
            if self.rx.changed().await.is_err() {
                return self.rx.borrow().clone();
            }
        }
    }

    /// Whether the background task has ended.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Tear the poll down.
    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for StatusWatch {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
