//! Core rate limiter implementation.

use std::future;
use std::pin::pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, trace};

use crate::error::Result;
use crate::store::SlotStore;

use super::allocator::SlotAllocator;
use super::request::PermitRequest;
use super::slots::SlotKey;

/// Slot scans per window while waiting for a free slot.
const SCANS_PER_PERIOD: u32 = 5;
/// Maximum wait, in windows, before a waiting caller is denied.
const WAIT_HORIZON_PERIODS: u32 = 16;

/// Outcome of an admission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// A slot was claimed; the operation may proceed.
    Granted,
    /// Every slot was occupied and the request did not wait.
    Denied,
    /// The request waited through the full horizon without a slot freeing.
    TimedOut,
    /// The cancellation signal resolved while waiting.
    Cancelled,
}

impl Admission {
    /// Helper to check for admission.
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Granted)
    }
}

/// The admission controller.
///
/// Bounds operations to the request's window by scanning a fixed pool of
/// time-boxed slots in the shared store and claiming the first free one.
/// Stateless between calls: every decision goes through the store, so any
/// number of limiters across threads and processes enforce a single pool as
/// long as they share a namespace.
pub struct RateLimiter {
    /// Claims slots against the injected store.
    allocator: SlotAllocator,
    /// Key prefix for this limiter's slot pool.
    namespace: String,
}

impl RateLimiter {
    /// Create a limiter over an injected store.
    ///
    /// Callers sharing `namespace` compete for the same slot pool; disjoint
    /// namespaces are limited independently.
    pub fn new(store: Arc<dyn SlotStore>, namespace: impl Into<String>) -> Self {
        Self {
            allocator: SlotAllocator::new(store),
            namespace: namespace.into(),
        }
    }

    /// Request admission for one operation.
    ///
    /// Immediate requests return [`Admission::Denied`] as soon as every slot
    /// is occupied. Waiting requests rescan every `period / 5` until a slot
    /// frees, giving up with [`Admission::TimedOut`] once the accumulated
    /// wait reaches sixteen windows.
    ///
    /// Store faults propagate as errors; they are never mapped to a deny
    /// (which would throttle callers through an outage) or an admit (which
    /// would bypass the limit entirely).
    pub async fn acquire(&self, request: &PermitRequest) -> Result<Admission> {
        self.acquire_with_cancel(request, future::pending()).await
    }

    /// Request admission, giving up early when `cancel` resolves.
    ///
    /// Cancellation takes effect between scans and never leaves a partial
    /// claim behind: a scan that already claimed its slot reports
    /// [`Admission::Granted`] before the signal is looked at again.
    pub async fn acquire_with_cancel<F>(
        &self,
        request: &PermitRequest,
        cancel: F,
    ) -> Result<Admission>
    where
        F: std::future::Future<Output = ()> + Send,
    {
        let window = request.window;
        let keys = SlotKey::sequence(&self.namespace, window.ops());
        let poll_interval = window.period() / SCANS_PER_PERIOD;
        let wait_horizon = window.period() * WAIT_HORIZON_PERIODS;

        let mut cancel = pin!(cancel);
        let mut waited = Duration::ZERO;

        loop {
            if let Some(slot) = self.scan(&keys, window.period()).await? {
                debug!(namespace = %self.namespace, slot, "Slot claimed");
                return Ok(Admission::Granted);
            }

            if !request.wait {
                trace!(namespace = %self.namespace, "No free slot, dropping");
                return Ok(Admission::Denied);
            }

            tokio::select! {
                _ = &mut cancel => {
                    debug!(namespace = %self.namespace, "Wait cancelled");
                    return Ok(Admission::Cancelled);
                }
                _ = sleep(poll_interval) => {}
            }

            waited += poll_interval;
            if waited >= wait_horizon {
                debug!(
                    namespace = %self.namespace,
                    waited = ?waited,
                    "Wait horizon exceeded, dropping"
                );
                return Ok(Admission::TimedOut);
            }
        }
    }

    /// Scan the slot sequence in ascending index order and claim the first
    /// free slot.
    ///
    /// The low-index-first bias is an artifact of the stable scan order, not
    /// a fairness guarantee.
    async fn scan(&self, keys: &[SlotKey], period: Duration) -> Result<Option<u32>> {
        for key in keys {
            if self.allocator.try_claim(key, period).await? {
                return Ok(Some(key.index));
            }
        }

        Ok(None)
    }
}
