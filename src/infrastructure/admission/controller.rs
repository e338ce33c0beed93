//! Sliding-window admission controller
//!
//! Keeps a log of request instants per identity and a bounded log of denials.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::domain::admission::{
    AdmissionDecision, AdmissionPolicy, BlockEvent, DenialReason, Identity,
};
use crate::infrastructure::observability::record_admission;

const SWEEP_INTERVAL: Duration = Duration::from_secs(300);

/// Per-identity sliding-window rate limiter
#[derive(Debug)]
pub struct AdmissionController {
    policy: AdmissionPolicy,
    /// Admitted request instants per identity, oldest first
    windows: Mutex<HashMap<Identity, VecDeque<Instant>>>,
    /// Most recent denials, oldest first
    block_log: Mutex<VecDeque<BlockEvent>>,
    last_sweep: Mutex<Instant>,
}

impl AdmissionController {
    pub fn new(policy: AdmissionPolicy) -> Self {
        let capacity = policy.block_log_capacity;

        Self {
            policy,
            windows: Mutex::new(HashMap::new()),
            block_log: Mutex::new(VecDeque::with_capacity(capacity)),
            last_sweep: Mutex::new(Instant::now()),
        }
    }

    pub fn policy(&self) -> &AdmissionPolicy {
        &self.policy
    }

    /// Decide whether `identity` may proceed, recording the request if so
    pub async fn admit(&self, identity: &Identity) -> AdmissionDecision {
        self.maybe_sweep().await;

        let now = Instant::now();
        let decision = {
            let mut windows = self.windows.lock().await;
            let window = windows.entry(identity.clone()).or_default();
            let decision = self.evaluate(window, now);

            if window.is_empty() {
                windows.remove(identity);
            }

            decision
        };

        record_admission(decision.is_allowed());

        match &decision {
            AdmissionDecision::Allowed { remaining } => {
                debug!(identity = %identity, remaining, "Request admitted");
            }
            AdmissionDecision::Denied(reason) => {
                warn!(identity = %identity, reason = %reason, "Request denied");
                self.record_block(BlockEvent::new(identity, reason)).await;
            }
        }

        decision
    }

    /// Snapshot of the block log in insertion order
    pub async fn block_log(&self) -> Vec<BlockEvent> {
        self.block_log.lock().await.iter().cloned().collect()
    }

    /// Number of identities currently holding a non-empty window
    pub async fn tracked_identities(&self) -> usize {
        self.windows.lock().await.len()
    }

    fn evaluate(&self, window: &mut VecDeque<Instant>, now: Instant) -> AdmissionDecision {
        prune(window, now, self.policy.window);

        let limit = self.policy.requests_per_window;
        let count = window.len() as u32;

        if count >= limit {
            let retry_after = window
                .front()
                .map(|oldest| self.policy.window.saturating_sub(now.duration_since(*oldest)))
                .unwrap_or(self.policy.window);

            return AdmissionDecision::Denied(DenialReason::RateLimitExceeded {
                limit,
                window_secs: self.policy.window.as_secs(),
                retry_after_secs: ceil_secs(retry_after),
            });
        }

        window.push_back(now);

        AdmissionDecision::Allowed {
            remaining: limit - count - 1,
        }
    }

    async fn record_block(&self, event: BlockEvent) {
        let capacity = self.policy.block_log_capacity;
        if capacity == 0 {
            return;
        }

        let mut log = self.block_log.lock().await;
        while log.len() >= capacity {
            log.pop_front();
        }
        log.push_back(event);
    }

    async fn maybe_sweep(&self) {
        let now = Instant::now();
        {
            let mut last = self.last_sweep.lock().await;
            if now.duration_since(*last) < SWEEP_INTERVAL {
                return;
            }
            *last = now;
        }

        let mut windows = self.windows.lock().await;
        for window in windows.values_mut() {
            prune(window, now, self.policy.window);
        }
        windows.retain(|_, window| !window.is_empty());

        debug!(tracked = windows.len(), "Swept idle admission windows");
    }
}

impl Default for AdmissionController {
    fn default() -> Self {
        Self::new(AdmissionPolicy::default())
    }
}

/// Drop instants that are a full window old or older
fn prune(window: &mut VecDeque<Instant>, now: Instant, length: Duration) {
    while let Some(oldest) = window.front() {
        if now.duration_since(*oldest) >= length {
            window.pop_front();
        } else {
            break;
        }
    }
}

fn ceil_secs(duration: Duration) -> u64 {
    let secs = duration.as_secs();
    if duration.subsec_nanos() > 0 { secs + 1 } else { secs }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    fn identity(key: &str) -> Identity {
        Identity::new("10.0.0.1", key)
    }

    #[tokio::test(start_paused = true)]
    async fn test_allows_limit_then_denies() {
        let controller = AdmissionController::default();
        let id = identity("key1");

        for i in 0..30 {
            let decision = controller.admit(&id).await;
            assert_eq!(decision, AdmissionDecision::Allowed { remaining: 29 - i });
        }

        let decision = controller.admit(&id).await;
        assert!(!decision.is_allowed());
        assert!(matches!(
            decision,
            AdmissionDecision::Denied(DenialReason::RateLimitExceeded { limit: 30, .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exactly_one_more_after_oldest_expires() {
        let controller = AdmissionController::default();
        let id = identity("key1");

        controller.admit(&id).await;
        advance(Duration::from_secs(10)).await;
        for _ in 0..29 {
            assert!(controller.admit(&id).await.is_allowed());
        }
        assert!(!controller.admit(&id).await.is_allowed());

        // Oldest request is now exactly one window old
        advance(Duration::from_secs(50)).await;
        assert!(controller.admit(&id).await.is_allowed());
        assert!(!controller.admit(&id).await.is_allowed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_requests_not_forgotten_before_window_elapses() {
        let controller = AdmissionController::default();
        let id = identity("key1");

        for _ in 0..30 {
            controller.admit(&id).await;
        }

        advance(Duration::from_millis(59_999)).await;
        assert!(!controller.admit(&id).await.is_allowed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_after_reports_time_to_oldest_expiry() {
        let controller = AdmissionController::new(AdmissionPolicy::new(1, Duration::from_secs(60)));
        let id = identity("key1");

        controller.admit(&id).await;
        advance(Duration::from_millis(20_500)).await;

        match controller.admit(&id).await {
            AdmissionDecision::Denied(DenialReason::RateLimitExceeded {
                retry_after_secs, ..
            }) => assert_eq!(retry_after_secs, 40),
            other => panic!("expected denial, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_identical_instants_count_individually() {
        let controller = AdmissionController::new(AdmissionPolicy::new(3, Duration::from_secs(60)));
        let id = identity("key1");

        // Time is paused, so all three share one instant
        for _ in 0..3 {
            assert!(controller.admit(&id).await.is_allowed());
        }
        assert!(!controller.admit(&id).await.is_allowed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_identities_are_independent() {
        let controller = AdmissionController::new(AdmissionPolicy::new(1, Duration::from_secs(60)));

        assert!(controller.admit(&identity("key1")).await.is_allowed());
        assert!(controller.admit(&identity("key2")).await.is_allowed());
        assert!(
            controller
                .admit(&Identity::new("10.0.0.2", "key1"))
                .await
                .is_allowed()
        );
        assert!(!controller.admit(&identity("key1")).await.is_allowed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_block_log_is_bounded() {
        let controller = AdmissionController::new(AdmissionPolicy::new(0, Duration::from_secs(60)));

        for i in 0..101 {
            let id = Identity::new(format!("10.0.0.{}", i), "key");
            assert!(!controller.admit(&id).await.is_allowed());
        }

        let log = controller.block_log().await;
        assert_eq!(log.len(), 100);
        assert_eq!(log[0].ip, "10.0.0.1");
        assert_eq!(log[99].ip, "10.0.0.100");
        assert!(log.iter().all(|e| e.reason == "Rate limit exceeded"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_drops_idle_identities() {
        let controller = AdmissionController::default();

        controller.admit(&identity("key1")).await;
        controller.admit(&identity("key2")).await;
        assert_eq!(controller.tracked_identities().await, 2);

        advance(SWEEP_INTERVAL).await;
        controller.admit(&identity("key3")).await;

        assert_eq!(controller.tracked_identities().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_admissions_never_exceed_limit() {
        let controller = std::sync::Arc::new(AdmissionController::new(AdmissionPolicy::new(
            10,
            Duration::from_secs(60),
        )));

        let handles: Vec<_> = (0..25)
            .map(|_| {
                let controller = controller.clone();
                tokio::spawn(async move { controller.admit(&identity("shared")).await })
            })
            .collect();

        let mut allowed = 0;
        for handle in handles {
            if handle.await.unwrap().is_allowed() {
                allowed += 1;
            }
        }

        assert_eq!(allowed, 10);
        assert_eq!(controller.block_log().await.len(), 15);
    }
}
