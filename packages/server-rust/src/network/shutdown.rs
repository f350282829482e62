//! Drain control for table requests.
//!
//! Table handlers admit themselves with [`ShutdownController::admit`] and
//! keep the returned [`RequestGuard`] until their read-modify-draw finishes.
//! Once shutdown is triggered no new table request is admitted, and the
//! server waits a bounded time for the admitted ones before it stops.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Server health, as reported by the health endpoints.
///
/// Starting -> Ready -> Draining -> Stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    Starting,
    Ready,
    Draining,
    Stopped,
}

impl HealthState {
    /// Lowercase name used in health JSON.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Starting => "starting",
            Self::Ready => "ready",
            Self::Draining => "draining",
            Self::Stopped => "stopped",
        }
    }

    fn admits_requests(self) -> bool {
        matches!(self, Self::Starting | Self::Ready)
    }
}

#[derive(Debug)]
pub struct ShutdownController {
    triggered: watch::Sender<bool>,
    in_flight: Arc<AtomicU64>,
    state: RwLock<HealthState>,
}

impl ShutdownController {
    #[must_use]
    pub fn new() -> Self {
        let (triggered, _) = watch::channel(false);
        Self {
            triggered,
            in_flight: Arc::new(AtomicU64::new(0)),
            state: RwLock::new(HealthState::Starting),
        }
    }

    pub fn set_ready(&self) {
        *self.state.write() = HealthState::Ready;
    }

    #[must_use]
    pub fn health_state(&self) -> HealthState {
        *self.state.read()
    }

    /// Admits one table request, or returns `None` once draining has begun.
    ///
    /// The state check and the counter increment happen under the state lock,
    /// so a request admitted here is always seen by a later drain.
    #[must_use]
    pub fn admit(&self) -> Option<RequestGuard> {
        let state = self.state.read();
        if !state.admits_requests() {
            debug!(state = state.as_str(), "table request refused while shutting down");
            return None;
        }
        self.in_flight.fetch_add(1, Ordering::Relaxed);
        Some(RequestGuard {
            in_flight: Arc::clone(&self.in_flight),
        })
    }

    /// Table requests admitted and not yet finished.
    #[must_use]
    pub fn in_flight_count(&self) -> u64 {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// Stops admitting table requests and wakes everyone waiting in
    /// [`triggered`](Self::triggered). Idempotent.
    pub fn trigger_shutdown(&self) {
        {
            let mut state = self.state.write();
            if !state.admits_requests() {
                return;
            }
            *state = HealthState::Draining;
        }
        info!(in_flight = self.in_flight_count(), "draining table requests");
        self.triggered.send_replace(true);
    }

    /// Resolves once [`trigger_shutdown`](Self::trigger_shutdown) has run.
    pub async fn triggered(&self) {
        let mut rx = self.triggered.subscribe();
        // The sender lives as long as `self`, so this only ends by trigger.
        let _ = rx.wait_for(|triggered| *triggered).await;
    }

    /// Waits up to `timeout` for admitted table requests to finish.
    ///
    /// Returns `true` and moves to `Stopped` when they all finished. On
    /// timeout returns `false` and stays `Draining`.
    pub async fn wait_for_drain(&self, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            if self.in_flight_count() == 0 {
                *self.state.write() = HealthState::Stopped;
                return true;
            }
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    /// Moves to `Stopped` regardless of outstanding requests and returns how
    /// many table requests were abandoned.
    pub fn abandon(&self) -> u64 {
        *self.state.write() = HealthState::Stopped;
        let abandoned = self.in_flight_count();
        if abandoned > 0 {
            warn!(abandoned, "stopped with table requests still running");
        }
        abandoned
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

/// Counts as one in-flight table request until dropped.
#[derive(Debug)]
pub struct RequestGuard {
    in_flight: Arc<AtomicU64>,
}

impl Drop for RequestGuard {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_moves_from_starting_to_draining() {
        let controller = ShutdownController::new();
        assert_eq!(controller.health_state(), HealthState::Starting);

        controller.set_ready();
        assert_eq!(controller.health_state(), HealthState::Ready);

        controller.trigger_shutdown();
        assert_eq!(controller.health_state(), HealthState::Draining);
        assert_eq!(HealthState::Draining.as_str(), "draining");
    }

    #[test]
    fn guards_count_admitted_requests() {
        let controller = ShutdownController::new();
        let first = controller.admit().unwrap();
        let second = controller.admit().unwrap();
        assert_eq!(controller.in_flight_count(), 2);

        drop(first);
        assert_eq!(controller.in_flight_count(), 1);
        drop(second);
        assert_eq!(controller.in_flight_count(), 0);
    }

    #[test]
    fn no_request_is_admitted_after_trigger() {
        let controller = ShutdownController::new();
        controller.set_ready();
        controller.trigger_shutdown();

        assert!(controller.admit().is_none());
        assert_eq!(controller.in_flight_count(), 0);
    }

    #[test]
    fn trigger_after_stop_keeps_stopped() {
        let controller = ShutdownController::new();
        controller.trigger_shutdown();
        assert_eq!(controller.abandon(), 0);

        controller.trigger_shutdown();
        assert_eq!(controller.health_state(), HealthState::Stopped);
    }

    #[tokio::test]
    async fn triggered_resolves_after_trigger() {
        let controller = Arc::new(ShutdownController::new());
        let waiter = {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move { controller.triggered().await })
        };

        controller.trigger_shutdown();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn drain_waits_for_running_request() {
        let controller = ShutdownController::new();
        controller.set_ready();
        let guard = controller.admit().unwrap();
        controller.trigger_shutdown();

        let release = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            drop(guard);
        });

        assert!(controller.wait_for_drain(Duration::from_secs(2)).await);
        assert_eq!(controller.health_state(), HealthState::Stopped);
        release.await.unwrap();
    }

    #[tokio::test]
    async fn drain_timeout_then_abandon() {
        let controller = ShutdownController::new();
        let _guard = controller.admit().unwrap();
        controller.trigger_shutdown();

        assert!(!controller.wait_for_drain(Duration::from_millis(50)).await);
        assert_eq!(controller.health_state(), HealthState::Draining);

        assert_eq!(controller.abandon(), 1);
        assert_eq!(controller.health_state(), HealthState::Stopped);
    }
}
