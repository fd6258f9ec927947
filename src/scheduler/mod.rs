//! Probe scheduling subsystem.
//!
//! # Data Flow
//! ```text
//! One loop per target, ticking on its own interval:
//!     tick
//!     → guard.rs (target already probing? drop the tick)
//!     → limiter.rs (no free slot? release guard, drop the tick)
//!     → spawn probe task: executor.run(...)
//!     → on completion: release slot, then guard
//! ```
//!
//! # Design Decisions
//! - Best effort: a dropped tick is never queued or retried early
//! - Dropped ticks record no metrics
//! - Ticks are independent per target; no global alignment
//! - A tick that loses the slot race releases the guard at once, so the next
//!   tick for that target may try again immediately
//! - Loops stop on shutdown and cancel their in-flight probe

pub mod guard;
pub mod limiter;

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::lifecycle::shutdown::{recv_shutdown, wait_for_shutdown};
use crate::lifecycle::Shutdown;
use crate::observability::MetricsSink;
use crate::probe::{ProbeExecutor, Target};

pub use guard::{GuardToken, OverlapGuard};
pub use limiter::{Slot, SlotPool};

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// A probe was spawned.
    Launched,
    /// The previous probe for this target is still running.
    SkippedBusy,
    /// Every slot in the pool is taken.
    SkippedNoSlot,
}

/// Resources held by a running probe.
///
/// Fields drop in declaration order: the slot goes back to the pool before
/// the target's guard is cleared.
#[derive(Debug)]
pub struct InFlight {
    _slot: Slot,
    _token: GuardToken,
}

/// Decide whether a tick may launch a probe.
pub fn admit(guard: &Arc<OverlapGuard>, pool: &SlotPool) -> Result<InFlight, Tick> {
    let token = guard.try_enter().ok_or(Tick::SkippedBusy)?;
    match pool.try_acquire() {
        Some(slot) => Ok(InFlight {
            _slot: slot,
            _token: token,
        }),
        None => {
            drop(token);
            Err(Tick::SkippedNoSlot)
        }
    }
}

/// Drives one probe loop per target.
pub struct Scheduler {
    targets: Vec<Target>,
    pool: SlotPool,
    executor: Arc<ProbeExecutor>,
    sink: Arc<dyn MetricsSink>,
}

impl Scheduler {
    pub fn new(
        targets: Vec<Target>,
        pool: SlotPool,
        executor: Arc<ProbeExecutor>,
        sink: Arc<dyn MetricsSink>,
    ) -> Self {
        Self {
            targets,
            pool,
            executor,
            sink,
        }
    }

    /// Spawn every target loop. Each handle completes once its loop has seen
    /// shutdown and its in-flight probe, if any, has finished.
    pub fn spawn(self, shutdown: &Shutdown) -> Vec<JoinHandle<()>> {
        tracing::info!(
            targets = self.targets.len(),
            max_concurrency = self.pool.capacity(),
            "Scheduler starting"
        );

        self.targets
            .into_iter()
            .map(|target| {
                let prober = TargetLoop {
                    target: Arc::new(target),
                    guard: Arc::new(OverlapGuard::new()),
                    pool: self.pool.clone(),
                    executor: self.executor.clone(),
                    sink: self.sink.clone(),
                };
                tokio::spawn(prober.run(shutdown.subscribe()))
            })
            .collect()
    }
}

struct TargetLoop {
    target: Arc<Target>,
    guard: Arc<OverlapGuard>,
    pool: SlotPool,
    executor: Arc<ProbeExecutor>,
    sink: Arc<dyn MetricsSink>,
}

impl TargetLoop {
    async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        let period = self.target.interval();
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::debug!(target_url = %self.target, interval = ?period, "Target loop started");

        let mut current: Option<JoinHandle<()>> = None;
        loop {
            tokio::select! {
                biased;
                _ = recv_shutdown(&mut shutdown) => break,
                _ = ticker.tick() => {
                    let tick = self.tick(&mut current, &shutdown);
                    tracing::trace!(target_url = %self.target, ?tick, "Tick");
                }
            }
        }

        if let Some(probe) = current {
            if let Err(e) = probe.await {
                tracing::error!(target_url = %self.target, error = %e, "Probe task failed");
            }
        }
        tracing::debug!(target_url = %self.target, "Target loop stopped");
    }

    fn tick(&self, current: &mut Option<JoinHandle<()>>, shutdown: &broadcast::Receiver<()>) -> Tick {
        let in_flight = match admit(&self.guard, &self.pool) {
            Ok(in_flight) => in_flight,
            Err(skipped) => return skipped,
        };

        let target = self.target.clone();
        let executor = self.executor.clone();
        let sink = self.sink.clone();
        let cancel = wait_for_shutdown(shutdown.resubscribe());

        *current = Some(tokio::spawn(async move {
            let _in_flight = in_flight;
            executor.run(&target, sink.as_ref(), cancel).await;
        }));
        Tick::Launched
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admit_launches_when_free() {
        let guard = Arc::new(OverlapGuard::new());
        let pool = SlotPool::new(1);

        let in_flight = admit(&guard, &pool).unwrap();
        assert!(guard.is_held());
        assert_eq!(pool.available(), 0);

        drop(in_flight);
        assert!(!guard.is_held());
        assert_eq!(pool.available(), 1);
    }

    #[test]
    fn test_admit_skips_busy_target() {
        let guard = Arc::new(OverlapGuard::new());
        let pool = SlotPool::new(4);

        let _running = admit(&guard, &pool).unwrap();
        assert_eq!(admit(&guard, &pool).unwrap_err(), Tick::SkippedBusy);
        assert_eq!(pool.available(), 3);
    }

    #[test]
    fn test_admit_releases_guard_when_pool_empty() {
        let pool = SlotPool::new(1);
        let other = Arc::new(OverlapGuard::new());
        let _held = admit(&other, &pool).unwrap();

        let guard = Arc::new(OverlapGuard::new());
        assert_eq!(admit(&guard, &pool).unwrap_err(), Tick::SkippedNoSlot);
        assert!(!guard.is_held());
    }
}
