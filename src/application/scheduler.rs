//! Periodic and on-demand pass driver.
//!
//! At most one pass runs at a time. The gate is claimed with a single
//! compare-and-swap; a trigger that loses the race is rejected
//! immediately (`AlreadyRunning`) and a timer tick that loses it is
//! dropped, never queued.

use crate::application::orchestrator::AnalysisOrchestrator;
use crate::domain::analysis::{PassReport, PassTrigger};
use crate::domain::errors::SchedulerError;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::{Notify, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
}

/// Single-slot mutual exclusion for analysis passes
#[derive(Debug, Default)]
pub struct PassGate {
    running: AtomicBool,
    released: Notify,
}

impl PassGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_acquire(self: &Arc<Self>) -> Result<PassPermit, SchedulerError> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| SchedulerError::AlreadyRunning)?;
        Ok(PassPermit { gate: self.clone() })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Resolves once no permit is held.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.released.notified();
            tokio::pin!(notified);
            // Register before checking so a release in between is not missed
            notified.as_mut().enable();
            if !self.is_running() {
                return;
            }
            notified.await;
        }
    }
}

/// Releases the gate on drop, including when the pass panics
#[derive(Debug)]
pub struct PassPermit {
    gate: Arc<PassGate>,
}

impl Drop for PassPermit {
    fn drop(&mut self) {
        self.gate.running.store(false, Ordering::Release);
        self.gate.released.notify_waiters();
    }
}

pub struct AnalysisScheduler {
    orchestrator: Arc<AnalysisOrchestrator>,
    gate: Arc<PassGate>,
    period: Duration,
}

impl AnalysisScheduler {
    pub fn new(orchestrator: Arc<AnalysisOrchestrator>, period: Duration) -> Self {
        Self {
            orchestrator,
            gate: Arc::new(PassGate::new()),
            period,
        }
    }

    pub fn orchestrator(&self) -> &Arc<AnalysisOrchestrator> {
        &self.orchestrator
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn state(&self) -> SchedulerState {
        if self.gate.is_running() {
            SchedulerState::Running
        } else {
            SchedulerState::Idle
        }
    }

    /// Waits for an in-flight pass, scheduled or on-demand, to finish.
    pub async fn wait_idle(&self) {
        self.gate.wait_idle().await;
    }

    /// On-demand pass, awaited by the caller. Ignores the active flag.
    pub async fn run_now(&self) -> Result<PassReport, SchedulerError> {
        let permit = self.gate.try_acquire()?;
        Ok(self.execute(permit, PassTrigger::OnDemand).await)
    }

    /// Claims the gate synchronously, then runs the pass in the background.
    /// The caller learns about `AlreadyRunning` before anything is spawned.
    pub fn trigger_now(self: &Arc<Self>) -> Result<JoinHandle<PassReport>, SchedulerError> {
        let permit = self.gate.try_acquire()?;
        let scheduler = self.clone();
        Ok(tokio::spawn(async move {
            scheduler.execute(permit, PassTrigger::OnDemand).await
        }))
    }

    /// Timer path. Returns `None` when paused or when a pass is still running.
    pub async fn on_tick(&self) -> Option<PassReport> {
        if !self.orchestrator.watchlist().is_active() {
            debug!("Scheduler: Paused, tick ignored");
            return None;
        }
        match self.gate.try_acquire() {
            Ok(permit) => Some(self.execute(permit, PassTrigger::Scheduled).await),
            Err(_) => {
                warn!("Scheduler: Previous pass still running, tick dropped");
                None
            }
        }
    }

    async fn execute(&self, permit: PassPermit, trigger: PassTrigger) -> PassReport {
        // Snapshot first; the lock is not held while the pass runs
        let snapshot = self.orchestrator.watchlist().snapshot();
        let report = self.orchestrator.run_once(&snapshot, trigger).await;
        drop(permit);

        let elapsed = report.finished_at - report.started_at;
        info!(
            "Scheduler: {:?} pass finished in {}ms ({} delivered, {} notices, interval {})",
            report.trigger,
            elapsed.num_milliseconds(),
            report.delivered_count(),
            report.notice_count(),
            report.interval
        );
        report
    }

    /// Timer loop. The first tick fires one full period after start.
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        info!(
            "Scheduler: Started with a period of {}s",
            self.period.as_secs()
        );
        let start = tokio::time::Instant::now() + self.period;
        let mut ticker = tokio::time::interval_at(start, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.on_tick().await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Scheduler: Shutdown signal received, stopping");
                        break;
                    }
                }
            }
        }
    }
}
