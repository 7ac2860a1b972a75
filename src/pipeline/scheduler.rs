//! Fixed-interval cycle scheduling.
//!
//! Cycles run one at a time on a single task; a tick that comes due while a
//! cycle is still running is delayed rather than run concurrently.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{self, MissedTickBehavior};

use crate::models::SchedulerConfig;
use crate::pipeline::tracker::{CycleReport, Tracker};

/// Drives [`Tracker::run_cycle`] on a fixed period.
pub struct Scheduler {
    tracker: Arc<Tracker>,
    interval: Duration,
    run_on_start: bool,
}

impl Scheduler {
    pub fn new(tracker: Arc<Tracker>, config: &SchedulerConfig) -> Self {
        Self {
            tracker,
            interval: config.interval(),
            run_on_start: config.run_on_start,
        }
    }

    /// Run cycles until `shutdown` resolves.
    ///
    /// Errors are logged and never stop the loop; the next tick retries.
    pub async fn run_until<F>(self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let start = if self.run_on_start {
            time::Instant::now()
        } else {
            time::Instant::now() + self.interval
        };
        let mut ticker = time::interval_at(start, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        log::info!(
            "Scheduler started: every {}s{}",
            self.interval.as_secs(),
            if self.run_on_start { ", first run now" } else { "" }
        );

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    log::info!("Scheduler shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    // A running cycle is not cancelled by shutdown
                    self.tick().await;
                }
            }
        }
    }

    /// Run one cycle and log its outcome.
    pub async fn tick(&self) -> Option<CycleReport> {
        match self.tracker.run_cycle().await {
            Ok(report) => {
                log_report(&report);
                Some(report)
            }
            Err(e) if e.needs_attention() => {
                log::error!("Cycle aborted, listing layout changed: {e}");
                None
            }
            Err(e) => {
                log::warn!("Cycle aborted: {e}");
                None
            }
        }
    }
}

fn log_report(report: &CycleReport) {
    log::info!(
        "Cycle done in {}ms: {} publications, {} active, {} new",
        report.elapsed_ms,
        report.total,
        report.active,
        report.new_ids.len()
    );

    let failed = report.notifications.failed();
    if failed > 0 {
        log::warn!(
            "{} of {} notifications failed",
            failed,
            report.notifications.deliveries.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::tracker::tests::{Step, page, tracker};

    fn config(run_on_start: bool) -> SchedulerConfig {
        SchedulerConfig {
            interval_secs: 3600,
            run_on_start,
            ..SchedulerConfig::default()
        }
    }

    #[tokio::test]
    async fn test_tick_swallows_errors() {
        let (tracker, _) = tracker(vec![Step::Unreachable]);
        let scheduler = Scheduler::new(Arc::new(tracker), &config(true));
        assert!(scheduler.tick().await.is_none());
    }

    #[tokio::test]
    async fn test_run_on_start_runs_first_cycle_immediately() {
        let (tracker, sink) = tracker(vec![Step::Page(page(&[("101", "", "Vigente")]))]);
        let tracker = Arc::new(tracker);
        tracker.subscribe("42".into());

        Scheduler::new(Arc::clone(&tracker), &config(true))
            .run_until(tokio::time::sleep(Duration::from_millis(200)))
            .await;

        assert_eq!(tracker.index().len(), 1);
        assert_eq!(sink.sent.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_delayed_start_waits_for_interval() {
        let (tracker, sink) = tracker(vec![Step::Page(page(&[("101", "", "Vigente")]))]);
        let tracker = Arc::new(tracker);
        tracker.subscribe("42".into());

        Scheduler::new(Arc::clone(&tracker), &config(false))
            .run_until(tokio::time::sleep(Duration::from_millis(50)))
            .await;

        assert!(tracker.index().is_empty());
        assert!(sink.sent.lock().is_empty());
    }
}
