//! Named-timer observability sink.
//!
//! Every executor call records one `(name, duration)` observation. The sink
//! is external to the executor: [`MetricsTimers`] forwards to the `metrics`
//! facade, backed by a Prometheus recorder from [`MetricsTimers::install`];
//! [`TimerRegistry`] keeps in-process totals.

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde::Serialize;

use crate::errors::DbError;

pub const UPDATE_TIMER: &str = "sql-update-timer";
pub const QUERY_TIMER: &str = "sql-query-timer";
pub const BATCH_TIMER: &str = "sql-batch-query-timer";

/// Accepts elapsed-time observations under a timer name.
pub trait TimerSink: Send + Sync {
    fn record(&self, name: &'static str, elapsed: Duration);
}

/// Forwards observations to the globally installed `metrics` recorder.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsTimers;

impl MetricsTimers {
    /// Installs the process-wide Prometheus recorder. The returned handle
    /// renders everything recorded so far in text exposition format.
    pub fn install() -> Result<PrometheusHandle, DbError> {
        PrometheusBuilder::new()
            .install_recorder()
            .map_err(|e| DbError::Config(format!("failed to install metrics recorder: {e}")))
    }
}

impl TimerSink for MetricsTimers {
    fn record(&self, name: &'static str, elapsed: Duration) {
        metrics::histogram!(name).record(elapsed.as_secs_f64());
    }
}

/// Aggregated observations for one timer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TimerStats {
    pub count: u64,
    pub total: Duration,
    pub max: Duration,
}

/// In-memory timer registry, shareable across executors.
#[derive(Debug, Clone, Default)]
pub struct TimerRegistry {
    timers: Arc<Mutex<BTreeMap<&'static str, TimerStats>>>,
}

impl TimerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self, name: &str) -> Option<TimerStats> {
        self.timers.lock().ok()?.get(name).copied()
    }

    pub fn count(&self, name: &str) -> u64 {
        self.stats(name).map_or(0, |s| s.count)
    }

    pub fn snapshot(&self) -> BTreeMap<&'static str, TimerStats> {
        self.timers
            .lock()
            .map(|timers| timers.clone())
            .unwrap_or_default()
    }
}

impl TimerSink for TimerRegistry {
    fn record(&self, name: &'static str, elapsed: Duration) {
        let Ok(mut timers) = self.timers.lock() else {
            return;
        };
        let stats = timers.entry(name).or_default();
        stats.count += 1;
        stats.total += elapsed;
        stats.max = stats.max.max(elapsed);
    }
}

/// Records the elapsed time when dropped, so every exit path is timed.
pub(crate) struct TimerGuard<'a> {
    sink: &'a dyn TimerSink,
    name: &'static str,
    started: Instant,
}

impl<'a> TimerGuard<'a> {
    pub(crate) fn start(sink: &'a dyn TimerSink, name: &'static str) -> Self {
        Self {
            sink,
            name,
            started: Instant::now(),
        }
    }
}

impl Drop for TimerGuard<'_> {
    fn drop(&mut self) {
        self.sink.record(self.name, self.started.elapsed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_aggregates_observations() {
        let registry = TimerRegistry::new();
        registry.record(UPDATE_TIMER, Duration::from_millis(5));
        registry.record(UPDATE_TIMER, Duration::from_millis(15));
        registry.record(QUERY_TIMER, Duration::from_millis(1));

        let update = registry.stats(UPDATE_TIMER).unwrap();
        assert_eq!(update.count, 2);
        assert_eq!(update.total, Duration::from_millis(20));
        assert_eq!(update.max, Duration::from_millis(15));
        assert_eq!(registry.count(QUERY_TIMER), 1);
        assert_eq!(registry.count(BATCH_TIMER), 0);
    }

    #[test]
    fn test_guard_records_on_early_return() {
        fn timed(registry: &TimerRegistry, fail: bool) -> Result<(), ()> {
            let _timer = TimerGuard::start(registry, BATCH_TIMER);
            if fail {
                return Err(());
            }
            Ok(())
        }

        let registry = TimerRegistry::new();
        let _ = timed(&registry, true);
        let _ = timed(&registry, false);
        assert_eq!(registry.count(BATCH_TIMER), 2);
    }

    #[test]
    fn test_metrics_timers_reach_the_recorder() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            MetricsTimers.record(UPDATE_TIMER, Duration::from_millis(3));
            MetricsTimers.record(UPDATE_TIMER, Duration::from_millis(7));
            MetricsTimers.record(BATCH_TIMER, Duration::from_millis(1));
        });

        let rendered = handle.render();
        assert!(rendered.contains("sql_update_timer_count 2"), "{rendered}");
        assert!(rendered.contains("sql_batch_query_timer_count 1"), "{rendered}");
        assert!(!rendered.contains("sql_query_timer"), "{rendered}");
    }

    #[test]
    fn test_clones_share_state() {
        let registry = TimerRegistry::new();
        let clone = registry.clone();
        clone.record(QUERY_TIMER, Duration::from_millis(2));
        assert_eq!(registry.count(QUERY_TIMER), 1);
    }
}
