//! Database metrics: query latency histograms and pool gauges.

use metrics::{gauge, histogram};
use sqlx::PgPool;
use std::future::Future;
use std::time::Instant;

/// Records one query's latency under `database_query_duration_seconds`.
pub fn record_query_duration(query_name: &str, duration_secs: f64) {
    histogram!(
        "database_query_duration_seconds",
        "query" => query_name.to_string()
    )
    .record(duration_secs);
}

/// Publishes pool occupancy gauges. Called on each readiness probe.
pub fn record_pool_metrics(pool: &PgPool) {
    let size = pool.size() as usize;
    let idle = pool.num_idle();
    let active = size.saturating_sub(idle);

    gauge!("database_connections_active").set(active as f64);
    gauge!("database_connections_idle").set(idle as f64);
    gauge!("database_connections_total").set(size as f64);
}

/// Times one repository call.
///
/// ```ignore
/// let timer = QueryTimer::new("find_event");
/// let result = sqlx::query_as::<_, EventEntity>(...).fetch_optional(&pool).await;
/// timer.record();
/// ```
///
/// Multi-step transactions that bail out with `?` go through [`QueryTimer::time`]
/// so the failure path is measured too.
pub struct QueryTimer {
    query_name: String,
    start: Instant,
}

impl QueryTimer {
    pub fn new(query_name: impl Into<String>) -> Self {
        Self {
            query_name: query_name.into(),
            start: Instant::now(),
        }
    }

    pub fn record(self) {
        self.finish(record_query_duration);
    }

    /// Awaits `work` and records its latency whether it succeeded or not.
    pub async fn time<F, T>(self, work: F) -> T
    where
        F: Future<Output = T>,
    {
        self.time_with(work, record_query_duration).await
    }

    async fn time_with<F, T>(self, work: F, sink: impl FnOnce(&str, f64)) -> T
    where
        F: Future<Output = T>,
    {
        let output = work.await;
        self.finish(sink);
        output
    }

    fn finish(self, sink: impl FnOnce(&str, f64)) {
        sink(&self.query_name, self.start.elapsed().as_secs_f64());
    }
}
