//! Statement logging via `tracing`.
//!
//! [`TracingClient`] wraps any [`GenericClient`] and emits one event per
//! statement on the `jobly.sql` target: the SQL (optionally truncated), the
//! tag, parameter count, affected/returned rows and elapsed time. Results and
//! errors from the inner client are returned unchanged.
//!
//! ```ignore
//! use jobly::{JobRepository, TracingClient};
//! use std::time::Duration;
//!
//! let client = TracingClient::new(pool.get().await?)
//!     .slow_query_threshold(Duration::from_millis(250));
//! let job = JobRepository::new(&client).get(1).await?;
//! ```

use crate::client::GenericClient;
use crate::config::DatabaseConfig;
use crate::error::JoblyResult;
use std::time::{Duration, Instant};
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;
use tracing::Level;

/// Dispatch a tracing event at a runtime-determined level.
macro_rules! emit_at_level {
    ($level:expr, $($field:tt)*) => {
        match $level {
            Level::ERROR => tracing::error!($($field)*),
            Level::WARN  => tracing::warn!($($field)*),
            Level::INFO  => tracing::info!($($field)*),
            Level::DEBUG => tracing::debug!($($field)*),
            Level::TRACE => tracing::trace!($($field)*),
        }
    };
}

fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

/// A `GenericClient` wrapper that logs every statement it runs.
#[derive(Debug, Clone)]
pub struct TracingClient<C> {
    client: C,
    /// Tracing event level to emit at.
    level: Level,
    /// Truncate long SQL strings (in bytes). `None` means no truncation.
    max_sql_length: Option<usize>,
    /// Statements slower than this are emitted at WARN.
    slow_query_threshold: Option<Duration>,
}

impl<C: GenericClient> TracingClient<C> {
    /// Wrap `client`, logging at DEBUG with SQL truncated to 200 bytes.
    pub fn new(client: C) -> Self {
        Self {
            client,
            level: Level::DEBUG,
            max_sql_length: Some(200),
            slow_query_threshold: None,
        }
    }

    /// Apply logging settings from a [`DatabaseConfig`].
    pub fn with_config(mut self, config: &DatabaseConfig) -> Self {
        self.slow_query_threshold = config.slow_query_threshold();
        self
    }

    /// Override the tracing event level.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set maximum SQL length to display.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    /// Emit statements slower than `threshold` at WARN.
    pub fn slow_query_threshold(mut self, threshold: Duration) -> Self {
        self.slow_query_threshold = Some(threshold);
        self
    }

    /// Get a reference to the inner client.
    pub fn inner(&self) -> &C {
        &self.client
    }

    /// Get the inner client, consuming this wrapper.
    pub fn into_inner(self) -> C {
        self.client
    }

    fn truncate_sql(&self, sql: &str) -> String {
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)),
            _ => sql.to_string(),
        }
    }

    fn is_slow(&self, elapsed: Duration) -> bool {
        self.slow_query_threshold
            .is_some_and(|threshold| elapsed > threshold)
    }

    async fn observe<T, F>(
        &self,
        tag: Option<&str>,
        sql: &str,
        param_count: usize,
        future: F,
        row_count: fn(&T) -> u64,
    ) -> JoblyResult<T>
    where
        F: std::future::Future<Output = JoblyResult<T>> + Send,
    {
        let start = Instant::now();
        let result = future.await;
        let elapsed = start.elapsed();

        let tag = tag.unwrap_or("-");
        let sql = self.truncate_sql(sql);
        let elapsed_ms = elapsed.as_secs_f64() * 1000.0;

        match &result {
            Ok(value) if self.is_slow(elapsed) => tracing::warn!(
                target: "jobly.sql",
                tag,
                param_count,
                rows = row_count(value),
                elapsed_ms,
                sql = %sql,
                "slow query"
            ),
            Ok(value) => emit_at_level!(
                self.level,
                target: "jobly.sql",
                tag,
                param_count,
                rows = row_count(value),
                elapsed_ms,
                sql = %sql,
                "query"
            ),
            Err(err) => emit_at_level!(
                self.level,
                target: "jobly.sql",
                tag,
                param_count,
                elapsed_ms,
                sql = %sql,
                error = %err,
                "query failed"
            ),
        }

        result
    }
}

impl<C: GenericClient> GenericClient for TracingClient<C> {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> JoblyResult<Vec<Row>> {
        self.observe(None, sql, params.len(), self.client.query(sql, params), |rows| {
            rows.len() as u64
        })
        .await
    }

    async fn query_tagged(
        &self,
        tag: &str,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> JoblyResult<Vec<Row>> {
        let future = self.client.query_tagged(tag, sql, params);
        self.observe(Some(tag), sql, params.len(), future, |rows| rows.len() as u64)
            .await
    }

    async fn query_opt(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> JoblyResult<Option<Row>> {
        self.observe(None, sql, params.len(), self.client.query_opt(sql, params), |row| {
            u64::from(row.is_some())
        })
        .await
    }

    async fn query_opt_tagged(
        &self,
        tag: &str,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> JoblyResult<Option<Row>> {
        let future = self.client.query_opt_tagged(tag, sql, params);
        self.observe(Some(tag), sql, params.len(), future, |row| u64::from(row.is_some()))
            .await
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> JoblyResult<u64> {
        self.observe(None, sql, params.len(), self.client.execute(sql, params), |n| *n)
            .await
    }

    async fn execute_tagged(
        &self,
        tag: &str,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> JoblyResult<u64> {
        let future = self.client.execute_tagged(tag, sql, params);
        self.observe(Some(tag), sql, params.len(), future, |n| *n)
            .await
    }
}
