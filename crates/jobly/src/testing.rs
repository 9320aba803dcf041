//! In-memory `GenericClient` that records statements instead of running them.
//!
//! It never returns rows (a `tokio_postgres::Row` cannot be built by hand), so
//! it covers statement shape, parameter order and the zero-row paths.

use crate::client::GenericClient;
use crate::error::{JoblyError, JoblyResult};
use std::sync::Mutex;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RecordedCall {
    pub tag: Option<String>,
    pub sql: String,
    /// `Debug` rendering of each bound parameter, in order.
    pub params: Vec<String>,
}

#[derive(Debug, Default)]
pub(crate) struct RecordingClient {
    calls: Mutex<Vec<RecordedCall>>,
    affected: u64,
    failure: Option<String>,
}

impl RecordingClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Row count reported by `execute`.
    pub fn with_affected(mut self, affected: u64) -> Self {
        self.affected = affected;
        self
    }

    /// Fail every statement with a validation error carrying `message`.
    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(
        &self,
        tag: Option<&str>,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> JoblyResult<()> {
        let call = RecordedCall {
            tag: tag.map(str::to_string),
            sql: sql.to_string(),
            params: params.iter().map(|p| format!("{p:?}")).collect(),
        };
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
        match &self.failure {
            Some(message) => Err(JoblyError::validation(message.clone())),
            None => Ok(()),
        }
    }
}

impl GenericClient for RecordingClient {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> JoblyResult<Vec<Row>> {
        self.record(None, sql, params)?;
        Ok(Vec::new())
    }

    async fn query_tagged(
        &self,
        tag: &str,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> JoblyResult<Vec<Row>> {
        self.record(Some(tag), sql, params)?;
        Ok(Vec::new())
    }

    async fn query_opt(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> JoblyResult<Option<Row>> {
        self.record(None, sql, params)?;
        Ok(None)
    }

    async fn query_opt_tagged(
        &self,
        tag: &str,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> JoblyResult<Option<Row>> {
        self.record(Some(tag), sql, params)?;
        Ok(None)
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> JoblyResult<u64> {
        self.record(None, sql, params)?;
        Ok(self.affected)
    }

    async fn execute_tagged(
        &self,
        tag: &str,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> JoblyResult<u64> {
        self.record(Some(tag), sql, params)?;
        Ok(self.affected)
    }
}
