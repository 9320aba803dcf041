//! Pre-numbered SQL execution.
//!
//! The clause builders render their own `$1, $2, ...` placeholders; [`Query`]
//! carries the finished SQL string together with the parameters in the same
//! order and runs it on any [`GenericClient`].
//!
//! # Example
//!
//! ```ignore
//! use jobly::query;
//!
//! let job: Option<Job> = query("SELECT id, title FROM jobs WHERE id = $1")
//!     .tag("jobs.get")
//!     .bind(1_i32)
//!     .fetch_opt_as(&client)
//!     .await?;
//! ```

use crate::client::GenericClient;
use crate::error::JoblyResult;
use crate::row::FromRow;
use std::sync::Arc;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

/// A shared, type-erased bound parameter.
pub type SqlParam = Arc<dyn ToSql + Sync + Send>;

/// Build a query from a pre-numbered SQL string (`$1, $2, ...`).
pub fn query(sql: impl Into<String>) -> Query {
    Query::new(sql)
}

/// A SQL string with pre-numbered placeholders (`$1, $2, ...`) plus bound parameters.
#[must_use]
#[derive(Debug)]
pub struct Query {
    sql: String,
    params: Vec<SqlParam>,
    tag: Option<String>,
}

impl Query {
    /// Create a new pre-numbered query.
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
            tag: None,
        }
    }

    /// Associate a tag for logging.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Bind a parameter value.
    ///
    /// This does not modify the SQL string; it only appends the value to the
    /// parameter list. The SQL string must already contain `$1, $2, ...`.
    pub fn bind<T>(mut self, value: T) -> Self
    where
        T: ToSql + Sync + Send + 'static,
    {
        self.params.push(Arc::new(value));
        self
    }

    /// Bind already type-erased values, in order.
    pub fn bind_all(mut self, values: impl IntoIterator<Item = SqlParam>) -> Self {
        self.params.extend(values);
        self
    }

    /// Access the SQL string.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Access the tag, if any.
    pub fn tag_name(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Number of bound parameters.
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// Parameter refs compatible with `tokio-postgres`.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params
            .iter()
            .map(|p| p.as_ref() as &(dyn ToSql + Sync))
            .collect()
    }

    /// Execute the query and return all rows.
    pub async fn fetch_all(&self, conn: &impl GenericClient) -> JoblyResult<Vec<Row>> {
        let params = self.params_ref();
        match self.tag.as_deref() {
            Some(tag) => conn.query_tagged(tag, &self.sql, &params).await,
            None => conn.query(&self.sql, &params).await,
        }
    }

    /// Execute the query and return all rows mapped to `T`.
    pub async fn fetch_all_as<T: FromRow>(&self, conn: &impl GenericClient) -> JoblyResult<Vec<T>> {
        let rows = self.fetch_all(conn).await?;
        rows.iter().map(T::from_row).collect()
    }

    /// Execute the query and return the first row, if any.
    pub async fn fetch_opt(&self, conn: &impl GenericClient) -> JoblyResult<Option<Row>> {
        let params = self.params_ref();
        match self.tag.as_deref() {
            Some(tag) => conn.query_opt_tagged(tag, &self.sql, &params).await,
            None => conn.query_opt(&self.sql, &params).await,
        }
    }

    /// Execute the query and return at most one row mapped to `T`.
    pub async fn fetch_opt_as<T: FromRow>(
        &self,
        conn: &impl GenericClient,
    ) -> JoblyResult<Option<T>> {
        let row = self.fetch_opt(conn).await?;
        row.as_ref().map(T::from_row).transpose()
    }

    /// Execute the statement and return the affected row count.
    pub async fn execute(&self, conn: &impl GenericClient) -> JoblyResult<u64> {
        let params = self.params_ref();
        match self.tag.as_deref() {
            Some(tag) => conn.execute_tagged(tag, &self.sql, &params).await,
            None => conn.execute(&self.sql, &params).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_keeps_sql_and_order() {
        let q = query("SELECT * FROM jobs WHERE id = $1 AND title = $2")
            .bind(1_i32)
            .bind("Job1".to_string());

        assert_eq!(q.sql(), "SELECT * FROM jobs WHERE id = $1 AND title = $2");
        assert_eq!(q.param_count(), 2);
        assert_eq!(q.params_ref().len(), 2);
        assert_eq!(q.tag_name(), None);
    }

    #[test]
    fn bind_all_appends_after_existing() {
        let shared: Vec<SqlParam> = vec![Arc::new(10_i32), Arc::new(20_i32)];
        let q = query("UPDATE t SET a=$2, b=$3 WHERE id = $1")
            .tag("t.update")
            .bind(1_i32)
            .bind_all(shared);

        assert_eq!(q.param_count(), 3);
        assert_eq!(q.tag_name(), Some("t.update"));
        let rendered = format!("{q:?}");
        assert!(rendered.contains("[1, 10, 20]"));
    }
}
