//! Jobs: records, inputs, filters and the repository.

use crate::client::GenericClient;
use crate::error::{JoblyError, JoblyResult};
use crate::field_map::FieldNameMap;
use crate::filter::PredicateSet;
use crate::partial_update::{UpdateRequest, ensure_unassigned, sql_for_partial_update};
use crate::query::query;
use crate::row::{FromRow, RowExt};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

/// Logical field names of a job that differ from their column names.
pub static JOB_FIELDS: FieldNameMap = FieldNameMap::new(&[("companyHandle", "company_handle")]);

const JOB_COLUMNS: &str = "id, title, salary, equity, company_handle";

/// A stored job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

impl FromRow for Job {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            title: row.try_get_column("title")?,
            salary: row.try_get_column("salary")?,
            equity: row.try_get_column("equity")?,
            company_handle: row.try_get_column("company_handle")?,
        })
    }
}

/// Payload for [`JobRepository::create`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJob {
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

/// Partial update of a job. `None` fields are left untouched.
///
/// The id and owning company cannot be changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobPatch {
    pub title: Option<String>,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
}

impl JobPatch {
    /// Present fields in declaration order, keyed by logical name.
    pub fn to_update_request(&self) -> UpdateRequest {
        let mut update = UpdateRequest::new();
        update
            .set_opt("title", self.title.clone())
            .set_opt("salary", self.salary)
            .set_opt("equity", self.equity);
        update
    }
}

/// Optional search criteria for [`JobRepository::find_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobFilter {
    /// Case-insensitive substring of the title.
    pub title: Option<String>,
    /// Inclusive lower bound on salary.
    pub min_salary: Option<i32>,
    /// `Some(true)` keeps only jobs with non-zero equity.
    pub has_equity: Option<bool>,
}

impl JobFilter {
    /// Predicates for the present criteria, in title, salary, equity order.
    pub fn predicates(&self) -> PredicateSet {
        let mut set = PredicateSet::new();
        set.and_contains_opt("title", self.title.as_deref())
            .and_gte_opt("salary", self.min_salary)
            .and_positive_if("equity", self.has_equity);
        set
    }
}

/// Job data access over an injected client or transaction.
pub struct JobRepository<'c, C> {
    conn: &'c C,
}

impl<'c, C: GenericClient> JobRepository<'c, C> {
    pub fn new(conn: &'c C) -> Self {
        Self { conn }
    }

    /// Insert a job and return it with its assigned id.
    ///
    /// Constraint violations (e.g. an unknown company) surface as
    /// [`JoblyError::Storage`].
    pub async fn create(&self, job: &NewJob) -> JoblyResult<Job> {
        query(format!(
            "INSERT INTO jobs (title, salary, equity, company_handle) \
             VALUES ($1, $2, $3, $4) RETURNING {JOB_COLUMNS}"
        ))
        .tag("jobs.create")
        .bind(job.title.clone())
        .bind(job.salary)
        .bind(job.equity)
        .bind(job.company_handle.clone())
        .fetch_opt_as(self.conn)
        .await?
        .ok_or_else(|| JoblyError::decode("id", "INSERT ... RETURNING produced no row"))
    }

    /// All jobs matching `filter`, ordered by title then id.
    pub async fn find_all(&self, filter: &JobFilter) -> JoblyResult<Vec<Job>> {
        let predicates = filter.predicates();
        let sql = format!(
            "SELECT {JOB_COLUMNS} FROM jobs{} ORDER BY title, id",
            predicates.where_clause()
        );

        query(sql)
            .tag("jobs.find_all")
            .bind_all(predicates.into_params())
            .fetch_all_as(self.conn)
            .await
    }

    /// Jobs posted by one company, ordered by id.
    pub async fn find_by_company(&self, company_handle: &str) -> JoblyResult<Vec<Job>> {
        query(format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE company_handle = $1 ORDER BY id"
        ))
        .tag("jobs.find_by_company")
        .bind(company_handle.to_string())
        .fetch_all_as(self.conn)
        .await
    }

    pub async fn get(&self, id: i32) -> JoblyResult<Job> {
        query(format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1"))
            .tag("jobs.get")
            .bind(id)
            .fetch_opt_as(self.conn)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Apply a partial update and return the updated job.
    pub async fn update(&self, id: i32, patch: &JobPatch) -> JoblyResult<Job> {
        self.update_fields(id, &patch.to_update_request()).await
    }

    /// Apply an arbitrary ordered set of field assignments.
    ///
    /// Fails with [`JoblyError::Validation`] before issuing any statement when
    /// `update` is empty or assigns `id`.
    pub async fn update_fields(&self, id: i32, update: &UpdateRequest) -> JoblyResult<Job> {
        ensure_unassigned(update, &JOB_FIELDS, "id")?;
        let clause = sql_for_partial_update(update, &JOB_FIELDS)?;
        let sql = format!(
            "UPDATE jobs SET {} WHERE id = ${} RETURNING {JOB_COLUMNS}",
            clause.set_cols(),
            clause.next_placeholder()
        );
        let (_, values) = clause.into_parts();

        query(sql)
            .tag("jobs.update")
            .bind_all(values)
            .bind(id)
            .fetch_opt_as(self.conn)
            .await?
            .ok_or_else(|| not_found(id))
    }

    pub async fn remove(&self, id: i32) -> JoblyResult<()> {
        let deleted = query("DELETE FROM jobs WHERE id = $1")
            .tag("jobs.remove")
            .bind(id)
            .execute(self.conn)
            .await?;
        if deleted == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }
}

fn not_found(id: i32) -> JoblyError {
    tracing::debug!(target: "jobly.repo", entity = "job", id, "not found");
    JoblyError::not_found("job", id)
}
