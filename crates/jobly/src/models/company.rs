//! Companies: records, inputs, filters and the repository.

use crate::client::GenericClient;
use crate::error::{JoblyError, JoblyResult};
use crate::field_map::FieldNameMap;
use crate::filter::PredicateSet;
use crate::partial_update::{UpdateRequest, ensure_unassigned, sql_for_partial_update};
use crate::query::query;
use crate::row::{FromRow, RowExt};
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

/// Logical field names of a company that differ from their column names.
pub static COMPANY_FIELDS: FieldNameMap = FieldNameMap::new(&[
    ("numEmployees", "num_employees"),
    ("logoUrl", "logo_url"),
]);

const COMPANY_COLUMNS: &str = "handle, name, description, num_employees, logo_url";

/// A stored company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

impl FromRow for Company {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            handle: row.try_get_column("handle")?,
            name: row.try_get_column("name")?,
            description: row.try_get_column("description")?,
            num_employees: row.try_get_column("num_employees")?,
            logo_url: row.try_get_column("logo_url")?,
        })
    }
}

/// Payload for [`CompanyRepository::create`]. The handle is chosen by the caller.
pub type NewCompany = Company;

/// Partial update of a company. The handle cannot be changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanyPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

impl CompanyPatch {
    /// Present fields in declaration order, keyed by logical name.
    pub fn to_update_request(&self) -> UpdateRequest {
        let mut update = UpdateRequest::new();
        update
            .set_opt("name", self.name.clone())
            .set_opt("description", self.description.clone())
            .set_opt("numEmployees", self.num_employees)
            .set_opt("logoUrl", self.logo_url.clone());
        update
    }
}

/// Optional search criteria for [`CompanyRepository::find_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyFilter {
    /// Case-insensitive substring of the name.
    pub name: Option<String>,
    pub min_employees: Option<i32>,
    pub max_employees: Option<i32>,
}

impl CompanyFilter {
    /// Predicates in name, min, max order.
    ///
    /// Fails with [`JoblyError::Validation`] when the employee bounds are inverted.
    pub fn predicates(&self) -> JoblyResult<PredicateSet> {
        if let (Some(min), Some(max)) = (self.min_employees, self.max_employees) {
            if min > max {
                return Err(JoblyError::validation(
                    "minEmployees cannot be greater than maxEmployees",
                ));
            }
        }

        let mut set = PredicateSet::new();
        set.and_contains_opt("name", self.name.as_deref())
            .and_gte_opt("num_employees", self.min_employees)
            .and_lte_opt("num_employees", self.max_employees);
        Ok(set)
    }
}

/// Company data access over an injected client or transaction.
pub struct CompanyRepository<'c, C> {
    conn: &'c C,
}

impl<'c, C: GenericClient> CompanyRepository<'c, C> {
    pub fn new(conn: &'c C) -> Self {
        Self { conn }
    }

    /// Insert a company. A duplicate handle or name surfaces as
    /// [`JoblyError::Storage`]; see [`JoblyError::is_unique_violation`].
    pub async fn create(&self, company: &NewCompany) -> JoblyResult<Company> {
        query(format!(
            "INSERT INTO companies (handle, name, description, num_employees, logo_url) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {COMPANY_COLUMNS}"
        ))
        .tag("companies.create")
        .bind(company.handle.clone())
        .bind(company.name.clone())
        .bind(company.description.clone())
        .bind(company.num_employees)
        .bind(company.logo_url.clone())
        .fetch_opt_as(self.conn)
        .await?
        .ok_or_else(|| JoblyError::decode("handle", "INSERT ... RETURNING produced no row"))
    }

    /// All companies matching `filter`, ordered by name then handle.
    pub async fn find_all(&self, filter: &CompanyFilter) -> JoblyResult<Vec<Company>> {
        let predicates = filter.predicates()?;
        let sql = format!(
            "SELECT {COMPANY_COLUMNS} FROM companies{} ORDER BY name, handle",
            predicates.where_clause()
        );

        query(sql)
            .tag("companies.find_all")
            .bind_all(predicates.into_params())
            .fetch_all_as(self.conn)
            .await
    }

    pub async fn get(&self, handle: &str) -> JoblyResult<Company> {
        query(format!("SELECT {COMPANY_COLUMNS} FROM companies WHERE handle = $1"))
            .tag("companies.get")
            .bind(handle.to_string())
            .fetch_opt_as(self.conn)
            .await?
            .ok_or_else(|| not_found(handle))
    }

    pub async fn update(&self, handle: &str, patch: &CompanyPatch) -> JoblyResult<Company> {
        self.update_fields(handle, &patch.to_update_request()).await
    }

    /// Apply an arbitrary ordered set of field assignments.
    ///
    /// The handle cannot be assigned.
    pub async fn update_fields(
        &self,
        handle: &str,
        update: &UpdateRequest,
    ) -> JoblyResult<Company> {
        ensure_unassigned(update, &COMPANY_FIELDS, "handle")?;
        let clause = sql_for_partial_update(update, &COMPANY_FIELDS)?;
        let sql = format!(
            "UPDATE companies SET {} WHERE handle = ${} RETURNING {COMPANY_COLUMNS}",
            clause.set_cols(),
            clause.next_placeholder()
        );
        let (_, values) = clause.into_parts();

        query(sql)
            .tag("companies.update")
            .bind_all(values)
            .bind(handle.to_string())
            .fetch_opt_as(self.conn)
            .await?
            .ok_or_else(|| not_found(handle))
    }

    /// Delete a company. Its jobs go with it (`ON DELETE CASCADE`).
    pub async fn remove(&self, handle: &str) -> JoblyResult<()> {
        let deleted = query("DELETE FROM companies WHERE handle = $1")
            .tag("companies.remove")
            .bind(handle.to_string())
            .execute(self.conn)
            .await?;
        if deleted == 0 {
            return Err(not_found(handle));
        }
        Ok(())
    }
}

fn not_found(handle: &str) -> JoblyError {
    tracing::debug!(target: "jobly.repo", entity = "company", handle, "not found");
    JoblyError::not_found("company", handle)
}
