//! # jobly
//!
//! Data access for a job board on PostgreSQL.
//!
//! - **Partial updates**: [`sql_for_partial_update`] turns a sparse, ordered
//!   [`UpdateRequest`] into a `SET` clause with `$n` placeholders, resolving
//!   logical field names through a [`FieldNameMap`]
//! - **Filtered queries**: [`PredicateSet`] collects AND-joined predicates for
//!   optional search criteria
//! - **Repositories**: [`JobRepository`] and [`CompanyRepository`] run one
//!   statement per operation on any [`GenericClient`] (client, transaction,
//!   pooled client or [`TracingClient`])
//!
//! ```ignore
//! use jobly::{DatabaseConfig, JobFilter, JobRepository, TracingClient};
//!
//! let config = DatabaseConfig::from_env()?;
//! let pool = jobly::create_pool_with_config(&config)?;
//! let client = TracingClient::new(pool.get().await?).with_config(&config);
//!
//! let filter = JobFilter {
//!     title: Some("engineer".into()),
//!     min_salary: Some(100_000),
//!     has_equity: Some(true),
//! };
//! let jobs = JobRepository::new(&client).find_all(&filter).await?;
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod field_map;
pub mod filter;
pub mod ident;
pub mod models;
pub mod monitor;
pub mod partial_update;
pub mod query;
pub mod row;

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "migrate")]
pub mod migrate;

#[cfg(test)]
mod testing;

pub use client::GenericClient;
pub use config::DatabaseConfig;
pub use error::{JoblyError, JoblyResult};
pub use field_map::FieldNameMap;
pub use filter::PredicateSet;
pub use ident::Ident;
pub use monitor::TracingClient;
pub use partial_update::{
    ParameterizedClause, UpdateRequest, ensure_unassigned, sql_for_partial_update,
};
pub use query::{Query, SqlParam, query};
pub use row::{FromRow, RowExt};

pub use models::company::{
    COMPANY_FIELDS, Company, CompanyFilter, CompanyPatch, CompanyRepository, NewCompany,
};
pub use models::job::{JOB_FIELDS, Job, JobFilter, JobPatch, JobRepository, NewJob};

#[cfg(feature = "pool")]
pub use pool::{create_pool, create_pool_with_config};
