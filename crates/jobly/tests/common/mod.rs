//! Shared setup for the database-backed tests.
//!
//! Tests skip (return early) when `DATABASE_URL` is unset. Each test runs
//! against its own connection inside a transaction that is never committed.

#![allow(dead_code)]

use jobly::{
    CompanyRepository, JobRepository, JoblyResult, NewCompany, NewJob, migrate,
};
use rust_decimal::Decimal;
use tokio::sync::{Mutex, MutexGuard, OnceCell};
use tokio_postgres::{Client, NoTls, Transaction};

static MIGRATED: OnceCell<()> = OnceCell::const_new();
static SERIAL: Mutex<()> = Mutex::const_new(());

/// A migrated connection plus a guard that keeps database tests from overlapping.
pub struct TestDb {
    pub client: Client,
    _serial: MutexGuard<'static, ()>,
}

pub async fn connect(test_name: &str) -> JoblyResult<Option<TestDb>> {
    let _ = dotenvy::dotenv();
    let database_url = match std::env::var("DATABASE_URL") {
        Ok(v) => v,
        Err(_) => {
            eprintln!("DATABASE_URL is not set; skipping {test_name}");
            return Ok(None);
        }
    };

    let serial = SERIAL.lock().await;
    let (mut client, connection) = tokio_postgres::connect(&database_url, NoTls).await?;
    tokio::spawn(async move {
        let _ = connection.await;
    });

    MIGRATED
        .get_or_try_init(|| async {
            migrate::run(&mut client).await?;
            Ok::<(), jobly::JoblyError>(())
        })
        .await?;

    Ok(Some(TestDb {
        client,
        _serial: serial,
    }))
}

pub fn dec(s: &str) -> Decimal {
    s.parse().expect("valid decimal literal")
}

/// Replace all rows with companies c1..c3 and jobs Job1..Job3 (all at c1).
///
/// Returns the ids of Job1, Job2 and Job3.
pub async fn seed(tx: &Transaction<'_>) -> JoblyResult<Vec<i32>> {
    tx.execute("DELETE FROM jobs", &[]).await?;
    tx.execute("DELETE FROM companies", &[]).await?;

    let companies = CompanyRepository::new(tx);
    for n in 1..=3 {
        companies
            .create(&NewCompany {
                handle: format!("c{n}"),
                name: format!("C{n}"),
                description: format!("Desc{n}"),
                num_employees: Some(n),
                logo_url: Some(format!("http://c{n}.img")),
            })
            .await?;
    }

    let jobs = JobRepository::new(tx);
    let mut ids = Vec::new();
    for (n, equity) in [(1, "0.01"), (2, "0.02"), (3, "0.03")] {
        let job = jobs
            .create(&NewJob {
                title: format!("Job{n}"),
                salary: Some(n * 100_000),
                equity: Some(dec(equity)),
                company_handle: "c1".to_string(),
            })
            .await?;
        ids.push(job.id);
    }
    Ok(ids)
}
