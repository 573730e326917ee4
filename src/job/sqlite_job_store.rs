use super::models::{Job, JobFields, JobId};
use super::schema::JOB_VERSIONED_SCHEMAS;
use super::store::{JobFilter, JobSession, JobStore, WriteOutcome};
use crate::server::metrics;
use crate::sqlite_persistence::open_versioned_db;
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;
use tracing::{debug, warn};

const JOB_COLUMNS: &str = "id, question, answer, created_at, updated_at, version";

pub struct SqliteJobStore {
    conn: Mutex<Connection>,
}

impl SqliteJobStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = open_versioned_db(db_path, JOB_VERSIONED_SCHEMAS, "jobs")?;
        Ok(SqliteJobStore {
            conn: Mutex::new(conn),
        })
    }

    fn open_session(&self, begin_sql: &str) -> Result<Box<dyn JobSession + '_>> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| anyhow!("Jobs database lock poisoned"))?;
        conn.execute_batch(begin_sql)
            .context("Failed to begin jobs transaction")?;
        Ok(Box::new(SqliteJobSession { conn, open: true }))
    }
}

impl JobStore for SqliteJobStore {
    fn begin(&self) -> Result<Box<dyn JobSession + '_>> {
        self.open_session("BEGIN IMMEDIATE")
    }

    fn begin_read(&self) -> Result<Box<dyn JobSession + '_>> {
        self.open_session("BEGIN DEFERRED")
    }
}

fn to_datetime(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

fn row_to_job(row: &Row) -> rusqlite::Result<Job> {
    Ok(Job {
        id: row.get(0)?,
        question: row.get(1)?,
        answer: row.get(2)?,
        created_at: to_datetime(row.get(3)?),
        updated_at: row.get::<_, Option<i64>>(4)?.map(to_datetime),
        version: row.get(5)?,
    })
}

struct SqliteJobSession<'a> {
    conn: MutexGuard<'a, Connection>,
    open: bool,
}

impl SqliteJobSession<'_> {
    fn query_jobs<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Vec<Job>> {
        let mut stmt = self.conn.prepare_cached(sql)?;
        let jobs = stmt
            .query_map(params, row_to_job)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(jobs)
    }
}

impl JobSession for SqliteJobSession<'_> {
    fn list_all(&self) -> Result<Vec<Job>> {
        let start = Instant::now();
        let jobs = self.query_jobs(
            &format!("SELECT {} FROM jobs ORDER BY id", JOB_COLUMNS),
            [],
        )?;
        metrics::record_db_query("list_jobs", start.elapsed());
        Ok(jobs)
    }

    fn find_by_id(&self, id: JobId) -> Result<Option<Job>> {
        let start = Instant::now();
        let job = self
            .conn
            .query_row(
                &format!("SELECT {} FROM jobs WHERE id = ?1", JOB_COLUMNS),
                params![id],
                row_to_job,
            )
            .optional()?;
        metrics::record_db_query("find_job", start.elapsed());
        Ok(job)
    }

    fn find_where(&self, filter: &JobFilter) -> Result<Vec<Job>> {
        let start = Instant::now();
        let jobs = match filter {
            JobFilter::QuestionContains(phrase) => self.query_jobs(
                &format!(
                    "SELECT {} FROM jobs WHERE instr(question, ?1) > 0 ORDER BY id",
                    JOB_COLUMNS
                ),
                params![phrase],
            )?,
        };
        metrics::record_db_query("search_jobs", start.elapsed());
        Ok(jobs)
    }

    fn insert(&mut self, fields: &JobFields) -> Result<Job> {
        let start = Instant::now();
        self.conn.execute(
            "INSERT INTO jobs (question, answer) VALUES (?1, ?2)",
            params![fields.question, fields.answer],
        )?;
        let id = self.conn.last_insert_rowid();
        metrics::record_db_query("insert_job", start.elapsed());
        debug!("Inserted job {}", id);
        self.find_by_id(id)?
            .with_context(|| format!("Inserted job {} cannot be read back", id))
    }

    fn update(
        &mut self,
        id: JobId,
        fields: &JobFields,
        expected_version: Option<i64>,
    ) -> Result<WriteOutcome> {
        let start = Instant::now();
        let changed = self.conn.execute(
            "UPDATE jobs SET question = ?1, answer = ?2, \
             updated_at = cast(strftime('%s','now') as int), version = version + 1 \
             WHERE id = ?3 AND (?4 IS NULL OR version = ?4)",
            params![fields.question, fields.answer, id, expected_version],
        )?;
        metrics::record_db_query("update_job", start.elapsed());
        if changed == 0 {
            return Ok(WriteOutcome::Conflict);
        }
        let job = self
            .find_by_id(id)?
            .with_context(|| format!("Updated job {} cannot be read back", id))?;
        Ok(WriteOutcome::Written(job))
    }

    fn remove(&mut self, id: JobId) -> Result<bool> {
        let start = Instant::now();
        let removed = self
            .conn
            .execute("DELETE FROM jobs WHERE id = ?1", params![id])?;
        metrics::record_db_query("remove_job", start.elapsed());
        Ok(removed > 0)
    }

    fn commit(mut self: Box<Self>) -> Result<()> {
        self.conn
            .execute_batch("COMMIT")
            .context("Failed to commit jobs transaction")?;
        self.open = false;
        Ok(())
    }
}

impl Drop for SqliteJobSession<'_> {
    fn drop(&mut self) {
        if self.open {
            if let Err(e) = self.conn.execute_batch("ROLLBACK") {
                warn!("Failed to roll back jobs transaction: {}", e);
            }
        }
    }
}
