use super::models::{Job, JobFields, JobId};
use anyhow::Result;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JobFilter {
    /// Case-sensitive substring match on the question.
    QuestionContains(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WriteOutcome {
    Written(Job),
    /// The row was removed or its version changed since it was read.
    Conflict,
}

pub trait JobStore: Send + Sync {
    /// Opens a new session. Only one session can be open at a time, a second
    /// call blocks until the first one is committed or dropped.
    fn begin(&self) -> Result<Box<dyn JobSession + '_>>;

    /// Opens a session meant for reads only. It takes no write lock on the
    /// database until something is written through it.
    fn begin_read(&self) -> Result<Box<dyn JobSession + '_>>;
}

/// A unit of work over the jobs table.
/// Changes become visible to other sessions only after `commit`; dropping a
/// session without committing discards them.
pub trait JobSession {
    /// Returns all jobs ordered by id.
    fn list_all(&self) -> Result<Vec<Job>>;

    /// Returns Ok(None) if no job has the given id.
    fn find_by_id(&self, id: JobId) -> Result<Option<Job>>;

    /// Returns the jobs matching the filter, ordered by id.
    fn find_where(&self, filter: &JobFilter) -> Result<Vec<Job>>;

    /// Inserts a new job, the id is assigned by the store.
    fn insert(&mut self, fields: &JobFields) -> Result<Job>;

    /// Replaces question and answer of an existing job.
    /// When `expected_version` is given the row must still carry it,
    /// otherwise only its existence is required.
    fn update(
        &mut self,
        id: JobId,
        fields: &JobFields,
        expected_version: Option<i64>,
    ) -> Result<WriteOutcome>;

    /// Returns true if a row was removed.
    fn remove(&mut self, id: JobId) -> Result<bool>;

    fn commit(self: Box<Self>) -> Result<()>;
}
