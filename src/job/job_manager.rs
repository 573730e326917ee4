use super::error::JobError;
use super::models::{Job, JobId, JobInput};
use super::store::{JobFilter, JobStore, WriteOutcome};
use crate::server::metrics;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct JobManager {
    store: Arc<dyn JobStore>,
}

impl JobManager {
    pub fn new(store: Arc<dyn JobStore>) -> Self {
        JobManager { store }
    }

    pub fn list(&self) -> Result<Vec<Job>, JobError> {
        let session = self.store.begin_read()?;
        Ok(session.list_all()?)
    }

    /// Jobs whose question contains `phrase`, case-sensitive.
    /// An empty phrase returns every job.
    pub fn search(&self, phrase: &str) -> Result<Vec<Job>, JobError> {
        if phrase.is_empty() {
            return self.list();
        }
        let session = self.store.begin_read()?;
        let jobs = session.find_where(&JobFilter::QuestionContains(phrase.to_string()))?;
        debug!("Search for {:?} matched {} jobs", phrase, jobs.len());
        Ok(jobs)
    }

    pub fn get_by_id(&self, id: Option<JobId>) -> Result<Job, JobError> {
        let id = id.ok_or(JobError::NotFound)?;
        let session = self.store.begin_read()?;
        session.find_by_id(id)?.ok_or(JobError::NotFound)
    }

    pub fn create(&self, input: &JobInput) -> Result<Job, JobError> {
        let result = self.do_create(input);
        record_outcome("create", &result);
        result
    }

    fn do_create(&self, input: &JobInput) -> Result<Job, JobError> {
        let fields = input.validate().map_err(JobError::ValidationFailed)?;
        let mut session = self.store.begin()?;
        let job = session.insert(&fields)?;
        session.commit()?;
        info!("Created job {}", job.id);
        Ok(job)
    }

    /// Replaces question and answer of job `id`.
    ///
    /// `input.id` must match `id`. If `input.version` is set the job must not
    /// have been updated since that version was read.
    pub fn update(&self, id: Option<JobId>, input: &JobInput) -> Result<Job, JobError> {
        let result = self.do_update(id, input);
        record_outcome("update", &result);
        result
    }

    fn do_update(&self, id: Option<JobId>, input: &JobInput) -> Result<Job, JobError> {
        let id = id.ok_or(JobError::NotFound)?;
        if input.id != Some(id) {
            debug!("Rejecting update of job {}, body id is {:?}", id, input.id);
            return Err(JobError::NotFound);
        }
        let fields = input.validate().map_err(JobError::ValidationFailed)?;

        let mut session = self.store.begin()?;
        match session.update(id, &fields, input.version)? {
            WriteOutcome::Written(job) => {
                session.commit()?;
                info!("Updated job {} to version {}", job.id, job.version);
                Ok(job)
            }
            WriteOutcome::Conflict => {
                if session.find_by_id(id)?.is_none() {
                    return Err(JobError::NotFound);
                }
                warn!(
                    "Concurrent modification of job {}, expected version {:?}",
                    id, input.version
                );
                Err(JobError::ConcurrencyConflict { id })
            }
        }
    }

    /// Removes job `id` if present. Deleting a missing job is not an error.
    pub fn delete(&self, id: Option<JobId>) -> Result<bool, JobError> {
        let result = self.do_delete(id);
        record_outcome("delete", &result);
        result
    }

    fn do_delete(&self, id: Option<JobId>) -> Result<bool, JobError> {
        let mut session = self.store.begin()?;
        let removed = match id {
            Some(id) => session.remove(id)?,
            None => false,
        };
        session.commit()?;
        if removed {
            info!("Deleted job {:?}", id);
        }
        Ok(removed)
    }
}

fn record_outcome<T>(operation: &str, result: &Result<T, JobError>) {
    let outcome = match result {
        Ok(_) => "ok",
        Err(e) => e.kind(),
    };
    metrics::record_job_operation(operation, outcome);
}
