mod error;
mod job_manager;
pub mod models;
mod schema;
mod sqlite_job_store;
mod store;

pub use error::JobError;
pub use job_manager::JobManager;
pub use models::{FieldError, Job, JobFields, JobId, JobInput, ValidationErrors};
pub use sqlite_job_store::SqliteJobStore;
pub use store::{JobFilter, JobSession, JobStore, WriteOutcome};
