use axum::extract::FromRef;

use crate::job::JobManager;
use crate::user::UserManager;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use super::ServerConfig;

pub type GuardedJobManager = Arc<JobManager>;
pub type GuardedUserManager = Arc<Mutex<UserManager>>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub job_manager: GuardedJobManager,
    pub user_manager: GuardedUserManager,
    pub version: String,
}

impl ServerState {
    pub fn new(config: ServerConfig, job_manager: JobManager, user_manager: UserManager) -> Self {
        ServerState {
            config,
            start_time: Instant::now(),
            job_manager: Arc::new(job_manager),
            user_manager: Arc::new(Mutex::new(user_manager)),
            version: env!("CARGO_PKG_VERSION").to_owned(),
        }
    }
}

impl FromRef<ServerState> for GuardedJobManager {
    fn from_ref(input: &ServerState) -> Self {
        input.job_manager.clone()
    }
}

impl FromRef<ServerState> for GuardedUserManager {
    fn from_ref(input: &ServerState) -> Self {
        input.user_manager.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
