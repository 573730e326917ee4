//! Jobs Server Library
//!
//! This library exposes the internal modules for testing and for the binaries.

pub mod config;
pub mod job;
pub mod server;
pub mod sqlite_persistence;
pub mod user;

// Re-export commonly used types for convenience
pub use job::{JobManager, SqliteJobStore};
pub use server::{run_server, RequestsLoggingLevel, ServerConfig};
pub use user::{SqliteUserStore, UserManager, UserRole};
