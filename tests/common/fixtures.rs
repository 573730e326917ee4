//! Test fixture creation
//!
//! Creates the throwaway user database every test server starts from.

use super::constants::*;
use anyhow::Result;
use jobs_server::user::auth::CredentialsHasher;
use jobs_server::user::{
    SqliteUserStore, UserAuthCredentials, UserAuthCredentialsStore, UserRole, UserStore,
    UsernamePasswordCredentials,
};
use std::path::PathBuf;
use std::time::SystemTime;
use tempfile::TempDir;

/// Creates a temporary directory holding a user database with the test users
///
/// Returns the directory (keep it alive for the duration of the test) and
/// the path of the user database inside it.
pub fn create_test_db_with_users() -> Result<(TempDir, PathBuf)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("user.db");

    {
        let store = SqliteUserStore::new(&db_path)?;

        let editor_id =
            create_user_with_password_and_role(&store, EDITOR_USER, EDITOR_PASS, UserRole::Editor)?;
        eprintln!("Created editor user {} with id {}", EDITOR_USER, editor_id);

        let viewer_id =
            create_user_with_password_and_role(&store, VIEWER_USER, VIEWER_PASS, UserRole::Viewer)?;
        eprintln!("Created viewer user {} with id {}", VIEWER_USER, viewer_id);

        let admin_id =
            create_user_with_password_and_role(&store, ADMIN_USER, ADMIN_PASS, UserRole::Admin)?;
        eprintln!("Created admin user {} with id {}", ADMIN_USER, admin_id);
    }

    Ok((temp_dir, db_path))
}

/// Creates a user with the given credentials and role
pub fn create_user_with_password_and_role(
    store: &SqliteUserStore,
    username: &str,
    password: &str,
    role: UserRole,
) -> Result<usize> {
    let user_id = store.create_user(username)?;
    store.add_user_role(user_id, role)?;

    let hasher = CredentialsHasher::Argon2;
    let salt = hasher.generate_b64_salt();
    let hash = hasher.hash(password.as_bytes(), &salt)?;

    let password_credentials = UsernamePasswordCredentials {
        user_id,
        salt,
        hash,
        hasher,
        created: SystemTime::now(),
        last_tried: None,
        last_used: None,
    };
    store.update_user_auth_credentials(UserAuthCredentials {
        user_id,
        username_password: Some(password_credentials),
    })?;

    Ok(user_id)
}
