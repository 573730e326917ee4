use crate::sqlite_column;
use crate::sqlite_persistence::{
    open_versioned_db, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema,
    DEFAULT_TIMESTAMP,
};
use crate::user::*;
use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::{
    collections::HashSet,
    path::Path,
    str::FromStr,
    sync::{Mutex, MutexGuard},
    time::{Duration, SystemTime},
};
use tracing::{debug, info};

use super::auth::CredentialsHasher;

const USER_TABLE_V_1: Table = Table {
    name: "user",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("handle", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    unique_constraints: &[],
    indices: &[("idx_user_handle", "handle")],
};

const USER_FOREIGN_KEY: ForeignKey = ForeignKey {
    foreign_table: "user",
    foreign_column: "id",
    on_delete: ForeignKeyOnChange::Cascade,
};

const AUTH_TOKEN_TABLE_V_1: Table = Table {
    name: "auth_token",
    columns: &[
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&USER_FOREIGN_KEY)
        ),
        sqlite_column!("value", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
        sqlite_column!("last_used", &SqlType::Integer),
    ],
    unique_constraints: &[],
    indices: &[("idx_auth_token_value", "value")],
};

const USER_PASSWORD_CREDENTIALS_V_1: Table = Table {
    name: "user_password_credentials",
    columns: &[
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            is_unique = true,
            foreign_key = Some(&USER_FOREIGN_KEY)
        ),
        sqlite_column!("salt", &SqlType::Text, non_null = true),
        sqlite_column!("hash", &SqlType::Text, non_null = true),
        sqlite_column!("hasher", &SqlType::Text, non_null = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
        sqlite_column!("last_tried", &SqlType::Integer),
        sqlite_column!("last_used", &SqlType::Integer),
    ],
    unique_constraints: &[],
    indices: &[],
};

const USER_ROLE_TABLE_V_1: Table = Table {
    name: "user_role",
    columns: &[
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&USER_FOREIGN_KEY)
        ),
        sqlite_column!("role", &SqlType::Text, non_null = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    unique_constraints: &[&["user_id", "role"]],
    indices: &[("idx_user_role_user_id", "user_id")],
};

pub const USER_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 1,
    tables: &[
        USER_TABLE_V_1,
        AUTH_TOKEN_TABLE_V_1,
        USER_PASSWORD_CREDENTIALS_V_1,
        USER_ROLE_TABLE_V_1,
    ],
    migration: None,
}];

pub struct SqliteUserStore {
    conn: Mutex<Connection>,
}

impl SqliteUserStore {
    pub fn new<T: AsRef<Path>>(db_path: T) -> Result<Self> {
        let conn = open_versioned_db(db_path, USER_VERSIONED_SCHEMAS, "user")?;
        Ok(SqliteUserStore {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("User database lock poisoned"))
    }
}

fn system_time_from_column_result(value: i64) -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(value.max(0) as u64)
}

fn unix_seconds(time: SystemTime) -> i64 {
    time.duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

fn auth_token_from_row(row: &Row) -> rusqlite::Result<AuthToken> {
    Ok(AuthToken {
        user_id: row.get(0)?,
        value: AuthTokenValue(row.get(1)?),
        created: system_time_from_column_result(row.get(2)?),
        last_used: row
            .get::<usize, Option<i64>>(3)?
            .map(system_time_from_column_result),
    })
}

impl UserStore for SqliteUserStore {
    fn create_user(&self, user_handle: &str) -> Result<usize> {
        let conn = self.conn()?;
        conn.execute(
            &format!("INSERT INTO {} (handle) VALUES (?1)", USER_TABLE_V_1.name),
            params![user_handle],
        )
        .with_context(|| format!("Failed to create user {}", user_handle))?;
        let user_id = conn.last_insert_rowid() as usize;
        info!("Created user {} with id {}", user_handle, user_id);
        Ok(user_id)
    }

    fn get_user_handle(&self, user_id: usize) -> Result<Option<String>> {
        let conn = self.conn()?;
        let handle = conn
            .query_row(
                "SELECT handle FROM user WHERE id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(handle)
    }

    fn get_all_user_handles(&self) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT handle FROM user ORDER BY id")?;
        let handles = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(handles)
    }

    fn get_user_id(&self, user_handle: &str) -> Result<Option<usize>> {
        let conn = self.conn()?;
        let user_id = conn
            .query_row(
                "SELECT id FROM user WHERE handle = ?1",
                params![user_handle],
                |row| row.get(0),
            )
            .optional()?;
        Ok(user_id)
    }

    fn get_user_roles(&self, user_id: usize) -> Result<Vec<UserRole>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT role FROM {} WHERE user_id = ?1 ORDER BY created, role",
            USER_ROLE_TABLE_V_1.name
        ))?;
        let roles = stmt
            .query_map(params![user_id], |row| row.get::<_, String>(0))?
            .filter_map(|r| r.ok().and_then(|s| UserRole::from_str(&s)))
            .collect();
        Ok(roles)
    }

    fn add_user_role(&self, user_id: usize, role: UserRole) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            &format!(
                "INSERT OR IGNORE INTO {} (user_id, role) VALUES (?1, ?2)",
                USER_ROLE_TABLE_V_1.name
            ),
            params![user_id, role.as_str()],
        )
        .with_context(|| format!("Failed to add role {} to user {}", role, user_id))?;
        Ok(())
    }

    fn remove_user_role(&self, user_id: usize, role: UserRole) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            &format!(
                "DELETE FROM {} WHERE user_id = ?1 AND role = ?2",
                USER_ROLE_TABLE_V_1.name
            ),
            params![user_id, role.as_str()],
        )?;
        Ok(())
    }

    fn resolve_user_permissions(&self, user_id: usize) -> Result<Vec<Permission>> {
        let mut permissions = HashSet::new();
        for role in self.get_user_roles(user_id)? {
            permissions.extend(role.permissions().iter().copied());
        }
        let mut permissions: Vec<Permission> = permissions.into_iter().collect();
        permissions.sort_by_key(|p| p.as_int());
        Ok(permissions)
    }
}

impl UserAuthTokenStore for SqliteUserStore {
    fn get_user_auth_token(&self, value: &AuthTokenValue) -> Result<Option<AuthToken>> {
        let conn = self.conn()?;
        let token = conn
            .query_row(
                "SELECT user_id, value, created, last_used FROM auth_token WHERE value = ?1",
                params![value.0],
                auth_token_from_row,
            )
            .optional()?;
        Ok(token)
    }

    fn delete_user_auth_token(&self, token: &AuthTokenValue) -> Result<Option<AuthToken>> {
        let existing = match self.get_user_auth_token(token)? {
            Some(existing) => existing,
            None => return Ok(None),
        };
        let conn = self.conn()?;
        conn.execute(
            "DELETE FROM auth_token WHERE value = ?1",
            params![existing.value.0],
        )?;
        Ok(Some(existing))
    }

    fn update_user_auth_token_last_used_timestamp(&self, token: &AuthTokenValue) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "UPDATE auth_token SET last_used = ?1 WHERE value = ?2",
            params![unix_seconds(SystemTime::now()), token.0],
        )?;
        Ok(())
    }

    fn add_user_auth_token(&self, token: AuthToken) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO auth_token (user_id, value, created) VALUES (?1, ?2, ?3)",
            params![token.user_id, token.value.0, unix_seconds(token.created)],
        )?;
        Ok(())
    }

    fn get_all_user_auth_tokens(&self, user_handle: &str) -> Result<Vec<AuthToken>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT user_id, value, created, last_used FROM auth_token \
             WHERE user_id = (SELECT id FROM user WHERE handle = ?1)",
        )?;
        let tokens = stmt
            .query_map(params![user_handle], auth_token_from_row)?
            .collect::<rusqlite::Result<Vec<AuthToken>>>()?;
        Ok(tokens)
    }

    fn prune_unused_auth_tokens(&self, unused_for_days: u64) -> Result<usize> {
        let cutoff = unix_seconds(SystemTime::now()) - (unused_for_days as i64) * 86_400;
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM auth_token WHERE COALESCE(last_used, created) < ?1",
            params![cutoff],
        )?;
        debug!(
            "Pruned {} auth tokens unused for {} days",
            deleted, unused_for_days
        );
        Ok(deleted)
    }
}

impl UserAuthCredentialsStore for SqliteUserStore {
    fn get_user_auth_credentials(&self, user_handle: &str) -> Result<Option<UserAuthCredentials>> {
        let user_id = match self.get_user_id(user_handle)? {
            Some(user_id) => user_id,
            None => return Ok(None),
        };
        let conn = self.conn()?;
        let row = conn
            .query_row(
                "SELECT salt, hash, hasher, created, last_tried, last_used \
                 FROM user_password_credentials WHERE user_id = ?1",
                params![user_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, Option<i64>>(3)?,
                        row.get::<_, Option<i64>>(4)?,
                        row.get::<_, Option<i64>>(5)?,
                    ))
                },
            )
            .optional()?;

        let username_password = match row {
            None => None,
            Some((salt, hash, hasher, created, last_tried, last_used)) => {
                let hasher = CredentialsHasher::from_str(&hasher)
                    .with_context(|| format!("Invalid hasher for user {}", user_handle))?;
                Some(UsernamePasswordCredentials {
                    user_id,
                    salt,
                    hash,
                    hasher,
                    created: created
                        .map(system_time_from_column_result)
                        .unwrap_or(SystemTime::UNIX_EPOCH),
                    last_tried: last_tried.map(system_time_from_column_result),
                    last_used: last_used.map(system_time_from_column_result),
                })
            }
        };

        Ok(Some(UserAuthCredentials {
            user_id,
            username_password,
        }))
    }

    fn update_user_auth_credentials(&self, credentials: UserAuthCredentials) -> Result<()> {
        let conn = self.conn()?;
        let user_id = credentials.user_id;
        match credentials.username_password.as_ref() {
            Some(password_credentials) => {
                conn.execute(
                    "INSERT INTO user_password_credentials (user_id, salt, hash, hasher) \
                     VALUES (?1, ?2, ?3, ?4) \
                     ON CONFLICT(user_id) DO UPDATE SET \
                     salt = excluded.salt, hash = excluded.hash, hasher = excluded.hasher, \
                     last_tried = NULL, last_used = NULL",
                    params![
                        user_id,
                        password_credentials.salt,
                        password_credentials.hash,
                        password_credentials.hasher.to_string(),
                    ],
                )?;
            }
            None => {
                conn.execute(
                    "DELETE FROM user_password_credentials WHERE user_id = ?1",
                    params![user_id],
                )?;
            }
        };
        Ok(())
    }

    fn touch_password_credentials(&self, user_id: usize, success: bool) -> Result<()> {
        let conn = self.conn()?;
        let now = unix_seconds(SystemTime::now());
        if success {
            conn.execute(
                "UPDATE user_password_credentials SET last_tried = ?1, last_used = ?1 WHERE user_id = ?2",
                params![now, user_id],
            )?;
        } else {
            conn.execute(
                "UPDATE user_password_credentials SET last_tried = ?1 WHERE user_id = ?2",
                params![now, user_id],
            )?;
        }
        Ok(())
    }
}
