use crate::sqlite_column;
use crate::sqlite_persistence::{SqlType, Table, VersionedSchema, DEFAULT_TIMESTAMP};
use anyhow::Result;
use rusqlite::Connection;

const JOBS_TABLE_V1: Table = Table {
    name: "jobs",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("question", &SqlType::Text, non_null = true),
        sqlite_column!("answer", &SqlType::Text, non_null = true),
        sqlite_column!(
            "created_at",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
        sqlite_column!("updated_at", &SqlType::Integer),
        sqlite_column!(
            "version",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("1")
        ),
    ],
    indices: &[],
    unique_constraints: &[],
};

/// Ids are never reused, so a stale edit of a deleted job cannot land on a newer one.
const JOBS_TABLE_V2: Table = Table {
    name: "jobs",
    columns: &[
        sqlite_column!(
            "id",
            &SqlType::Integer,
            is_primary_key = true,
            is_autoincrement = true
        ),
        sqlite_column!("question", &SqlType::Text, non_null = true),
        sqlite_column!("answer", &SqlType::Text, non_null = true),
        sqlite_column!(
            "created_at",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
        sqlite_column!("updated_at", &SqlType::Integer),
        sqlite_column!(
            "version",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("1")
        ),
    ],
    indices: &[],
    unique_constraints: &[],
};

/// SQLite cannot add AUTOINCREMENT to an existing table, so it is rebuilt.
fn migrate_jobs_v1_to_v2(conn: &Connection) -> Result<()> {
    conn.execute("ALTER TABLE jobs RENAME TO jobs_v1", [])?;
    JOBS_TABLE_V2.create(conn)?;
    conn.execute(
        "INSERT INTO jobs (id, question, answer, created_at, updated_at, version) \
         SELECT id, question, answer, created_at, updated_at, version FROM jobs_v1",
        [],
    )?;
    conn.execute("DROP TABLE jobs_v1", [])?;
    Ok(())
}

pub const JOB_VERSIONED_SCHEMAS: &[VersionedSchema] = &[
    VersionedSchema {
        version: 1,
        tables: &[JOBS_TABLE_V1],
        migration: None,
    },
    VersionedSchema {
        version: 2,
        tables: &[JOBS_TABLE_V2],
        migration: Some(migrate_jobs_v1_to_v2),
    },
];
