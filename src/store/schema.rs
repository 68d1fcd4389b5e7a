//! Table layout for the registry database
//!
//! ```text
//! projects              project_versions           pending_updates
//! ┌──────────┐          ┌─────────────────┐        ┌─────────────────┐
//! │ name (PK)│◄─────────│ project (FK)    │   ┌────│ project (FK)    │
//! │ url      │◄──┐      │ major           │   │    │ seq             │
//! └──────────┘   │      │ minor           │   │    │ version         │
//!                │      └─────────────────┘   │    └─────────────────┘
//!                │                            │
//!                │      queue_sequences       │
//!                │      ┌─────────────────┐   │
//!                └──────│ project (PK,FK) │◄──┘
//!                       │ last_seq        │
//!                       └─────────────────┘
//! ```
//!
//! `queue_sequences` is kept apart from `pending_updates` so that sequence
//! numbers keep increasing after a project's pending entries are cleared.

use std::time::Duration;

use rusqlite::Connection;
use tracing::debug;

use crate::store::error::RegistryError;

/// Stored in `PRAGMA user_version`
pub const SCHEMA_VERSION: i32 = 1;

const CREATE_PROJECTS: &str = r#"
    CREATE TABLE IF NOT EXISTS projects (
        name TEXT PRIMARY KEY NOT NULL,
        url TEXT NOT NULL
    )
"#;

const CREATE_PROJECT_VERSIONS: &str = r#"
    CREATE TABLE IF NOT EXISTS project_versions (
        project TEXT NOT NULL,
        major TEXT NOT NULL,
        minor TEXT NOT NULL,
        PRIMARY KEY (project, major),
        FOREIGN KEY (project) REFERENCES projects(name)
    )
"#;

const CREATE_PENDING_UPDATES: &str = r#"
    CREATE TABLE IF NOT EXISTS pending_updates (
        project TEXT NOT NULL,
        seq INTEGER NOT NULL,
        version TEXT NOT NULL,
        PRIMARY KEY (project, seq),
        FOREIGN KEY (project) REFERENCES projects(name)
    )
"#;

const CREATE_QUEUE_SEQUENCES: &str = r#"
    CREATE TABLE IF NOT EXISTS queue_sequences (
        project TEXT PRIMARY KEY NOT NULL,
        last_seq INTEGER NOT NULL,
        FOREIGN KEY (project) REFERENCES projects(name)
    )
"#;

/// Apply per-connection settings
pub fn configure(conn: &Connection, busy_timeout: Duration) -> Result<(), RegistryError> {
    // WAL lets readers run alongside the single writer
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.busy_timeout(busy_timeout)?;
    Ok(())
}

/// Create all tables, refusing databases written by a newer schema
pub fn create_schema(conn: &Connection) -> Result<(), RegistryError> {
    debug!("Creating database schema");

    let found: i32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    if found > SCHEMA_VERSION {
        return Err(RegistryError::SchemaVersion {
            found,
            expected: SCHEMA_VERSION,
        });
    }

    for ddl in [
        CREATE_PROJECTS,
        CREATE_PROJECT_VERSIONS,
        CREATE_PENDING_UPDATES,
        CREATE_QUEUE_SEQUENCES,
    ] {
        conn.execute(ddl, [])?;
    }

    if found < SCHEMA_VERSION {
        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
        debug!("Updated schema version to v{}", SCHEMA_VERSION);
    }

    debug!("Database schema created successfully");
    Ok(())
}
