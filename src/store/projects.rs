//! Project records and their version history
//!
//! Each project keeps at most one version per major prefix. Recording a new
//! minor for a known major replaces the previous one.

use indexmap::IndexMap;
use rusqlite::{Connection, OptionalExtension};
use tracing::debug;

use crate::store::codec::{self, VersionKey};
use crate::store::error::RegistryError;
use crate::store::types::Project;

/// Project operations over a borrowed connection.
///
/// Pass a `Transaction` when several calls have to commit together.
pub struct ProjectStore<'c> {
    conn: &'c Connection,
}

impl<'c> ProjectStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// Create the project, or replace its URL if it already exists.
    /// Recorded versions are left untouched.
    pub fn add_project(&self, name: &str, url: &str) -> Result<(), RegistryError> {
        self.conn.execute(
            r#"
            INSERT INTO projects (name, url)
            VALUES (?1, ?2)
            ON CONFLICT(name) DO UPDATE SET url = excluded.url
            "#,
            (name, url),
        )?;

        debug!("Saved project {} ({})", name, url);
        Ok(())
    }

    pub fn has_project(&self, name: &str) -> Result<bool, RegistryError> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM projects WHERE name = ?1)",
            [name],
            |row| row.get(0),
        )?;

        Ok(exists)
    }

    pub fn url(&self, name: &str) -> Result<Option<String>, RegistryError> {
        let url = self
            .conn
            .query_row("SELECT url FROM projects WHERE name = ?1", [name], |row| {
                row.get(0)
            })
            .optional()?;

        Ok(url)
    }

    /// Record `key` for the project, replacing any minor stored under the same
    /// major prefix.
    pub fn set_version(&self, name: &str, key: &VersionKey) -> Result<(), RegistryError> {
        if !self.has_project(name)? {
            return Err(RegistryError::ProjectNotFound(Some(name.to_string())));
        }

        self.conn.execute(
            r#"
            INSERT INTO project_versions (project, major, minor)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(project, major) DO UPDATE SET minor = excluded.minor
            "#,
            (name, key.major(), key.minor()),
        )?;

        debug!("Set version {} for {}", key, name);
        Ok(())
    }

    /// All projects ordered by name, each with its versions ordered by major
    /// prefix.
    pub fn list_projects(&self) -> Result<Vec<Project>, RegistryError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT p.name, p.url, v.major, v.minor
            FROM projects p
            LEFT JOIN project_versions v ON v.project = p.name
            ORDER BY p.name, v.major
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, Option<String>>(3)?,
            ))
        })?;

        let mut projects: IndexMap<String, Project> = IndexMap::new();
        for row in rows {
            let (name, url, major, minor) = row?;
            let project = projects
                .entry(name)
                .or_insert_with_key(|name| Project::new(name.clone(), url));

            if let (Some(major), Some(minor)) = (major, minor) {
                project.versions.push(codec::render(&major, &minor));
            }
        }

        Ok(projects.into_values().collect())
    }
}
