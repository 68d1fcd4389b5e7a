use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Bad version: {0:?} has no '.' separator")]
    BadVersion(String),

    #[error("{}", describe_not_found(.0.as_deref()))]
    ProjectNotFound(Option<String>),

    #[error("Incompatible value: no pending updates for {0:?}")]
    IncompatibleQueueState(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database lock poisoned")]
    LockPoisoned,

    #[error("Unsupported schema version {found} (expected at most {expected})")]
    SchemaVersion { found: i32, expected: i32 },
}

impl RegistryError {
    /// True for the condition the notifier treats as "queue drained"
    pub fn is_not_found(&self) -> bool {
        matches!(self, RegistryError::ProjectNotFound(_))
    }
}

fn describe_not_found(name: Option<&str>) -> String {
    match name {
        Some(name) => format!("Project not found: {name:?}"),
        None => "Project not found".to_string(),
    }
}
