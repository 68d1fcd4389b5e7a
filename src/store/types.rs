//! Value objects returned by the store

use serde::Serialize;

/// A tracked project as seen by callers and message renderers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Project {
    pub name: String,
    pub url: String,
    /// Rendered version strings. Sorted by major prefix when listed, in
    /// arrival order when taken from the pending queue.
    pub versions: Vec<String>,
}

impl Project {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            versions: Vec::new(),
        }
    }

    pub fn with_versions<I, S>(mut self, versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.versions = versions.into_iter().map(Into::into).collect();
        self
    }
}

/// All undelivered versions of one project, in the order they were recorded
pub type PendingBundle = Project;
