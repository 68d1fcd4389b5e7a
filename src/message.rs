//! Notification text for projects
//!
//! Templates are compiled once by [`MessageRenderer::new`]; the renderer is
//! then shared by reference with whoever needs to format a project.

use handlebars::{Handlebars, RenderError, TemplateError};
use serde::Serialize;
use thiserror::Error;

use crate::store::types::Project;

const UPDATE_TEMPLATE: &str = "update";
const LIST_TEMPLATE: &str = "list";

// Block tags never sit alone on a line, so no standalone-line trimming applies.
const UPDATE_MESSAGE: &str = concat!(
    "{{#if plural}}Updates for {{name}} are available:\n",
    "{{else}}An update for {{name}} is available:\n",
    "{{/if}}{{#each versions}}\n  - {{this}}{{/each}}\n",
    "\n",
    " {{url}}\n",
);

const LIST_MESSAGE: &str = concat!(
    "{{#each projects}}{{name}}:\n",
    "{{#each versions}} {{this}}\n",
    "{{/each}} {{url}}\n",
    "\n",
    "{{/each}}",
);

#[derive(Debug, Error)]
pub enum MessageError {
    #[error("Template error: {0}")]
    Template(#[from] Box<TemplateError>),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),
}

#[derive(Serialize)]
struct UpdateView<'a> {
    #[serde(flatten)]
    project: &'a Project,
    plural: bool,
}

#[derive(Serialize)]
struct ListView<'a> {
    projects: &'a [Project],
}

/// Compiled update and listing templates
pub struct MessageRenderer {
    handlebars: Handlebars<'static>,
}

impl MessageRenderer {
    pub fn new() -> Result<Self, MessageError> {
        let mut handlebars = Handlebars::new();

        // Plain text output, URLs must come through untouched
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars.set_strict_mode(true);

        handlebars
            .register_template_string(UPDATE_TEMPLATE, UPDATE_MESSAGE)
            .map_err(Box::new)?;
        handlebars
            .register_template_string(LIST_TEMPLATE, LIST_MESSAGE)
            .map_err(Box::new)?;

        Ok(Self { handlebars })
    }

    /// "An update for X is available" notice listing the project's versions
    pub fn for_update(&self, project: &Project) -> Result<String, MessageError> {
        let view = UpdateView {
            project,
            plural: project.versions.len() > 1,
        };

        Ok(self.handlebars.render(UPDATE_TEMPLATE, &view)?)
    }

    /// One block per project: name, its versions, then its URL
    pub fn for_list(&self, projects: &[Project]) -> Result<String, MessageError> {
        Ok(self
            .handlebars
            .render(LIST_TEMPLATE, &ListView { projects })?)
    }
}
