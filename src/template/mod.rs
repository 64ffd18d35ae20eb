//! Issue templates: placeholder substitution and front matter parsing

pub mod front_matter;
pub mod render;

use miette::Diagnostic;
use thiserror::Error;

use crate::core::issue::Issue;
use crate::core::loader::RowMap;

pub use front_matter::{parse_issue, FrontMatterError};
pub use render::{extract_variables, render, RenderError};

/// Failure turning one row into an issue
#[derive(Debug, Error, Diagnostic)]
pub enum TemplateError {
    #[error("Failed to process template: {0}")]
    #[diagnostic(code(issue_bulk::template::syntax))]
    Render(#[from] RenderError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    FrontMatter(#[from] FrontMatterError),
}

/// Render `template` against `row` and parse the result into an issue
pub fn build_issue(template: &str, row: &RowMap) -> Result<Issue, TemplateError> {
    let rendered = render(template, row)?;
    Ok(parse_issue(&rendered)?)
}
