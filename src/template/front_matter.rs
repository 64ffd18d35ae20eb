//! Front matter parsing for rendered issue templates
//!
//! A rendered template must start with `---`; the text up to the next `---` is
//! YAML metadata and everything after it is the issue body. Only the first two
//! delimiters split the document, so `---` inside the body is left alone.

use miette::Diagnostic;
use serde_yml::Value;
use thiserror::Error;

use crate::core::issue::Issue;
use crate::yaml::YamlSyntaxError;

const DELIMITER: &str = "---";

/// Errors that can occur while splitting or decoding front matter
#[derive(Debug, Error, Diagnostic)]
pub enum FrontMatterError {
    #[error("content does not start with front matter delimiter '---'")]
    #[diagnostic(code(issue_bulk::front_matter::missing))]
    Missing,

    #[error("front matter is not closed by a second '---'")]
    #[diagnostic(code(issue_bulk::front_matter::incomplete))]
    Incomplete,

    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] YamlSyntaxError),
}

/// Split content into raw front matter and trimmed body
pub fn split(content: &str) -> Result<(&str, &str), FrontMatterError> {
    if !content.starts_with(DELIMITER) {
        return Err(FrontMatterError::Missing);
    }

    let mut parts = content.splitn(3, DELIMITER);
    let _leading = parts.next();
    match (parts.next(), parts.next()) {
        (Some(front), Some(body)) => Ok((front, body.trim())),
        _ => Err(FrontMatterError::Incomplete),
    }
}

/// Parse a rendered template into an issue
pub fn parse_issue(content: &str) -> Result<Issue, FrontMatterError> {
    let (front, body) = split(content)?;
    let metadata = decode(front)?;

    let mut issue = Issue::new(
        metadata
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or_default(),
        body,
    )
    .with_labels(string_list(metadata.get("labels")))
    .with_assignees(string_list(metadata.get("assignees")));

    if let Some(milestone) = metadata.get("milestone").and_then(Value::as_str) {
        issue = issue.with_milestone(milestone);
    }

    Ok(issue)
}

/// Decode the metadata block; an empty block is an empty mapping
fn decode(front: &str) -> Result<Value, FrontMatterError> {
    let value: Value = serde_yml::from_str(front)
        .map_err(|e| YamlSyntaxError::from_serde_error(&e, front))?;

    match value {
        Value::Mapping(_) => Ok(value),
        Value::Null => Ok(Value::Mapping(Default::default())),
        _ => Err(YamlSyntaxError::at_offset(
            "expected key/value pairs",
            front,
            0,
            Some("Front matter must be a mapping such as `title: My issue`".to_string()),
        )
        .into()),
    }
}

/// Read `labels`/`assignees`: a comma-joined string or a list of strings
fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(joined)) => joined.split(',').map(|s| s.trim().to_string()).collect(),
        Some(Value::Sequence(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}
