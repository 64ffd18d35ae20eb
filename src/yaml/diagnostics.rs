//! Front matter YAML errors rendered as miette diagnostics

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

const SOURCE_NAME: &str = "front matter";

/// Front matter YAML error pointing into the rendered metadata block
#[derive(Debug, Error, Diagnostic)]
#[error("front matter YAML error: {message}")]
#[diagnostic(code(issue_bulk::yaml::syntax))]
pub struct YamlSyntaxError {
    #[source_code]
    src: NamedSource<String>,

    #[label("here")]
    span: SourceSpan,

    #[help]
    help: Option<String>,

    message: String,
}

impl YamlSyntaxError {
    /// Wrap a serde_yml decode failure of `source`
    pub fn from_serde_error(err: &serde_yml::Error, source: &str) -> Self {
        let offset = err
            .location()
            .map(|loc| offset_of(source, loc.line(), loc.column()))
            .unwrap_or(0);
        let message = err.to_string();
        let help = hint_for(&message).map(str::to_string);
        Self::at_offset(message, source, offset, help)
    }

    /// Error at a byte offset of `source`
    pub fn at_offset(
        message: impl Into<String>,
        source: &str,
        offset: usize,
        help: Option<String>,
    ) -> Self {
        let mut offset = offset.min(source.len());
        while !source.is_char_boundary(offset) {
            offset -= 1;
        }
        let len = usize::from(offset < source.len());

        Self {
            src: NamedSource::new(SOURCE_NAME, source.to_string()),
            span: (offset, len).into(),
            help,
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn offset(&self) -> usize {
        self.span.offset()
    }
}

/// Byte offset of a 1-based line and column
fn offset_of(source: &str, line: usize, column: usize) -> usize {
    let line_start: usize = source
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();
    line_start + column.saturating_sub(1)
}

/// Hints for the mistakes a substituted CSV value usually causes
fn hint_for(message: &str) -> Option<&'static str> {
    const HINTS: &[(&str, &str)] = &[
        (
            "mapping values are not allowed",
            "A substituted value contains ': '. Quote the placeholder: title: \"{{title}}\"",
        ),
        (
            "did not find expected",
            "A substituted value may contain a quote or bracket. Check the CSV cell for this row",
        ),
        (
            "cannot start any token",
            "Values starting with @ or ` must be quoted: assignees: \"{{owner}}\"",
        ),
        ("duplicate", "Each front matter key can only appear once"),
        ("tab", "Indent front matter with spaces, not tabs"),
    ];

    let lower = message.to_lowercase();
    HINTS
        .iter()
        .find(|(needle, _)| lower.contains(needle))
        .map(|(_, hint)| *hint)
}
