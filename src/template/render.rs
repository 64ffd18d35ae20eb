//! Flat `{{ name }}` substitution
//!
//! Only plain variable interpolation is supported: no sections, loops or
//! filters. A placeholder runs from `{{` to the first following `}}`; its name
//! is the trimmed text in between. Names containing braces are not given any
//! special meaning.

use thiserror::Error;

use crate::core::loader::RowMap;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Template syntax errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("template syntax error at byte {offset}: unclosed placeholder")]
    Unclosed { offset: usize },

    #[error("template syntax error at byte {offset}: empty placeholder")]
    EmptyName { offset: usize },
}

/// One lexical piece of a template
#[derive(Debug, PartialEq, Eq)]
enum Token<'a> {
    Text(&'a str),
    Placeholder { name: &'a str, offset: usize },
    Unclosed { offset: usize },
}

/// Iterator over text runs and placeholders
struct Tokens<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Tokens<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        let rest = &self.src[self.pos..];
        if rest.is_empty() {
            return None;
        }

        match rest.find(OPEN) {
            Some(0) => {
                let offset = self.pos;
                let inner = &rest[OPEN.len()..];
                match inner.find(CLOSE) {
                    Some(end) => {
                        self.pos += OPEN.len() + end + CLOSE.len();
                        Some(Token::Placeholder {
                            name: inner[..end].trim(),
                            offset,
                        })
                    }
                    None => {
                        self.pos = self.src.len();
                        Some(Token::Unclosed { offset })
                    }
                }
            }
            Some(start) => {
                self.pos += start;
                Some(Token::Text(&rest[..start]))
            }
            None => {
                self.pos = self.src.len();
                Some(Token::Text(rest))
            }
        }
    }
}

/// Distinct variable names a template refers to, in order of first use
///
/// Unclosed and empty placeholders are skipped rather than reported.
pub fn extract_variables(template: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for token in Tokens::new(template) {
        if let Token::Placeholder { name, .. } = token {
            if !name.is_empty() && !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
    }
    names
}

/// Substitute every placeholder with its value from `row`
///
/// Names missing from the row render as the empty string. Substituted values
/// are copied verbatim, so braces inside CSV data are never expanded.
pub fn render(template: &str, row: &RowMap) -> Result<String, RenderError> {
    let mut out = String::with_capacity(template.len());

    for token in Tokens::new(template) {
        match token {
            Token::Text(text) => out.push_str(text),
            Token::Placeholder { name, offset } => {
                if name.is_empty() {
                    return Err(RenderError::EmptyName { offset });
                }
                if let Some(value) = row.get(name) {
                    out.push_str(value);
                }
            }
            Token::Unclosed { offset } => return Err(RenderError::Unclosed { offset }),
        }
    }

    Ok(out)
}
