//! gh-issue-bulk-create: one GitHub issue per CSV row
//!
//! A Markdown template with YAML front matter is rendered against every row
//! of a CSV file and the result is submitted through the GitHub CLI.

pub mod cli;
pub mod core;
pub mod template;
pub mod yaml;
