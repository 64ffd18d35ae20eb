//! CLI argument definitions using clap derive

use clap::Parser;
use std::path::PathBuf;

use crate::core::provider::validate_repo;

#[derive(Parser, Debug)]
#[command(name = "gh-issue-bulk-create")]
#[command(author, version, about = "Bulk-create GitHub issues from a Markdown template and a CSV file")]
#[command(long_about = "Bulk-create GitHub issues from a Markdown template and a CSV file.\n\n\
The template starts with YAML front matter (title, labels, assignees, milestone) \
and may use {{column}} placeholders anywhere. Every CSV row becomes one issue.")]
pub struct Cli {
    /// Path to the template markdown file
    #[arg(long, value_name = "PATH")]
    pub template: PathBuf,

    /// Path to the CSV file containing data
    #[arg(long, value_name = "PATH")]
    pub csv: PathBuf,

    /// Target repository as owner/repo (default: current repository)
    #[arg(long, value_name = "OWNER/REPO", value_parser = parse_repo)]
    pub repo: Option<String>,

    /// Only show the content of issues without creating them
    #[arg(long)]
    pub dry_run: bool,

    /// Continue without asking when template variables are missing from the CSV
    #[arg(long, short = 'y')]
    pub yes: bool,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug, Default)]
pub struct GlobalOpts {
    /// Only print previews, warnings and errors (no progress lines or summary)
    #[arg(long, short = 'q', conflicts_with = "verbose")]
    pub quiet: bool,

    /// Enable verbose (debug) logging
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

fn parse_repo(s: &str) -> Result<String, String> {
    validate_repo(s)
        .map(|_| s.to_string())
        .map_err(|e| e.to_string())
}
