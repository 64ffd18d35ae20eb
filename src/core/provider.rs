//! GitHub CLI wrapper for issue operations
//!
//! Shells out to `gh` (GitHub CLI), which owns authentication and host
//! configuration. All user input is passed via std::process::Command args or
//! stdin, never through a shell.

use serde::Deserialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use thiserror::Error;

use crate::core::issue::{CreatedIssue, Issue, RateLimit, RateLimitResponse};

const INSTALL_URL: &str = "https://cli.github.com";
const AUTH_CMD: &str = "gh auth login";

/// Errors that can occur during provider operations
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{cli} CLI not found. Install it from {install_url}")]
    CliNotFound { cli: String, install_url: String },

    #[error("{cli} CLI not authenticated. Run '{auth_cmd}' first")]
    NotAuthenticated { cli: String, auth_cmd: String },

    #[error("Failed to create issue in {repo}: {message}")]
    IssueCreationFailed { repo: String, message: String },

    #[error("Invalid repository '{repo}', expected owner/name")]
    InvalidRepo { repo: String },

    #[error("Command failed: {message}")]
    CommandFailed { message: String },

    #[error("Failed to parse CLI output: {message}")]
    ParseError { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Operations the bulk-create pipeline needs from the hosting platform
pub trait IssueClient {
    /// Create an issue in `repo` (`owner/name`)
    fn create_issue(&self, issue: &Issue, repo: &str) -> Result<CreatedIssue, ProviderError>;

    /// The `owner/name` of the repository in the working directory
    fn current_repository(&self) -> Result<String, ProviderError>;

    /// Current core API rate limit
    fn rate_limit(&self) -> Result<RateLimit, ProviderError>;
}

/// `gh`-backed client
pub struct GhClient {
    cli: String,
    work_dir: PathBuf,
}

impl GhClient {
    /// Create a client using `gh` from PATH
    pub fn new(work_dir: &Path) -> Self {
        Self {
            cli: "gh".to_string(),
            work_dir: work_dir.to_path_buf(),
        }
    }

    /// Use a specific `gh` binary
    pub fn with_cli(mut self, cli: impl Into<String>) -> Self {
        self.cli = cli.into();
        self
    }

    /// Check if the CLI is available
    pub fn is_available(&self) -> bool {
        Command::new(&self.cli)
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    /// Check if the CLI is authenticated
    pub fn is_authenticated(&self) -> bool {
        Command::new(&self.cli)
            .args(["auth", "status"])
            .current_dir(&self.work_dir)
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    /// Validate that the CLI is installed and logged in
    pub fn validate(&self) -> Result<(), ProviderError> {
        if !self.is_available() {
            return Err(ProviderError::CliNotFound {
                cli: self.cli.clone(),
                install_url: INSTALL_URL.to_string(),
            });
        }

        if !self.is_authenticated() {
            return Err(ProviderError::NotAuthenticated {
                cli: self.cli.clone(),
                auth_cmd: AUTH_CMD.to_string(),
            });
        }

        Ok(())
    }

    /// Format a command for display
    pub fn format_command(&self, args: &[&str]) -> String {
        format!("{} {}", self.cli, args.join(" "))
    }

    /// Execute a CLI command, optionally feeding `input` on stdin
    fn run(&self, args: &[&str], input: Option<&[u8]>) -> Result<String, ProviderError> {
        tracing::debug!(command = %self.format_command(args), "running gh");

        let mut child = Command::new(&self.cli)
            .args(args)
            .current_dir(&self.work_dir)
            .stdin(if input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ProviderError::CliNotFound {
                        cli: self.cli.clone(),
                        install_url: INSTALL_URL.to_string(),
                    }
                } else {
                    ProviderError::IoError(e)
                }
            })?;

        if let (Some(bytes), Some(mut stdin)) = (input, child.stdin.take()) {
            stdin.write_all(bytes)?;
        }

        let output = child.wait_with_output()?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            tracing::debug!(status = ?output.status.code(), %stderr, "gh failed");
            Err(ProviderError::CommandFailed { message: stderr })
        }
    }
}

impl IssueClient for GhClient {
    fn create_issue(&self, issue: &Issue, repo: &str) -> Result<CreatedIssue, ProviderError> {
        validate_repo(repo)?;

        let payload = serde_json::to_vec(issue).map_err(|e| ProviderError::ParseError {
            message: e.to_string(),
        })?;
        let endpoint = format!("repos/{}/issues", repo);
        let args = [
            "api",
            "--method",
            "POST",
            "-H",
            "Accept: application/vnd.github+json",
            endpoint.as_str(),
            "--input",
            "-",
        ];

        let output = self.run(&args, Some(payload.as_slice())).map_err(|e| match e {
            ProviderError::CommandFailed { message } => ProviderError::IssueCreationFailed {
                repo: repo.to_string(),
                message,
            },
            other => other,
        })?;

        parse_created_issue(&output)
    }

    fn current_repository(&self) -> Result<String, ProviderError> {
        let output = self.run(&["repo", "view", "--json", "owner,name"], None)?;
        parse_repo_view(&output)
    }

    fn rate_limit(&self) -> Result<RateLimit, ProviderError> {
        let output = self.run(&["api", "rate_limit"], None)?;
        parse_rate_limit(&output)
    }
}

/// Check that a repository is written as `owner/name`
pub fn validate_repo(repo: &str) -> Result<(), ProviderError> {
    match repo.split_once('/') {
        Some((owner, name))
            if !owner.trim().is_empty() && !name.trim().is_empty() && !name.contains('/') =>
        {
            Ok(())
        }
        _ => Err(ProviderError::InvalidRepo {
            repo: repo.to_string(),
        }),
    }
}

fn parse_error(e: serde_json::Error) -> ProviderError {
    ProviderError::ParseError {
        message: e.to_string(),
    }
}

/// Parse the API response of an issue creation
fn parse_created_issue(json: &str) -> Result<CreatedIssue, ProviderError> {
    serde_json::from_str(json).map_err(parse_error)
}

/// Parse `gh repo view --json owner,name` output into `owner/name`
fn parse_repo_view(json: &str) -> Result<String, ProviderError> {
    #[derive(Deserialize)]
    struct GhRepo {
        owner: GhOwner,
        name: String,
    }

    #[derive(Deserialize)]
    struct GhOwner {
        login: String,
    }

    let repo: GhRepo = serde_json::from_str(json).map_err(parse_error)?;
    Ok(format!("{}/{}", repo.owner.login, repo.name))
}

/// Parse the `rate_limit` endpoint response
fn parse_rate_limit(json: &str) -> Result<RateLimit, ProviderError> {
    let response: RateLimitResponse = serde_json::from_str(json).map_err(parse_error)?;
    Ok(response.rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_command() {
        let client = GhClient::new(Path::new("."));
        assert_eq!(
            client.format_command(&["api", "rate_limit"]),
            "gh api rate_limit"
        );

        let client = GhClient::new(Path::new(".")).with_cli("/opt/gh/bin/gh");
        assert_eq!(client.format_command(&["repo", "view"]), "/opt/gh/bin/gh repo view");
    }

    #[test]
    fn test_parse_created_issue() {
        let json = r#"{
            "id": 1,
            "number": 42,
            "html_url": "https://github.com/owner/repo/issues/42",
            "title": "Test"
        }"#;

        let created = parse_created_issue(json).unwrap();
        assert_eq!(created.number, 42);
        assert_eq!(created.html_url, "https://github.com/owner/repo/issues/42");
    }

    #[test]
    fn test_parse_created_issue_rejects_garbage() {
        let err = parse_created_issue("not json").unwrap_err();
        assert!(matches!(err, ProviderError::ParseError { .. }));
    }

    #[test]
    fn test_parse_repo_view() {
        let json = r#"{"name": "repo", "owner": {"id": "X", "login": "octocat"}}"#;
        assert_eq!(parse_repo_view(json).unwrap(), "octocat/repo");
    }

    #[test]
    fn test_parse_rate_limit() {
        let json = r#"{"resources": {"core": {}}, "rate": {"limit": 5000, "used": 1, "remaining": 4999, "reset": 1700000000}}"#;
        let rate = parse_rate_limit(json).unwrap();
        assert_eq!(rate.limit, 5000);
        assert_eq!(rate.remaining, 4999);
        assert_eq!(rate.reset, 1700000000);
    }

    #[test]
    fn test_validate_repo() {
        assert!(validate_repo("owner/repo").is_ok());
        assert!(validate_repo("owner").is_err());
        assert!(validate_repo("/repo").is_err());
        assert!(validate_repo("owner/").is_err());
        assert!(validate_repo("a/b/c").is_err());
    }

    #[test]
    fn test_missing_cli_is_reported() {
        let client = GhClient::new(Path::new(".")).with_cli("definitely-not-a-real-gh-binary");
        assert!(!client.is_available());
        let err = client.rate_limit().unwrap_err();
        assert!(matches!(err, ProviderError::CliNotFound { .. }));
    }
}
