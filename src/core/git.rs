//! Git remote lookup
//!
//! Used as a fallback for finding the target repository when `gh` cannot
//! report it. Arguments go through std::process::Command, never a shell.

use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

/// Git operations abstraction
pub struct Git {
    repo_root: PathBuf,
}

/// Result of a git command execution
#[derive(Debug)]
struct GitOutput {
    success: bool,
    stdout: String,
    stderr: String,
}

/// Errors that can occur during git operations
#[derive(Debug, Error)]
pub enum GitError {
    #[error("Not a git repository")]
    NotARepo,

    #[error("Git command failed: {message}")]
    CommandFailed { message: String },

    #[error("Remote '{remote}' does not point at GitHub: {url}")]
    NotGitHub { remote: String, url: String },

    #[error("Git not installed or not in PATH")]
    GitNotFound,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl Git {
    /// Create a new Git instance for the repository at the given path
    pub fn new(repo_root: &Path) -> Self {
        Self {
            repo_root: repo_root.to_path_buf(),
        }
    }

    /// Execute a git command and return the output
    fn run(&self, args: &[&str]) -> Result<GitOutput, GitError> {
        tracing::debug!(command = %Self::format_command(args), "running git");

        let output = Command::new("git")
            .args(args)
            .current_dir(&self.repo_root)
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    GitError::GitNotFound
                } else {
                    GitError::IoError(e)
                }
            })?;

        Ok(GitOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }

    /// Check if we're in a git repository
    pub fn is_repo(&self) -> bool {
        self.run(&["rev-parse", "--git-dir"])
            .map(|o| o.success)
            .unwrap_or(false)
    }

    /// Get the remote URL
    pub fn remote_url(&self, remote: &str) -> Result<String, GitError> {
        let output = self.run(&["remote", "get-url", remote])?;
        if output.success {
            Ok(output.stdout)
        } else {
            Err(GitError::CommandFailed {
                message: output.stderr,
            })
        }
    }

    /// `owner/name` of a GitHub-hosted remote
    pub fn github_repository(&self, remote: &str) -> Result<String, GitError> {
        if !self.is_repo() {
            return Err(GitError::NotARepo);
        }

        let url = self.remote_url(remote)?;
        github_slug(&url).ok_or_else(|| GitError::NotGitHub {
            remote: remote.to_string(),
            url,
        })
    }

    /// Format a command for display
    pub fn format_command(args: &[&str]) -> String {
        format!("git {}", args.join(" "))
    }
}

/// Extract `owner/name` from a GitHub remote URL
///
/// Accepts `https://github.com/owner/name(.git)`, `git@github.com:owner/name(.git)`
/// and `ssh://git@github.com/owner/name(.git)`.
pub fn github_slug(url: &str) -> Option<String> {
    let url = url.trim();
    let path = url
        .strip_prefix("git@github.com:")
        .or_else(|| url.strip_prefix("ssh://git@github.com/"))
        .or_else(|| url.strip_prefix("https://github.com/"))
        .or_else(|| url.strip_prefix("http://github.com/"))?;

    let path = path.trim_end_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);

    match path.split_once('/') {
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
            Some(format!("{}/{}", owner, name))
        }
        _ => None,
    }
}
