//! Core module - CSV loading, issue records and the hosting client

pub mod config;
pub mod git;
pub mod issue;
pub mod loader;
pub mod provider;

pub use config::Config;
pub use git::{Git, GitError};
pub use issue::{CreatedIssue, Issue, RateLimit};
pub use loader::{load_csv, map_rows, reconcile, CsvError, CsvTable, HeaderReport, Row, RowMap};
pub use provider::{GhClient, IssueClient, ProviderError};
