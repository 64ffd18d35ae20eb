//! Integration tests for the gh-issue-bulk-create CLI
//!
//! These tests exercise the binary end-to-end using assert_cmd. Only dry runs
//! and failure paths are covered since nothing here may reach GitHub.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const TEMPLATE: &str = r#"---
title: "[{{component}}] {{title}}"
labels: {{labels}}
assignees: [{{owner}}]
milestone: "{{milestone}}"
---

## Description

{{description}}
"#;

const CSV: &str = "title,component,labels,owner,milestone,description\n\
Fix login timeout,auth,\"bug, urgent\",alice,v1.2,Sessions expire after 5 minutes\n\
Update README,docs,documentation,bob,,Installation section is outdated\n";

/// Helper to get a command isolated from the user's config and environment
fn bulk(tmp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("gh-issue-bulk-create").unwrap();
    cmd.current_dir(tmp.path())
        .env("XDG_CONFIG_HOME", tmp.path().join("config"))
        .env("HOME", tmp.path())
        .env_remove("GH_ISSUE_BULK_REPO")
        .env_remove("GH_ISSUE_BULK_GH")
        .env_remove("RUST_LOG");
    cmd
}

/// Helper to write the template and CSV into a temp directory
fn setup(template: &str, csv: &str) -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("template.md"), template).unwrap();
    fs::write(tmp.path().join("data.csv"), csv).unwrap();
    tmp
}

fn dry_run(tmp: &TempDir) -> assert_cmd::assert::Assert {
    bulk(tmp)
        .args([
            "--template",
            "template.md",
            "--csv",
            "data.csv",
            "--repo",
            "octocat/hello-world",
            "--dry-run",
        ])
        .assert()
}

// ============================================================================
// Argument Handling
// ============================================================================

#[test]
fn test_help() {
    let tmp = TempDir::new().unwrap();
    bulk(&tmp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--template"))
        .stdout(predicate::str::contains("--csv"))
        .stdout(predicate::str::contains("--dry-run"));
}

#[test]
fn test_missing_required_flags() {
    let tmp = TempDir::new().unwrap();
    bulk(&tmp)
        .args(["--template", "template.md"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--csv"));
}

#[test]
fn test_invalid_repo_flag() {
    let tmp = setup(TEMPLATE, CSV);
    bulk(&tmp)
        .args([
            "--template",
            "template.md",
            "--csv",
            "data.csv",
            "--repo",
            "not-a-repo",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected owner/name"));
}

// ============================================================================
// Dry Run
// ============================================================================

#[test]
fn test_dry_run_previews_every_row() {
    let tmp = setup(TEMPLATE, CSV);
    dry_run(&tmp)
        .success()
        .stdout(predicate::str::contains("octocat/hello-world"))
        .stdout(predicate::str::contains("Title:     [auth] Fix login timeout"))
        .stdout(predicate::str::contains("Labels:    bug, urgent"))
        .stdout(predicate::str::contains("Assignees: alice"))
        .stdout(predicate::str::contains("Milestone: v1.2"))
        .stdout(predicate::str::contains("Sessions expire after 5 minutes"))
        .stdout(predicate::str::contains("Title:     [docs] Update README"))
        .stdout(predicate::str::contains("Issues previewed: 2"))
        .stdout(predicate::str::contains("No issues were created"));
}

#[test]
fn test_quiet_dry_run_prints_only_previews() {
    let tmp = setup(TEMPLATE, CSV);
    bulk(&tmp)
        .args([
            "--template",
            "template.md",
            "--csv",
            "data.csv",
            "--repo",
            "octocat/hello-world",
            "--dry-run",
            "--quiet",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Title:     [auth] Fix login timeout"))
        .stdout(predicate::str::contains("Target repository").not())
        .stdout(predicate::str::contains("Summary").not());
}

#[test]
fn test_crlf_csv_reports_file_line_numbers() {
    let tmp = setup(
        "---\ntitle: {{title}}\n---\n{{body}}\n",
        "title,body\r\nFirst,one\r\n\"Broken: title\",two\r\n",
    );
    dry_run(&tmp)
        .failure()
        .stdout(predicate::str::contains("Row 2: First"))
        .stderr(predicate::str::contains("Row 3"));
}

#[test]
fn test_dry_run_omits_empty_milestone() {
    let tmp = setup(TEMPLATE, "title,component,labels,owner,milestone,description\nA,b,c,d,,e\n");
    dry_run(&tmp)
        .success()
        .stdout(predicate::str::contains("Title:     [b] A"))
        .stdout(predicate::str::contains("Milestone").not());
}

#[test]
fn test_dry_run_reports_header_mismatch() {
    let tmp = setup(
        "---\ntitle: \"{{title}}\"\n---\n{{description}} ({{priority}})\n",
        "title,description,unused\nA,B,C\n",
    );
    dry_run(&tmp)
        .success()
        .stderr(predicate::str::contains(
            "The following CSV headers are not used in the template: unused",
        ))
        .stderr(predicate::str::contains(
            "The following template variables are missing from CSV headers: priority",
        ))
        .stdout(predicate::str::contains("B ()"));
}

#[test]
fn test_headers_only_csv() {
    let tmp = setup(TEMPLATE, "title,component,labels,owner,milestone,description\n");
    dry_run(&tmp)
        .success()
        .stdout(predicate::str::contains("No data rows"));
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_blank_header_fails() {
    let tmp = setup(TEMPLATE, "a,,c\n1,2,3\n");
    dry_run(&tmp)
        .failure()
        .stderr(predicate::str::contains("column 2"));
}

#[test]
fn test_empty_csv_fails() {
    let tmp = setup(TEMPLATE, "");
    dry_run(&tmp)
        .failure()
        .stderr(predicate::str::contains("Failed to read CSV file"));
}

#[test]
fn test_malformed_quoting_fails() {
    let tmp = setup(TEMPLATE, "title,body\nok,fine\nsay \"hi\",x\n");
    dry_run(&tmp)
        .failure()
        .stderr(predicate::str::contains("line 3"));
}

#[test]
fn test_missing_template_fails() {
    let tmp = setup(TEMPLATE, CSV);
    bulk(&tmp)
        .args([
            "--template",
            "missing.md",
            "--csv",
            "data.csv",
            "--repo",
            "octocat/hello-world",
            "--dry-run",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read template file"));
}

#[test]
fn test_bad_row_does_not_stop_others() {
    let tmp = setup(
        "---\ntitle: {{title}}\n---\n{{body}}\n",
        "title,body\nFirst,one\n\"Broken: title\",two\nThird,three\n",
    );
    dry_run(&tmp)
        .failure()
        .stdout(predicate::str::contains("Title:     First"))
        .stdout(predicate::str::contains("Title:     Third"))
        .stdout(predicate::str::contains("Errors:"))
        .stderr(predicate::str::contains("Row 3"));
}

#[test]
fn test_template_without_front_matter_fails_every_row() {
    let tmp = setup("Just a body with {{title}}\n", "title\nA\nB\n");
    dry_run(&tmp)
        .failure()
        .stderr(predicate::str::contains("Row 2"))
        .stderr(predicate::str::contains("Row 3"))
        .stderr(predicate::str::contains("2 of 2 row(s) failed"));
}

#[test]
fn test_missing_gh_cli_fails_before_creating() {
    let tmp = setup(TEMPLATE, CSV);
    bulk(&tmp)
        .env("GH_ISSUE_BULK_GH", "gh-binary-that-does-not-exist")
        .args([
            "--template",
            "template.md",
            "--csv",
            "data.csv",
            "--repo",
            "octocat/hello-world",
        ])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Created").not());
}
